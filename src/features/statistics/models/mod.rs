mod statistics;

pub use statistics::{
    Statistics, StatisticsLevel, StatisticsTotals, StatusTerkini, UpsertStatistics,
};
