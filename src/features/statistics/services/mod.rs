pub mod statistics_service;
mod sync_service;

pub use statistics_service::StatisticsService;
pub use sync_service::{sumatra_statistics, StatisticsSyncService};
