mod region;

pub use region::{
    KabupatenSummary, KecamatanSummary, ProvinceSummary, Region, RegionBoundaryRow, TipeDesa,
};
