pub mod boundaries;
pub mod flood_data;
pub mod regions;
pub mod reports;
pub mod statistics;
