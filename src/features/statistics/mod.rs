//! Aggregated flood impact statistics.
//!
//! Rows are rollups per region and level. The Sumatra-wide `regional` row is
//! kept current by the daily BNPB sync.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/api/statistics` | Filter by level, region, kodeWilayah; sortable |
//! | GET | `/api/statistics/latest/sumatra` | Latest Sumatra rollup |
//! | GET | `/api/statistics/provinsi/all/sumatra` | Province rows in Sumatra |
//! | GET | `/api/statistics/comparison/top` | Most affected regions at a level |
//! | GET | `/api/statistics/{level}/{kodeWilayah}` | One region |
//! | POST | `/api/statistics/sync/bnpb` | Run the BNPB sync now |
//! | DELETE | `/api/statistics/{id}` | Delete a row |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod workers;

pub use handlers::StatisticsState;
pub use services::{StatisticsService, StatisticsSyncService};
pub use workers::BnpbSyncScheduler;
