//! Village-level flood damage records.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/api/flood-data` | Paginated records with region, status and source filters |
//! | GET | `/api/flood-data/desa/{kode_desa}` | Latest record of a village |
//! | GET | `/api/flood-data/kabupaten/{kode}` | Records of a kabupaten |
//! | GET | `/api/flood-data/provinsi/{kode}` | Records of a province |
//! | GET | `/api/flood-data/active?provinsi=` | Active floods, deepest water first |
//! | GET | `/api/flood-data/nearby?lng=&lat=&maxDistance=` | Up to 20 records near a point |
//! | GET | `/api/flood-data/summary/{kode}?level=` | Totals for a province, kabupaten or kecamatan |
//! | POST | `/api/flood-data` | Create a record, location backfilled from the region |
//! | PUT | `/api/flood-data/{id}` | Update a record |
//! | PATCH | `/api/flood-data/{id}/status` | Change flood status and water depth |
//! | DELETE | `/api/flood-data/{id}` | Delete a record |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::FloodDataService;
