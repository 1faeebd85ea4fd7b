//! Village-level administrative regions (desa/kelurahan).
//!
//! Regions are the reference data behind flood records: flood data rows join
//! them by `kode_desa`, and a flood record created without coordinates takes
//! the region's point.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/api/regions` | Paginated villages, filterable by parent codes and name |
//! | GET | `/api/regions/provinces` | Distinct provinces |
//! | GET | `/api/regions/kabupaten?provinsi=` | Kabupaten of a province |
//! | GET | `/api/regions/kecamatan?kabupaten=` | Kecamatan of a kabupaten |
//! | GET | `/api/regions/desa?kecamatan=` | Villages of a kecamatan |
//! | GET | `/api/regions/geojson` | Boundaries as a FeatureCollection |
//! | GET | `/api/regions/nearby/search?lng=&lat=&maxDistance=` | Nearest 20 villages |
//! | GET | `/api/regions/{kode_desa}` | Single village |
//! | POST | `/api/regions` | Create a village |
//! | PUT | `/api/regions/{kode_desa}` | Update a village |
//! | DELETE | `/api/regions/{kode_desa}` | Delete a village |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::RegionService;
