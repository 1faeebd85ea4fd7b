//! Level-of-detail administrative boundaries.
//!
//! Boundaries are stored pre-simplified per admin level, each visible for a
//! zoom range. The map asks for a zoom (and optionally a viewport); the
//! resolver returns every boundary whose range covers it.
//!
//! | Level | Zoom | Simplification tolerance |
//! |-------|------|--------------------------|
//! | provinsi | 4 - 7 | 0.01 |
//! | kabupaten | 7 - 9 | 0.005 |
//! | kecamatan | 9 - 22 | 0.0005 |
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/api/boundaries?zoom=&bounds=&provinsi=&kabupaten=` | Boundaries visible at a zoom |
//! | GET | `/api/boundaries/stats` | Counts and zoom envelope per level |
//! | GET | `/api/boundaries/{id}` | Single boundary feature |

pub mod centroid;
pub mod dtos;
pub mod encoder;
pub mod handlers;
pub mod labels;
pub mod models;
pub mod routes;
pub mod services;

pub use services::{BoundaryService, PgBoundaryRepository};
