//! Citizen flood reports.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/api/reports` | All reports, newest first |
//! | GET | `/api/reports/nearby?lng=&lat=&maxDistance=` | Reports within a radius (default 50 km) |
//! | GET | `/api/reports/stats/summary` | Counts by severity and category |
//! | GET | `/api/reports/{id}` | Single report |
//! | POST | `/api/reports` | Submit a report |
//! | PUT | `/api/reports/{id}` | Update a report |
//! | DELETE | `/api/reports/{id}` | Delete a report |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::ReportService;
