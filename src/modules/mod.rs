//! Modules layer - clients for external systems
//!
//! - `bnpb`: BNPB ArcGIS statistics source for the daily sync
//! - `lod_client`: headless map client for the LOD boundary endpoint

pub mod bnpb;
pub mod lod_client;
