//! Headless map client for the LOD boundary endpoint.
//!
//! Mirrors what the dashboard map does on zoom: debounce, pick the tier
//! bucket, fade out, fetch, swap boundaries and deduplicated labels, fade in.
//! `lod-replay` drives it from a scripted zoom sequence.

pub mod controller;
pub mod fetcher;
pub mod renderer;
pub mod replay;
pub mod tiers;

pub use controller::{LodController, LodState, MapEvent};
pub use fetcher::{BoundaryFetcher, ClientError, HttpBoundaryFetcher};
pub use renderer::{BoundaryRenderer, OpacityTarget, RenderSummary, TracingRenderer};
pub use replay::LodReplay;
pub use tiers::{LodTiers, ZoomBucket};
