use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::boundaries::handlers;
use crate::features::boundaries::services::BoundaryService;

pub fn routes(service: Arc<BoundaryService>) -> Router {
    Router::new()
        .route("/api/boundaries", get(handlers::list_boundaries))
        // static segment, matched before {id}
        .route("/api/boundaries/stats", get(handlers::get_boundary_stats))
        .route("/api/boundaries/{id}", get(handlers::get_boundary))
        .with_state(service)
}
