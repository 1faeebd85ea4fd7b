use std::sync::Arc;

use axum::{
    routing::{get, patch, put},
    Router,
};

use crate::features::flood_data::handlers;
use crate::features::flood_data::services::FloodDataService;

pub fn routes(service: Arc<FloodDataService>) -> Router {
    Router::new()
        .route(
            "/api/flood-data",
            get(handlers::list_flood_data).post(handlers::create_flood_data),
        )
        .route("/api/flood-data/active", get(handlers::list_active_floods))
        .route("/api/flood-data/nearby", get(handlers::list_nearby_flood_data))
        .route(
            "/api/flood-data/desa/{kode_desa}",
            get(handlers::get_flood_data_by_desa),
        )
        .route(
            "/api/flood-data/kabupaten/{kode}",
            get(handlers::list_flood_data_by_kabupaten),
        )
        .route(
            "/api/flood-data/provinsi/{kode}",
            get(handlers::list_flood_data_by_provinsi),
        )
        .route(
            "/api/flood-data/summary/{kode}",
            get(handlers::get_flood_summary),
        )
        .route(
            "/api/flood-data/{id}",
            put(handlers::update_flood_data).delete(handlers::delete_flood_data),
        )
        .route(
            "/api/flood-data/{id}/status",
            patch(handlers::update_flood_status),
        )
        .with_state(service)
}
