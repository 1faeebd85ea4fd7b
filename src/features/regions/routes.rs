use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::regions::handlers;
use crate::features::regions::services::RegionService;

pub fn routes(service: Arc<RegionService>) -> Router {
    Router::new()
        .route(
            "/api/regions",
            get(handlers::list_regions).post(handlers::create_region),
        )
        .route("/api/regions/provinces", get(handlers::list_provinces))
        .route("/api/regions/kabupaten", get(handlers::list_kabupaten))
        .route("/api/regions/kecamatan", get(handlers::list_kecamatan))
        .route("/api/regions/desa", get(handlers::list_desa))
        .route("/api/regions/geojson", get(handlers::get_regions_geojson))
        .route(
            "/api/regions/nearby/search",
            get(handlers::list_nearby_regions),
        )
        .route(
            "/api/regions/{kode_desa}",
            get(handlers::get_region)
                .put(handlers::update_region)
                .delete(handlers::delete_region),
        )
        .with_state(service)
}
