use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::features::statistics::handlers::{self, StatisticsState};

pub fn routes(state: StatisticsState) -> Router {
    Router::new()
        .route("/api/statistics", get(handlers::list_statistics))
        // static paths, matched before {level}/{kodeWilayah}
        .route(
            "/api/statistics/latest/sumatra",
            get(handlers::get_latest_sumatra),
        )
        .route(
            "/api/statistics/provinsi/all/sumatra",
            get(handlers::list_sumatra_provinces),
        )
        .route(
            "/api/statistics/comparison/top",
            get(handlers::get_top_comparison),
        )
        .route("/api/statistics/sync/bnpb", post(handlers::sync_bnpb))
        .route(
            "/api/statistics/{level}/{kode_wilayah}",
            get(handlers::get_statistics),
        )
        .route("/api/statistics/{id}", delete(handlers::delete_statistics))
        .with_state(state)
}
