use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppQuery;
use crate::features::boundaries::dtos::{
    BoundaryFeatureCollectionDto, BoundaryFeatureDto, BoundaryListQuery, BoundaryStatsDto,
};
use crate::features::boundaries::encoder::{encode_collection, encode_feature};
use crate::features::boundaries::models::BoundaryQuery;
use crate::features::boundaries::services::BoundaryService;
use crate::shared::types::{ApiResponse, Meta};

/// Boundaries visible at a zoom level
#[utoipa::path(
    get,
    path = "/api/boundaries",
    params(BoundaryListQuery),
    responses(
        (status = 200, description = "Boundary feature collection", body = ApiResponse<BoundaryFeatureCollectionDto>),
        (status = 400, description = "Missing or invalid zoom, malformed bounds"),
        (status = 503, description = "Boundary store unavailable")
    ),
    tag = "boundaries"
)]
pub async fn list_boundaries(
    State(service): State<Arc<BoundaryService>>,
    AppQuery(params): AppQuery<BoundaryListQuery>,
) -> Result<Json<ApiResponse<BoundaryFeatureCollectionDto>>> {
    let query = BoundaryQuery::from_params(
        params.zoom.as_deref(),
        params.bounds.as_deref(),
        params.provinsi,
        params.kabupaten,
    )?;

    let boundaries = service.resolve(&query).await?;
    let collection = encode_collection(query.zoom, &boundaries, Utc::now());

    tracing::debug!(
        "Serving {} boundaries at zoom {}",
        collection.metadata.count,
        query.zoom
    );

    let total = collection.metadata.count as i64;
    Ok(Json(ApiResponse::success(
        Some(collection),
        None,
        Some(Meta::total(total)),
    )))
}

/// Boundary counts and zoom envelope per admin level
#[utoipa::path(
    get,
    path = "/api/boundaries/stats",
    responses(
        (status = 200, description = "Boundary statistics", body = ApiResponse<BoundaryStatsDto>),
        (status = 503, description = "Boundary store unavailable")
    ),
    tag = "boundaries"
)]
pub async fn get_boundary_stats(
    State(service): State<Arc<BoundaryService>>,
) -> Result<Json<ApiResponse<BoundaryStatsDto>>> {
    let stats = BoundaryStatsDto::from(service.level_stats().await?);
    Ok(Json(ApiResponse::success(Some(stats), None, None)))
}

/// Single boundary feature
#[utoipa::path(
    get,
    path = "/api/boundaries/{id}",
    params(
        ("id" = String, Path, description = "Boundary ID")
    ),
    responses(
        (status = 200, description = "Boundary feature", body = ApiResponse<BoundaryFeatureDto>),
        (status = 400, description = "Malformed boundary ID"),
        (status = 404, description = "Boundary not found")
    ),
    tag = "boundaries"
)]
pub async fn get_boundary(
    State(service): State<Arc<BoundaryService>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<BoundaryFeatureDto>>> {
    let id = Uuid::parse_str(&id)
        .map_err(|_| AppError::InvalidParameter("Invalid boundary id".to_string()))?;
    let boundary = service.get(id).await?;
    Ok(Json(ApiResponse::success(
        Some(encode_feature(&boundary)),
        None,
        None,
    )))
}

#[cfg(test)]
mod tests {
    use crate::features::boundaries::dtos::{BoundaryFeatureCollectionDto, BoundaryStatsDto};
    use crate::features::boundaries::routes;
    use crate::features::boundaries::services::BoundaryService;
    use crate::shared::test_helpers::{sumatra_fixture, InMemoryBoundaryRepository};
    use crate::shared::types::ApiResponse;
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use std::sync::Arc;

    fn server() -> (TestServer, Arc<InMemoryBoundaryRepository>) {
        let repository = Arc::new(InMemoryBoundaryRepository::new(sumatra_fixture()));
        let service = Arc::new(BoundaryService::new(repository.clone()));
        (TestServer::new(routes::routes(service)).unwrap(), repository)
    }

    #[tokio::test]
    async fn test_list_requires_zoom() {
        let (server, _) = server();
        let response = server.get("/api/boundaries").await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: ApiResponse<()> = response.json();
        assert!(!body.success);
        assert_eq!(body.message.as_deref(), Some("Zoom level is required"));
    }

    #[tokio::test]
    async fn test_list_rejects_non_numeric_zoom() {
        let (server, _) = server();
        let response = server.get("/api/boundaries").add_query_param("zoom", "abc").await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_list_rejects_malformed_bounds() {
        let (server, _) = server();
        let response = server
            .get("/api/boundaries")
            .add_query_param("zoom", "8")
            .add_query_param("bounds", "{\"west\":95}")
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: ApiResponse<()> = response.json();
        assert_eq!(body.message.as_deref(), Some("Invalid bounds parameter"));
    }

    #[tokio::test]
    async fn test_list_at_zoom_8_in_aceh() {
        let (server, _) = server();
        let response = server
            .get("/api/boundaries")
            .add_query_param("zoom", "8")
            .add_query_param(
                "bounds",
                r#"{"west":95.0,"south":2.0,"east":97.9,"north":6.0}"#,
            )
            .await;
        response.assert_status_ok();

        let body: ApiResponse<BoundaryFeatureCollectionDto> = response.json();
        let collection = body.data.unwrap();
        assert_eq!(collection.metadata.count, 2);
        assert!(collection
            .features
            .iter()
            .all(|f| f.properties.kode_provinsi.as_deref() == Some("11")));
    }

    #[tokio::test]
    async fn test_list_zoom_without_matches_is_empty() {
        let (server, _) = server();
        let response = server.get("/api/boundaries").add_query_param("zoom", "2").await;
        response.assert_status_ok();
        let body: ApiResponse<BoundaryFeatureCollectionDto> = response.json();
        let collection = body.data.unwrap();
        assert_eq!(collection.metadata.count, 0);
        assert_eq!(collection.metadata.admin_level, None);
    }

    #[tokio::test]
    async fn test_stats() {
        let (server, _) = server();
        let response = server.get("/api/boundaries/stats").await;
        response.assert_status_ok();
        let body: ApiResponse<BoundaryStatsDto> = response.json();
        let stats = body.data.unwrap();
        assert_eq!(stats.total, 7);
        assert_eq!(stats.by_level.len(), 3);
    }

    #[tokio::test]
    async fn test_get_by_id() {
        let fixture = sumatra_fixture();
        let id = fixture[2].id;
        let service = Arc::new(BoundaryService::new(Arc::new(
            InMemoryBoundaryRepository::new(fixture),
        )));
        let server = TestServer::new(routes::routes(service)).unwrap();

        let response = server.get(&format!("/api/boundaries/{}", id)).await;
        response.assert_status_ok();

        let missing = server
            .get(&format!("/api/boundaries/{}", uuid::Uuid::now_v7()))
            .await;
        missing.assert_status(StatusCode::NOT_FOUND);

        let malformed = server.get("/api/boundaries/not-an-id").await;
        malformed.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_store_unavailable_is_503() {
        let (server, repository) = server();
        repository.set_unavailable(true);
        let response = server.get("/api/boundaries").add_query_param("zoom", "5").await;
        response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    }
}
