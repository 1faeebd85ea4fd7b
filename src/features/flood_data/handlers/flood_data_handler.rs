use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::{AppJson, AppQuery};
use crate::features::flood_data::dtos::{
    ActiveFloodQuery, CreateFloodDataDto, FloodDataListQuery, FloodDataResponseDto,
    FloodSummaryQuery, UpdateFloodDataDto, UpdateFloodStatusDto,
};
use crate::features::flood_data::models::{FloodData, FloodSummary};
use crate::features::flood_data::services::FloodDataService;
use crate::shared::types::{ApiResponse, Meta, NearbyQuery};

fn parse_id(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw)
        .map_err(|_| AppError::InvalidParameter("Invalid flood data id".to_string()))
}

fn list_response(rows: Vec<FloodData>) -> Json<ApiResponse<Vec<FloodDataResponseDto>>> {
    let dtos: Vec<FloodDataResponseDto> = rows.into_iter().map(Into::into).collect();
    let total = dtos.len() as i64;
    Json(ApiResponse::success(
        Some(dtos),
        None,
        Some(Meta::total(total)),
    ))
}

/// List flood data (paginated, filterable, sortable)
#[utoipa::path(
    get,
    path = "/api/flood-data",
    params(FloodDataListQuery),
    responses(
        (status = 200, description = "Page of flood records", body = ApiResponse<Vec<FloodDataResponseDto>>),
        (status = 400, description = "Invalid filter or sort parameter")
    ),
    tag = "flood-data"
)]
pub async fn list_flood_data(
    State(service): State<Arc<FloodDataService>>,
    AppQuery(query): AppQuery<FloodDataListQuery>,
) -> Result<Json<ApiResponse<Vec<FloodDataResponseDto>>>> {
    let pagination = query.pagination();
    let (rows, total) = service.list(&query, &pagination).await?;
    let dtos = rows.into_iter().map(Into::into).collect();
    Ok(Json(ApiResponse::success(
        Some(dtos),
        None,
        Some(Meta::paged(total, &pagination)),
    )))
}

/// Latest flood record of a village
#[utoipa::path(
    get,
    path = "/api/flood-data/desa/{kode_desa}",
    params(("kode_desa" = String, Path, description = "Kode desa")),
    responses(
        (status = 200, description = "Latest record", body = ApiResponse<FloodDataResponseDto>),
        (status = 404, description = "Flood data not found for this desa")
    ),
    tag = "flood-data"
)]
pub async fn get_flood_data_by_desa(
    State(service): State<Arc<FloodDataService>>,
    Path(kode_desa): Path<String>,
) -> Result<Json<ApiResponse<FloodDataResponseDto>>> {
    let data = service.latest_for_desa(&kode_desa).await?;
    Ok(Json(ApiResponse::success(Some(data.into()), None, None)))
}

/// Flood records of a kabupaten
#[utoipa::path(
    get,
    path = "/api/flood-data/kabupaten/{kode}",
    params(("kode" = String, Path, description = "Kode kabupaten")),
    responses(
        (status = 200, description = "Flood records", body = ApiResponse<Vec<FloodDataResponseDto>>)
    ),
    tag = "flood-data"
)]
pub async fn list_flood_data_by_kabupaten(
    State(service): State<Arc<FloodDataService>>,
    Path(kode): Path<String>,
) -> Result<Json<ApiResponse<Vec<FloodDataResponseDto>>>> {
    Ok(list_response(service.list_by_kabupaten(&kode).await?))
}

/// Flood records of a province
#[utoipa::path(
    get,
    path = "/api/flood-data/provinsi/{kode}",
    params(("kode" = String, Path, description = "Kode provinsi")),
    responses(
        (status = 200, description = "Flood records", body = ApiResponse<Vec<FloodDataResponseDto>>)
    ),
    tag = "flood-data"
)]
pub async fn list_flood_data_by_provinsi(
    State(service): State<Arc<FloodDataService>>,
    Path(kode): Path<String>,
) -> Result<Json<ApiResponse<Vec<FloodDataResponseDto>>>> {
    Ok(list_response(service.list_by_provinsi(&kode).await?))
}

/// Active floods, deepest water first
#[utoipa::path(
    get,
    path = "/api/flood-data/active",
    params(ActiveFloodQuery),
    responses(
        (status = 200, description = "Active floods", body = ApiResponse<Vec<FloodDataResponseDto>>)
    ),
    tag = "flood-data"
)]
pub async fn list_active_floods(
    State(service): State<Arc<FloodDataService>>,
    AppQuery(query): AppQuery<ActiveFloodQuery>,
) -> Result<Json<ApiResponse<Vec<FloodDataResponseDto>>>> {
    let provinsi = query.provinsi.as_deref().filter(|s| !s.is_empty());
    Ok(list_response(service.active(provinsi).await?))
}

/// Flood records near a point
#[utoipa::path(
    get,
    path = "/api/flood-data/nearby",
    params(NearbyQuery),
    responses(
        (status = 200, description = "Flood records within the radius", body = ApiResponse<Vec<FloodDataResponseDto>>),
        (status = 400, description = "Longitude and latitude are required")
    ),
    tag = "flood-data"
)]
pub async fn list_nearby_flood_data(
    State(service): State<Arc<FloodDataService>>,
    AppQuery(query): AppQuery<NearbyQuery>,
) -> Result<Json<ApiResponse<Vec<FloodDataResponseDto>>>> {
    let (lng, lat, radius) = query.resolve().map_err(AppError::InvalidParameter)?;
    Ok(list_response(service.nearby(lng, lat, radius).await?))
}

/// Damage totals of a province, kabupaten or kecamatan
#[utoipa::path(
    get,
    path = "/api/flood-data/summary/{kode}",
    params(
        ("kode" = String, Path, description = "Region code at the chosen level"),
        FloodSummaryQuery
    ),
    responses(
        (status = 200, description = "Aggregated totals", body = ApiResponse<FloodSummary>),
        (status = 400, description = "Invalid level parameter"),
        (status = 404, description = "No flood data found for this region")
    ),
    tag = "flood-data"
)]
pub async fn get_flood_summary(
    State(service): State<Arc<FloodDataService>>,
    Path(kode): Path<String>,
    AppQuery(query): AppQuery<FloodSummaryQuery>,
) -> Result<Json<ApiResponse<FloodSummary>>> {
    let summary = service
        .summary(query.level.unwrap_or_default(), &kode)
        .await?;
    Ok(Json(ApiResponse::success(Some(summary), None, None)))
}

/// Record flood damage for a village
#[utoipa::path(
    post,
    path = "/api/flood-data",
    request_body = CreateFloodDataDto,
    responses(
        (status = 201, description = "Flood record created", body = ApiResponse<FloodDataResponseDto>),
        (status = 400, description = "Validation error")
    ),
    tag = "flood-data"
)]
pub async fn create_flood_data(
    State(service): State<Arc<FloodDataService>>,
    AppJson(dto): AppJson<CreateFloodDataDto>,
) -> Result<(StatusCode, Json<ApiResponse<FloodDataResponseDto>>)> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let data = service.create(dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(Some(data.into()), None, None)),
    ))
}

/// Update a flood record
#[utoipa::path(
    put,
    path = "/api/flood-data/{id}",
    params(("id" = Uuid, Path, description = "Flood data ID")),
    request_body = UpdateFloodDataDto,
    responses(
        (status = 200, description = "Flood record updated", body = ApiResponse<FloodDataResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Flood data not found")
    ),
    tag = "flood-data"
)]
pub async fn update_flood_data(
    State(service): State<Arc<FloodDataService>>,
    Path(id): Path<String>,
    AppJson(dto): AppJson<UpdateFloodDataDto>,
) -> Result<Json<ApiResponse<FloodDataResponseDto>>> {
    let id = parse_id(&id)?;
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let data = service.update(id, dto).await?;
    Ok(Json(ApiResponse::success(Some(data.into()), None, None)))
}

/// Change the flood status of a record
#[utoipa::path(
    patch,
    path = "/api/flood-data/{id}/status",
    params(("id" = Uuid, Path, description = "Flood data ID")),
    request_body = UpdateFloodStatusDto,
    responses(
        (status = 200, description = "Status updated", body = ApiResponse<FloodDataResponseDto>),
        (status = 400, description = "statusBanjir is required"),
        (status = 404, description = "Flood data not found")
    ),
    tag = "flood-data"
)]
pub async fn update_flood_status(
    State(service): State<Arc<FloodDataService>>,
    Path(id): Path<String>,
    AppJson(dto): AppJson<UpdateFloodStatusDto>,
) -> Result<Json<ApiResponse<FloodDataResponseDto>>> {
    let id = parse_id(&id)?;
    let status = dto
        .status_banjir
        .ok_or_else(|| AppError::BadRequest("statusBanjir is required".to_string()))?;
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let data = service.update_status(id, status, &dto).await?;
    Ok(Json(ApiResponse::success(Some(data.into()), None, None)))
}

/// Delete a flood record
#[utoipa::path(
    delete,
    path = "/api/flood-data/{id}",
    params(("id" = Uuid, Path, description = "Flood data ID")),
    responses(
        (status = 200, description = "Flood record deleted"),
        (status = 404, description = "Flood data not found")
    ),
    tag = "flood-data"
)]
pub async fn delete_flood_data(
    State(service): State<Arc<FloodDataService>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<()>>> {
    service.delete(parse_id(&id)?).await?;
    Ok(Json(ApiResponse::success(
        None,
        Some("Flood data deleted successfully".to_string()),
        None,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::flood_data::routes::routes;
    use crate::features::regions::RegionService;
    use crate::shared::test_helpers::lazy_pool;
    use axum_test::TestServer;
    use serde_json::json;

    fn server() -> TestServer {
        let pool = lazy_pool();
        let regions = Arc::new(RegionService::new(pool.clone()));
        let service = Arc::new(FloodDataService::new(pool, regions));
        TestServer::new(routes(service)).unwrap()
    }

    #[tokio::test]
    async fn test_status_patch_requires_status() {
        let response = server()
            .patch("/api/flood-data/0193f3c4-8a7e-7000-8000-000000000001/status")
            .json(&json!({ "tinggiAir": 40 }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: serde_json::Value = response.json();
        assert_eq!(body["message"], "statusBanjir is required");
    }

    #[tokio::test]
    async fn test_status_patch_rejects_unknown_status() {
        let response = server()
            .patch("/api/flood-data/0193f3c4-8a7e-7000-8000-000000000001/status")
            .json(&json!({ "statusBanjir": "banjir" }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_list_rejects_unknown_sort_column() {
        let response = server()
            .get("/api/flood-data")
            .add_query_param("sortBy", "password")
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_summary_rejects_unknown_level() {
        let response = server()
            .get("/api/flood-data/summary/12.71")
            .add_query_param("level", "desa")
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_create_rejects_negative_counts() {
        let response = server()
            .post("/api/flood-data")
            .json(&json!({
                "kodeDesa": "12.71.01.1001",
                "kodeKecamatan": "12.71.01",
                "kodeKabupaten": "12.71",
                "kodeProvinsi": "12",
                "namaWilayah": "Aur",
                "korbanHilang": -3
            }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_update_rejects_malformed_id() {
        let response = server()
            .put("/api/flood-data/42")
            .json(&json!({ "tinggiAir": 10 }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: serde_json::Value = response.json();
        assert_eq!(body["message"], "Invalid flood data id");
    }
}
