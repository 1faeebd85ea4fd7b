use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::{AppJson, AppQuery};
use crate::features::regions::dtos::{
    CreateRegionDto, ParentCodeQuery, RegionFeatureCollectionDto, RegionFeatureDto,
    RegionGeoJsonQuery, RegionListQuery, RegionResponseDto, UpdateRegionDto,
};
use crate::features::regions::models::{KabupatenSummary, KecamatanSummary, ProvinceSummary, Region};
use crate::features::regions::services::RegionService;
use crate::shared::types::{ApiResponse, Meta, NearbyQuery};

fn to_dtos(regions: Vec<Region>) -> Vec<RegionResponseDto> {
    regions.into_iter().map(Into::into).collect()
}

/// List regions (paginated)
#[utoipa::path(
    get,
    path = "/api/regions",
    params(RegionListQuery),
    responses(
        (status = 200, description = "Page of regions", body = ApiResponse<Vec<RegionResponseDto>>)
    ),
    tag = "regions"
)]
pub async fn list_regions(
    State(service): State<Arc<RegionService>>,
    AppQuery(query): AppQuery<RegionListQuery>,
) -> Result<Json<ApiResponse<Vec<RegionResponseDto>>>> {
    let pagination = query.pagination();
    let (regions, total) = service.list(&query, &pagination).await?;
    Ok(Json(ApiResponse::success(
        Some(to_dtos(regions)),
        None,
        Some(Meta::paged(total, &pagination)),
    )))
}

/// Distinct provinces
#[utoipa::path(
    get,
    path = "/api/regions/provinces",
    responses(
        (status = 200, description = "Provinces", body = ApiResponse<Vec<ProvinceSummary>>)
    ),
    tag = "regions"
)]
pub async fn list_provinces(
    State(service): State<Arc<RegionService>>,
) -> Result<Json<ApiResponse<Vec<ProvinceSummary>>>> {
    let provinces = service.provinces().await?;
    let total = provinces.len() as i64;
    Ok(Json(ApiResponse::success(
        Some(provinces),
        None,
        Some(Meta::total(total)),
    )))
}

/// Kabupaten of a province
#[utoipa::path(
    get,
    path = "/api/regions/kabupaten",
    params(("provinsi" = String, Query, description = "Kode provinsi")),
    responses(
        (status = 200, description = "Kabupaten", body = ApiResponse<Vec<KabupatenSummary>>),
        (status = 400, description = "Kode provinsi is required")
    ),
    tag = "regions"
)]
pub async fn list_kabupaten(
    State(service): State<Arc<RegionService>>,
    AppQuery(query): AppQuery<ParentCodeQuery>,
) -> Result<Json<ApiResponse<Vec<KabupatenSummary>>>> {
    let kabupaten = service.kabupaten(query.provinsi()?).await?;
    let total = kabupaten.len() as i64;
    Ok(Json(ApiResponse::success(
        Some(kabupaten),
        None,
        Some(Meta::total(total)),
    )))
}

/// Kecamatan of a kabupaten
#[utoipa::path(
    get,
    path = "/api/regions/kecamatan",
    params(("kabupaten" = String, Query, description = "Kode kabupaten")),
    responses(
        (status = 200, description = "Kecamatan", body = ApiResponse<Vec<KecamatanSummary>>),
        (status = 400, description = "Kode kabupaten is required")
    ),
    tag = "regions"
)]
pub async fn list_kecamatan(
    State(service): State<Arc<RegionService>>,
    AppQuery(query): AppQuery<ParentCodeQuery>,
) -> Result<Json<ApiResponse<Vec<KecamatanSummary>>>> {
    let kecamatan = service.kecamatan(query.kabupaten()?).await?;
    let total = kecamatan.len() as i64;
    Ok(Json(ApiResponse::success(
        Some(kecamatan),
        None,
        Some(Meta::total(total)),
    )))
}

/// Villages of a kecamatan
#[utoipa::path(
    get,
    path = "/api/regions/desa",
    params(("kecamatan" = String, Query, description = "Kode kecamatan")),
    responses(
        (status = 200, description = "Villages", body = ApiResponse<Vec<RegionResponseDto>>),
        (status = 400, description = "Kode kecamatan is required")
    ),
    tag = "regions"
)]
pub async fn list_desa(
    State(service): State<Arc<RegionService>>,
    AppQuery(query): AppQuery<ParentCodeQuery>,
) -> Result<Json<ApiResponse<Vec<RegionResponseDto>>>> {
    let desa = to_dtos(service.desa(query.kecamatan()?).await?);
    let total = desa.len() as i64;
    Ok(Json(ApiResponse::success(
        Some(desa),
        None,
        Some(Meta::total(total)),
    )))
}

/// Region boundaries as a GeoJSON FeatureCollection
#[utoipa::path(
    get,
    path = "/api/regions/geojson",
    params(RegionGeoJsonQuery),
    responses(
        (status = 200, description = "Region boundaries", body = RegionFeatureCollectionDto)
    ),
    tag = "regions"
)]
pub async fn get_regions_geojson(
    State(service): State<Arc<RegionService>>,
    AppQuery(query): AppQuery<RegionGeoJsonQuery>,
) -> Result<Json<RegionFeatureCollectionDto>> {
    let rows = service.geojson(&query).await?;
    let features = rows
        .into_iter()
        .map(RegionFeatureDto::try_from)
        .collect::<Result<Vec<_>>>()?;
    Ok(Json(RegionFeatureCollectionDto::new(features)))
}

/// Regions nearest to a point
#[utoipa::path(
    get,
    path = "/api/regions/nearby/search",
    params(NearbyQuery),
    responses(
        (status = 200, description = "Closest regions", body = ApiResponse<Vec<RegionResponseDto>>),
        (status = 400, description = "Longitude and latitude are required")
    ),
    tag = "regions"
)]
pub async fn list_nearby_regions(
    State(service): State<Arc<RegionService>>,
    AppQuery(query): AppQuery<NearbyQuery>,
) -> Result<Json<ApiResponse<Vec<RegionResponseDto>>>> {
    let (lng, lat, radius) = query.resolve().map_err(AppError::InvalidParameter)?;
    let regions = to_dtos(service.nearby(lng, lat, radius).await?);
    let total = regions.len() as i64;
    Ok(Json(ApiResponse::success(
        Some(regions),
        None,
        Some(Meta::total(total)),
    )))
}

/// Get region by village code
#[utoipa::path(
    get,
    path = "/api/regions/{kode_desa}",
    params(("kode_desa" = String, Path, description = "Kode desa")),
    responses(
        (status = 200, description = "Region found", body = ApiResponse<RegionResponseDto>),
        (status = 404, description = "Region not found")
    ),
    tag = "regions"
)]
pub async fn get_region(
    State(service): State<Arc<RegionService>>,
    Path(kode_desa): Path<String>,
) -> Result<Json<ApiResponse<RegionResponseDto>>> {
    let region = service.get_by_kode(&kode_desa).await?;
    Ok(Json(ApiResponse::success(Some(region.into()), None, None)))
}

/// Create a region
#[utoipa::path(
    post,
    path = "/api/regions",
    request_body = CreateRegionDto,
    responses(
        (status = 201, description = "Region created", body = ApiResponse<RegionResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 409, description = "Region already exists")
    ),
    tag = "regions"
)]
pub async fn create_region(
    State(service): State<Arc<RegionService>>,
    AppJson(dto): AppJson<CreateRegionDto>,
) -> Result<(StatusCode, Json<ApiResponse<RegionResponseDto>>)> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let region = service.create(dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(Some(region.into()), None, None)),
    ))
}

/// Update a region
#[utoipa::path(
    put,
    path = "/api/regions/{kode_desa}",
    params(("kode_desa" = String, Path, description = "Kode desa")),
    request_body = UpdateRegionDto,
    responses(
        (status = 200, description = "Region updated", body = ApiResponse<RegionResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Region not found")
    ),
    tag = "regions"
)]
pub async fn update_region(
    State(service): State<Arc<RegionService>>,
    Path(kode_desa): Path<String>,
    AppJson(dto): AppJson<UpdateRegionDto>,
) -> Result<Json<ApiResponse<RegionResponseDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let region = service.update(&kode_desa, dto).await?;
    Ok(Json(ApiResponse::success(Some(region.into()), None, None)))
}

/// Delete a region
#[utoipa::path(
    delete,
    path = "/api/regions/{kode_desa}",
    params(("kode_desa" = String, Path, description = "Kode desa")),
    responses(
        (status = 200, description = "Region deleted"),
        (status = 404, description = "Region not found")
    ),
    tag = "regions"
)]
pub async fn delete_region(
    State(service): State<Arc<RegionService>>,
    Path(kode_desa): Path<String>,
) -> Result<Json<ApiResponse<()>>> {
    service.delete(&kode_desa).await?;
    Ok(Json(ApiResponse::success(
        None,
        Some("Region deleted successfully".to_string()),
        None,
    )))
}
