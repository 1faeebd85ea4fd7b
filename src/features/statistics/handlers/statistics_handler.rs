use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppQuery;
use crate::features::statistics::dtos::{
    ComparisonQuery, StatisticsListQuery, StatisticsResponseDto, SyncResultDto,
};
use crate::features::statistics::models::{Statistics, StatisticsLevel};
use crate::features::statistics::services::{StatisticsService, StatisticsSyncService};
use crate::shared::types::{ApiResponse, Meta};

/// State for statistics handlers
#[derive(Clone)]
pub struct StatisticsState {
    pub statistics_service: Arc<StatisticsService>,
    pub sync_service: Arc<StatisticsSyncService>,
}

fn to_dtos(rows: Vec<Statistics>) -> Vec<StatisticsResponseDto> {
    rows.into_iter().map(Into::into).collect()
}

/// List statistics with filters
#[utoipa::path(
    get,
    path = "/api/statistics",
    params(StatisticsListQuery),
    responses(
        (status = 200, description = "Statistics rows", body = ApiResponse<Vec<StatisticsResponseDto>>),
        (status = 400, description = "Invalid filter or sort field")
    ),
    tag = "statistics"
)]
pub async fn list_statistics(
    State(state): State<StatisticsState>,
    AppQuery(query): AppQuery<StatisticsListQuery>,
) -> Result<Json<ApiResponse<Vec<StatisticsResponseDto>>>> {
    let dtos = to_dtos(state.statistics_service.list(&query).await?);
    let total = dtos.len() as i64;
    Ok(Json(ApiResponse::success(
        Some(dtos),
        None,
        Some(Meta::total(total)),
    )))
}

/// Latest Sumatra-wide statistics
#[utoipa::path(
    get,
    path = "/api/statistics/latest/sumatra",
    responses(
        (status = 200, description = "Sumatra statistics", body = ApiResponse<StatisticsResponseDto>),
        (status = 404, description = "Sumatra statistics not found")
    ),
    tag = "statistics"
)]
pub async fn get_latest_sumatra(
    State(state): State<StatisticsState>,
) -> Result<Json<ApiResponse<StatisticsResponseDto>>> {
    let stats = state.statistics_service.latest_sumatra().await?;
    Ok(Json(ApiResponse::success(Some(stats.into()), None, None)))
}

/// Province statistics in Sumatra
#[utoipa::path(
    get,
    path = "/api/statistics/provinsi/all/sumatra",
    responses(
        (status = 200, description = "Province statistics", body = ApiResponse<Vec<StatisticsResponseDto>>)
    ),
    tag = "statistics"
)]
pub async fn list_sumatra_provinces(
    State(state): State<StatisticsState>,
) -> Result<Json<ApiResponse<Vec<StatisticsResponseDto>>>> {
    let dtos = to_dtos(state.statistics_service.list_sumatra_provinces().await?);
    let total = dtos.len() as i64;
    Ok(Json(ApiResponse::success(
        Some(dtos),
        None,
        Some(Meta::total(total)),
    )))
}

/// Most affected regions at a level
#[utoipa::path(
    get,
    path = "/api/statistics/comparison/top",
    params(ComparisonQuery),
    responses(
        (status = 200, description = "Top regions", body = ApiResponse<Vec<StatisticsResponseDto>>),
        (status = 400, description = "Invalid level or sort field")
    ),
    tag = "statistics"
)]
pub async fn get_top_comparison(
    State(state): State<StatisticsState>,
    AppQuery(query): AppQuery<ComparisonQuery>,
) -> Result<Json<ApiResponse<Vec<StatisticsResponseDto>>>> {
    let dtos = to_dtos(state.statistics_service.top(&query).await?);
    let total = dtos.len() as i64;
    Ok(Json(ApiResponse::success(
        Some(dtos),
        None,
        Some(Meta::total(total)),
    )))
}

/// Statistics for one region
#[utoipa::path(
    get,
    path = "/api/statistics/{level}/{kodeWilayah}",
    params(
        ("level" = StatisticsLevel, Path, description = "Aggregation level"),
        ("kodeWilayah" = String, Path, description = "Region code")
    ),
    responses(
        (status = 200, description = "Statistics", body = ApiResponse<StatisticsResponseDto>),
        (status = 400, description = "Invalid level"),
        (status = 404, description = "Statistics not found")
    ),
    tag = "statistics"
)]
pub async fn get_statistics(
    State(state): State<StatisticsState>,
    Path((level, kode_wilayah)): Path<(String, String)>,
) -> Result<Json<ApiResponse<StatisticsResponseDto>>> {
    let level = level
        .parse::<StatisticsLevel>()
        .map_err(|_| AppError::InvalidParameter("Invalid level parameter".to_string()))?;

    let stats = state.statistics_service.get(level, &kode_wilayah).await?;
    Ok(Json(ApiResponse::success(Some(stats.into()), None, None)))
}

/// Pull the latest totals from BNPB now
#[utoipa::path(
    post,
    path = "/api/statistics/sync/bnpb",
    responses(
        (status = 200, description = "Sync finished", body = ApiResponse<SyncResultDto>)
    ),
    tag = "statistics"
)]
pub async fn sync_bnpb(
    State(state): State<StatisticsState>,
) -> Result<Json<ApiResponse<SyncResultDto>>> {
    tracing::info!("Manual BNPB sync triggered via API");

    let (synced, statistics) = match state.sync_service.sync().await? {
        Some(stats) => (true, Some(stats)),
        None => (false, state.sync_service.current().await?),
    };

    let message = if synced {
        "BNPB data synced successfully"
    } else {
        "No data fetched from BNPB, sync skipped"
    };

    Ok(Json(ApiResponse::success(
        Some(SyncResultDto {
            synced,
            statistics: statistics.map(Into::into),
        }),
        Some(message.to_string()),
        None,
    )))
}

/// Delete a statistics row
#[utoipa::path(
    delete,
    path = "/api/statistics/{id}",
    params(
        ("id" = Uuid, Path, description = "Statistics ID")
    ),
    responses(
        (status = 200, description = "Statistics deleted"),
        (status = 404, description = "Statistics not found")
    ),
    tag = "statistics"
)]
pub async fn delete_statistics(
    State(state): State<StatisticsState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>> {
    state.statistics_service.delete(id).await?;
    Ok(Json(ApiResponse::success(
        None,
        Some("Statistics deleted successfully".to_string()),
        None,
    )))
}
