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
use crate::features::reports::dtos::{
    CreateReportDto, ReportResponseDto, ReportSummaryDto, UpdateReportDto,
};
use crate::features::reports::services::ReportService;
use crate::shared::types::{ApiResponse, Meta, NearbyQuery};

fn parse_id(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw).map_err(|_| AppError::InvalidParameter("Invalid report id".to_string()))
}

/// List all reports, newest first
#[utoipa::path(
    get,
    path = "/api/reports",
    responses(
        (status = 200, description = "List of reports", body = ApiResponse<Vec<ReportResponseDto>>)
    ),
    tag = "reports"
)]
pub async fn list_reports(
    State(service): State<Arc<ReportService>>,
) -> Result<Json<ApiResponse<Vec<ReportResponseDto>>>> {
    let reports = service.list().await?;
    let dtos: Vec<ReportResponseDto> = reports.into_iter().map(Into::into).collect();
    let total = dtos.len() as i64;
    Ok(Json(ApiResponse::success(
        Some(dtos),
        None,
        Some(Meta::total(total)),
    )))
}

/// Reports near a point
#[utoipa::path(
    get,
    path = "/api/reports/nearby",
    params(NearbyQuery),
    responses(
        (status = 200, description = "Reports within the radius", body = ApiResponse<Vec<ReportResponseDto>>),
        (status = 400, description = "Longitude and latitude are required")
    ),
    tag = "reports"
)]
pub async fn list_nearby_reports(
    State(service): State<Arc<ReportService>>,
    AppQuery(query): AppQuery<NearbyQuery>,
) -> Result<Json<ApiResponse<Vec<ReportResponseDto>>>> {
    let (lng, lat, radius) = query.resolve().map_err(AppError::InvalidParameter)?;
    let reports = service.nearby(lng, lat, radius).await?;
    let dtos: Vec<ReportResponseDto> = reports.into_iter().map(Into::into).collect();
    let total = dtos.len() as i64;
    Ok(Json(ApiResponse::success(
        Some(dtos),
        None,
        Some(Meta::total(total)),
    )))
}

/// Report counts by severity and category
#[utoipa::path(
    get,
    path = "/api/reports/stats/summary",
    responses(
        (status = 200, description = "Report summary", body = ApiResponse<ReportSummaryDto>)
    ),
    tag = "reports"
)]
pub async fn get_report_summary(
    State(service): State<Arc<ReportService>>,
) -> Result<Json<ApiResponse<ReportSummaryDto>>> {
    let summary = service.summary().await?;
    Ok(Json(ApiResponse::success(Some(summary), None, None)))
}

/// Get report by ID
#[utoipa::path(
    get,
    path = "/api/reports/{id}",
    params(
        ("id" = Uuid, Path, description = "Report ID")
    ),
    responses(
        (status = 200, description = "Report found", body = ApiResponse<ReportResponseDto>),
        (status = 400, description = "Invalid report id"),
        (status = 404, description = "Report not found")
    ),
    tag = "reports"
)]
pub async fn get_report(
    State(service): State<Arc<ReportService>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<ReportResponseDto>>> {
    let report = service.get_by_id(parse_id(&id)?).await?;
    Ok(Json(ApiResponse::success(Some(report.into()), None, None)))
}

/// Submit a flood report
#[utoipa::path(
    post,
    path = "/api/reports",
    request_body = CreateReportDto,
    responses(
        (status = 201, description = "Report created", body = ApiResponse<ReportResponseDto>),
        (status = 400, description = "Validation error")
    ),
    tag = "reports"
)]
pub async fn create_report(
    State(service): State<Arc<ReportService>>,
    AppJson(dto): AppJson<CreateReportDto>,
) -> Result<(StatusCode, Json<ApiResponse<ReportResponseDto>>)> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let report = service.create(dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(Some(report.into()), None, None)),
    ))
}

/// Update a report
#[utoipa::path(
    put,
    path = "/api/reports/{id}",
    params(
        ("id" = Uuid, Path, description = "Report ID")
    ),
    request_body = UpdateReportDto,
    responses(
        (status = 200, description = "Report updated", body = ApiResponse<ReportResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Report not found")
    ),
    tag = "reports"
)]
pub async fn update_report(
    State(service): State<Arc<ReportService>>,
    Path(id): Path<String>,
    AppJson(dto): AppJson<UpdateReportDto>,
) -> Result<Json<ApiResponse<ReportResponseDto>>> {
    let id = parse_id(&id)?;
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let report = service.update(id, dto).await?;
    Ok(Json(ApiResponse::success(Some(report.into()), None, None)))
}

/// Delete a report
#[utoipa::path(
    delete,
    path = "/api/reports/{id}",
    params(
        ("id" = Uuid, Path, description = "Report ID")
    ),
    responses(
        (status = 200, description = "Report deleted"),
        (status = 404, description = "Report not found")
    ),
    tag = "reports"
)]
pub async fn delete_report(
    State(service): State<Arc<ReportService>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<()>>> {
    service.delete(parse_id(&id)?).await?;
    Ok(Json(ApiResponse::success(
        None,
        Some("Report deleted successfully".to_string()),
        None,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::reports::routes::routes;
    use crate::shared::test_helpers::lazy_pool;
    use axum_test::TestServer;
    use serde_json::json;

    fn server() -> TestServer {
        let service = Arc::new(ReportService::new(lazy_pool()));
        TestServer::new(routes(service)).unwrap()
    }

    #[tokio::test]
    async fn test_nearby_requires_coordinates() {
        let response = server().get("/api/reports/nearby").add_query_param("lng", "98.6").await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: serde_json::Value = response.json();
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Longitude and latitude are required");
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_image_url() {
        let response = server()
            .post("/api/reports")
            .json(&json!({
                "location": { "type": "Point", "coordinates": [98.6, 3.6] },
                "locationName": "Medan",
                "description": "Banjir",
                "contactSource": "warga",
                "severity": "ringan",
                "imageUrls": ["not-a-url"]
            }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_create_rejects_missing_fields() {
        let response = server()
            .post("/api/reports")
            .json(&json!({ "locationName": "Medan" }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_get_rejects_malformed_id() {
        let response = server().get("/api/reports/not-a-uuid").await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: serde_json::Value = response.json();
        assert_eq!(body["message"], "Invalid report id");
    }
}
