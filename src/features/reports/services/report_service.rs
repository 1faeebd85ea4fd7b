use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::reports::dtos::{CreateReportDto, ReportSummaryDto, UpdateReportDto};
use crate::features::reports::models::{BucketCount, Report};

const REPORT_COLUMNS: &str = r#"
    id, timestamp, lng, lat, location_name, description, image_urls,
    contact_source, category, severity, created_at, updated_at
"#;

/// Service for citizen flood reports
pub struct ReportService {
    pool: PgPool,
}

impl ReportService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// All reports, newest first
    pub async fn list(&self) -> Result<Vec<Report>> {
        let sql = format!("SELECT {REPORT_COLUMNS} FROM reports ORDER BY timestamp DESC, id");

        sqlx::query_as::<_, Report>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list reports: {:?}", e);
                AppError::Database(e)
            })
    }

    /// Reports within `radius_m` meters of a point, newest first
    pub async fn nearby(&self, lng: f64, lat: f64, radius_m: f64) -> Result<Vec<Report>> {
        let sql = format!(
            r#"
            SELECT {REPORT_COLUMNS}
            FROM reports
            WHERE ST_DWithin(location, ST_SetSRID(ST_MakePoint($1, $2), 4326)::geography, $3)
            ORDER BY timestamp DESC, id
            "#
        );

        sqlx::query_as::<_, Report>(&sql)
            .bind(lng)
            .bind(lat)
            .bind(radius_m)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to search nearby reports: {:?}", e);
                AppError::Database(e)
            })
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Report> {
        let sql = format!("SELECT {REPORT_COLUMNS} FROM reports WHERE id = $1");

        sqlx::query_as::<_, Report>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to fetch report {}: {:?}", id, e);
                AppError::Database(e)
            })?
            .ok_or_else(|| AppError::NotFound("Report not found".to_string()))
    }

    pub async fn create(&self, dto: CreateReportDto) -> Result<Report> {
        let point = dto
            .location
            .to_point()
            .ok_or_else(|| AppError::Validation("Coordinates must be [longitude, latitude]".into()))?;

        let sql = format!(
            r#"
            INSERT INTO reports (
                timestamp, lng, lat, location_name, description, image_urls,
                contact_source, category, severity
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {REPORT_COLUMNS}
            "#
        );

        let report = sqlx::query_as::<_, Report>(&sql)
            .bind(dto.timestamp.unwrap_or_else(Utc::now))
            .bind(point.lng)
            .bind(point.lat)
            .bind(&dto.location_name)
            .bind(&dto.description)
            .bind(&dto.image_urls)
            .bind(&dto.contact_source)
            .bind(dto.category.unwrap_or_default())
            .bind(dto.severity)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to create report: {:?}", e);
                AppError::Database(e)
            })?;

        tracing::info!("Created report {} at {}", report.id, report.location_name);
        Ok(report)
    }

    /// Partial update; absent fields keep their stored value
    pub async fn update(&self, id: Uuid, dto: UpdateReportDto) -> Result<Report> {
        let point = dto.point();

        let sql = format!(
            r#"
            UPDATE reports SET
                timestamp = COALESCE($2, timestamp),
                lng = COALESCE($3, lng),
                lat = COALESCE($4, lat),
                location_name = COALESCE($5, location_name),
                description = COALESCE($6, description),
                image_urls = COALESCE($7, image_urls),
                contact_source = COALESCE($8, contact_source),
                category = COALESCE($9, category),
                severity = COALESCE($10, severity),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {REPORT_COLUMNS}
            "#
        );

        sqlx::query_as::<_, Report>(&sql)
            .bind(id)
            .bind(dto.timestamp)
            .bind(point.map(|p| p.lng))
            .bind(point.map(|p| p.lat))
            .bind(dto.location_name)
            .bind(dto.description)
            .bind(dto.image_urls)
            .bind(dto.contact_source)
            .bind(dto.category)
            .bind(dto.severity)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to update report {}: {:?}", id, e);
                AppError::Database(e)
            })?
            .ok_or_else(|| AppError::NotFound("Report not found".to_string()))
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM reports WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete report {}: {:?}", id, e);
                AppError::Database(e)
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Report not found".to_string()));
        }

        Ok(())
    }

    pub async fn summary(&self) -> Result<ReportSummaryDto> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reports")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to count reports: {:?}", e);
                AppError::Database(e)
            })?;

        let by_severity = self.count_by("severity").await?;
        let by_category = self.count_by("category").await?;

        Ok(ReportSummaryDto {
            total,
            by_severity,
            by_category,
        })
    }

    /// `column` is one of the fixed enum columns above, never user input
    async fn count_by(&self, column: &'static str) -> Result<Vec<BucketCount>> {
        let sql = format!(
            r#"
            SELECT {column}::text AS key, COUNT(*) AS count
            FROM reports
            GROUP BY {column}
            ORDER BY count DESC, key
            "#
        );

        sqlx::query_as::<_, BucketCount>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to count reports by {}: {:?}", column, e);
                AppError::Database(e)
            })
    }
}
