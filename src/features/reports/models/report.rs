use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "report_category", rename_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum ReportCategory {
    #[default]
    Banjir,
    BanjirBandang,
    Longsor,
    Lainnya,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "report_severity", rename_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum ReportSeverity {
    Ringan,
    Sedang,
    Berat,
    SangatBerat,
}

/// Citizen flood report
#[derive(Debug, Clone, FromRow)]
pub struct Report {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub lng: f64,
    pub lat: f64,
    pub location_name: String,
    pub description: String,
    pub image_urls: Vec<String>,
    pub contact_source: String,
    pub category: ReportCategory,
    pub severity: ReportSeverity,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One `GROUP BY` bucket of the report summary
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize, ToSchema)]
pub struct BucketCount {
    pub key: String,
    pub count: i64,
}
