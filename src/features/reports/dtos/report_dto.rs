use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::features::reports::models::{BucketCount, Report, ReportCategory, ReportSeverity};
use crate::shared::types::{GeoPoint, PointDto};

#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateReportDto {
    /// When the flooding was observed (default: now)
    pub timestamp: Option<DateTime<Utc>>,

    #[validate(nested)]
    pub location: PointDto,

    #[validate(length(min = 1, message = "Location name is required"))]
    pub location_name: String,

    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,

    #[serde(default)]
    #[validate(custom(function = "crate::shared::validation::validate_image_urls"))]
    pub image_urls: Vec<String>,

    #[validate(length(min = 1, message = "Contact source is required"))]
    pub contact_source: String,

    pub category: Option<ReportCategory>,

    pub severity: ReportSeverity,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateReportDto {
    pub timestamp: Option<DateTime<Utc>>,

    #[validate(nested)]
    pub location: Option<PointDto>,

    #[validate(length(min = 1, message = "Location name must not be empty"))]
    pub location_name: Option<String>,

    #[validate(length(min = 1, message = "Description must not be empty"))]
    pub description: Option<String>,

    #[validate(custom(function = "crate::shared::validation::validate_image_urls"))]
    pub image_urls: Option<Vec<String>>,

    #[validate(length(min = 1, message = "Contact source must not be empty"))]
    pub contact_source: Option<String>,

    pub category: Option<ReportCategory>,

    pub severity: Option<ReportSeverity>,
}

impl UpdateReportDto {
    pub fn point(&self) -> Option<GeoPoint> {
        self.location.as_ref().and_then(PointDto::to_point)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportResponseDto {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub location: PointDto,
    pub location_name: String,
    pub description: String,
    pub image_urls: Vec<String>,
    pub contact_source: String,
    pub category: ReportCategory,
    pub severity: ReportSeverity,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Report> for ReportResponseDto {
    fn from(report: Report) -> Self {
        Self {
            id: report.id,
            timestamp: report.timestamp,
            location: GeoPoint {
                lng: report.lng,
                lat: report.lat,
            }
            .into(),
            location_name: report.location_name,
            description: report.description,
            image_urls: report.image_urls,
            contact_source: report.contact_source,
            category: report.category,
            severity: report.severity,
            created_at: report.created_at,
            updated_at: report.updated_at,
        }
    }
}

/// Report counts overall and per severity and category
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummaryDto {
    pub total: i64,
    pub by_severity: Vec<BucketCount>,
    pub by_category: Vec<BucketCount>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_body() -> serde_json::Value {
        json!({
            "location": { "type": "Point", "coordinates": [98.6722, 3.5952] },
            "locationName": "Medan Maimun",
            "description": "Air setinggi lutut di jalan utama",
            "contactSource": "warga",
            "severity": "sangat-berat"
        })
    }

    #[test]
    fn test_create_defaults() {
        let dto: CreateReportDto = serde_json::from_value(valid_body()).unwrap();
        assert!(dto.validate().is_ok());
        assert!(dto.image_urls.is_empty());
        assert_eq!(dto.category, None);
        assert_eq!(dto.severity, ReportSeverity::SangatBerat);
    }

    #[test]
    fn test_create_rejects_bad_coordinates() {
        let mut body = valid_body();
        body["location"]["coordinates"] = json!([98.6722]);
        let dto: CreateReportDto = serde_json::from_value(body).unwrap();
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_create_rejects_non_http_image_url() {
        let mut body = valid_body();
        body["imageUrls"] = json!(["https://cdn.example.com/a.jpg", "ftp://example.com/b.jpg"]);
        let dto: CreateReportDto = serde_json::from_value(body).unwrap();
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_unknown_severity_fails_to_parse() {
        let mut body = valid_body();
        body["severity"] = json!("parah");
        assert!(serde_json::from_value::<CreateReportDto>(body).is_err());
    }

    #[test]
    fn test_response_location_is_geojson_point() {
        let now = Utc::now();
        let dto = ReportResponseDto::from(Report {
            id: Uuid::new_v4(),
            timestamp: now,
            lng: 95.32,
            lat: 5.55,
            location_name: "Banda Aceh".into(),
            description: "Banjir".into(),
            image_urls: vec![],
            contact_source: "BPBD".into(),
            category: ReportCategory::BanjirBandang,
            severity: ReportSeverity::Berat,
            created_at: now,
            updated_at: now,
        });

        let json = serde_json::to_value(dto).unwrap();
        assert_eq!(json["location"]["type"], "Point");
        assert_eq!(json["location"]["coordinates"], json!([95.32, 5.55]));
        assert_eq!(json["category"], "banjir-bandang");
    }
}
