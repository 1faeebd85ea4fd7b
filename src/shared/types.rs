use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::shared::constants::{DEFAULT_NEARBY_DISTANCE_M, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    pub meta: Option<Meta>,
    pub errors: Option<Vec<String>>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
    pub total: i64,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub total_pages: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub current_page: Option<i64>,
}

impl Meta {
    pub fn total(total: i64) -> Self {
        Self {
            total,
            total_pages: None,
            current_page: None,
        }
    }

    pub fn paged(total: i64, pagination: &PaginationQuery) -> Self {
        let limit = pagination.limit();
        Self {
            total,
            total_pages: Some((total + limit - 1) / limit),
            current_page: Some(pagination.page.max(1)),
        }
    }
}

// =============================================================================
// PAGINATION
// =============================================================================

#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct PaginationQuery {
    /// Page number (1-indexed, default: 1)
    #[serde(default = "default_page")]
    #[param(minimum = 1)]
    pub page: i64,

    /// Number of items per page
    #[serde(default = "default_page_size")]
    #[param(minimum = 1, maximum = 500)]
    pub limit: i64,
}

fn default_page() -> i64 {
    1
}

fn default_page_size() -> i64 {
    DEFAULT_PAGE_SIZE
}

impl Default for PaginationQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PaginationQuery {
    pub fn with_limit(page: Option<i64>, limit: Option<i64>, default_limit: i64) -> Self {
        Self {
            page: page.unwrap_or(1),
            limit: limit.unwrap_or(default_limit),
        }
    }

    /// SQL OFFSET for the current page
    pub fn offset(&self) -> i64 {
        (self.page.max(1) - 1) * self.limit()
    }

    /// Page size clamped to `MAX_PAGE_SIZE`
    pub fn limit(&self) -> i64 {
        self.limit.clamp(1, MAX_PAGE_SIZE)
    }
}

// =============================================================================
// GEO
// =============================================================================

/// A WGS84 longitude/latitude pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema, Validate)]
pub struct GeoPoint {
    #[validate(range(min = -180.0, max = 180.0))]
    pub lng: f64,
    #[validate(range(min = -90.0, max = 90.0))]
    pub lat: f64,
}

impl GeoPoint {
    pub fn from_columns(lng: Option<f64>, lat: Option<f64>) -> Option<Self> {
        Some(Self {
            lng: lng?,
            lat: lat?,
        })
    }
}

/// GeoJSON point as stored on reports, regions and flood data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema, Validate)]
pub struct PointDto {
    #[serde(rename = "type", default = "point_type")]
    #[schema(example = "Point")]
    pub kind: String,
    /// `[longitude, latitude]`
    #[validate(custom(function = "crate::shared::validation::validate_coordinates"))]
    pub coordinates: Vec<f64>,
}

fn point_type() -> String {
    "Point".to_string()
}

impl PointDto {
    pub fn to_point(&self) -> Option<GeoPoint> {
        match self.coordinates.as_slice() {
            [lng, lat] => Some(GeoPoint {
                lng: *lng,
                lat: *lat,
            }),
            _ => None,
        }
    }
}

impl From<GeoPoint> for PointDto {
    fn from(point: GeoPoint) -> Self {
        Self {
            kind: point_type(),
            coordinates: vec![point.lng, point.lat],
        }
    }
}

/// Point-radius search parameters shared by the `/nearby` endpoints
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct NearbyQuery {
    pub lng: Option<f64>,
    pub lat: Option<f64>,
    /// Search radius in meters (default 50000)
    pub max_distance: Option<f64>,
}

impl NearbyQuery {
    /// Returns `(lng, lat, radius_m)` or a message naming what is missing.
    pub fn resolve(&self) -> Result<(f64, f64, f64), String> {
        match (self.lng, self.lat) {
            (Some(lng), Some(lat)) => {
                let point = GeoPoint { lng, lat };
                point
                    .validate()
                    .map_err(|_| "Longitude or latitude out of range".to_string())?;
                let radius = self.max_distance.unwrap_or(DEFAULT_NEARBY_DISTANCE_M);
                if !radius.is_finite() || radius <= 0.0 {
                    return Err("maxDistance must be a positive number".to_string());
                }
                Ok((lng, lat, radius))
            }
            _ => Err("Longitude and latitude are required".to_string()),
        }
    }
}

/// Sort direction, `desc` unless `asc` is given
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

impl<T> ApiResponse<T> {
    pub fn success(data: Option<T>, message: Option<String>, meta: Option<Meta>) -> Self {
        Self {
            success: true,
            data,
            message,
            meta,
            errors: None,
        }
    }

    pub fn error(message: Option<String>, errors: Option<Vec<String>>) -> ApiResponse<()> {
        ApiResponse {
            success: false,
            data: None,
            message,
            meta: None,
            errors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_offset_and_clamp() {
        let query = PaginationQuery { page: 3, limit: 20 };
        assert_eq!(query.offset(), 40);

        let query = PaginationQuery {
            page: 0,
            limit: 10_000,
        };
        assert_eq!(query.offset(), 0);
        assert_eq!(query.limit(), MAX_PAGE_SIZE);
    }

    #[test]
    fn test_meta_paged_rounds_up() {
        let query = PaginationQuery { page: 2, limit: 50 };
        let meta = Meta::paged(101, &query);
        assert_eq!(meta.total_pages, Some(3));
        assert_eq!(meta.current_page, Some(2));
    }

    #[test]
    fn test_nearby_query_defaults_radius() {
        let query = NearbyQuery {
            lng: Some(98.67),
            lat: Some(3.59),
            max_distance: None,
        };
        assert_eq!(query.resolve(), Ok((98.67, 3.59, 50_000.0)));
    }

    #[test]
    fn test_nearby_query_requires_both_coordinates() {
        let query = NearbyQuery {
            lng: Some(98.67),
            lat: None,
            max_distance: None,
        };
        assert!(query.resolve().is_err());

        let query = NearbyQuery {
            lng: Some(200.0),
            lat: Some(3.0),
            max_distance: None,
        };
        assert!(query.resolve().is_err());
    }
}
