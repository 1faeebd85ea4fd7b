use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::features::boundaries::models::{AdminLevel, LevelStats};

pub const FEATURE_TYPE: &str = "Feature";
pub const FEATURE_COLLECTION_TYPE: &str = "FeatureCollection";

/// Raw query parameters for `GET /api/boundaries`. Values stay strings so
/// malformed input is reported with the resolver's own messages.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct BoundaryListQuery {
    /// Integer zoom level (required)
    #[param(example = "8")]
    pub zoom: Option<String>,
    /// Viewport as JSON: `{"west":..,"south":..,"east":..,"north":..}`
    #[param(example = r#"{"west":95,"south":2,"east":98.5,"north":6}"#)]
    pub bounds: Option<String>,
    /// Province code filter
    pub provinsi: Option<String>,
    /// Regency code filter
    pub kabupaten: Option<String>,
}

/// Demographic attributes, keyed as in the BNPB source layer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BoundaryAttributesDto {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub objectid: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub population: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub households: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub area: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub luas_wilayah: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub jumlah_penduduk: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub jumlah_kk: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub kepadatan: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    #[schema(value_type = Option<Object>)]
    pub raw: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BoundaryPropertiesDto {
    pub admin_level: AdminLevel,
    pub level_name: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub kode_provinsi: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub nama_provinsi: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub kode_kabupaten: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub nama_kabupaten: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub kode_kecamatan: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub nama_kecamatan: Option<String>,
    pub zoom_min: i32,
    pub zoom_max: i32,
    #[serde(flatten)]
    pub attributes: BoundaryAttributesDto,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BoundaryFeatureDto {
    #[serde(rename = "type")]
    #[schema(example = "Feature")]
    pub kind: String,
    pub id: Uuid,
    pub properties: BoundaryPropertiesDto,
    /// GeoJSON Polygon or MultiPolygon
    #[schema(value_type = Object)]
    pub geometry: geojson::Geometry,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CollectionMetadataDto {
    pub zoom: i32,
    pub count: usize,
    /// Level of the first feature, null when empty
    pub admin_level: Option<AdminLevel>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BoundaryFeatureCollectionDto {
    #[serde(rename = "type")]
    #[schema(example = "FeatureCollection")]
    pub kind: String,
    pub metadata: CollectionMetadataDto,
    pub features: Vec<BoundaryFeatureDto>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LevelStatsDto {
    pub admin_level: AdminLevel,
    pub count: i64,
    pub zoom_min: i32,
    pub zoom_max: i32,
}

impl From<LevelStats> for LevelStatsDto {
    fn from(stats: LevelStats) -> Self {
        Self {
            admin_level: stats.admin_level,
            count: stats.count,
            zoom_min: stats.zoom_min,
            zoom_max: stats.zoom_max,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BoundaryStatsDto {
    pub total: i64,
    pub by_level: Vec<LevelStatsDto>,
}

impl From<Vec<LevelStats>> for BoundaryStatsDto {
    fn from(stats: Vec<LevelStats>) -> Self {
        Self {
            total: stats.iter().map(|s| s.count).sum(),
            by_level: stats.into_iter().map(Into::into).collect(),
        }
    }
}
