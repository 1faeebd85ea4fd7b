use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::features::boundaries::dtos::{FEATURE_COLLECTION_TYPE, FEATURE_TYPE};
use crate::features::regions::models::{Region, RegionBoundaryRow, TipeDesa};
use crate::shared::constants::MAX_PAGE_SIZE;
use crate::shared::types::{GeoPoint, PaginationQuery, PointDto};
use crate::shared::validation::KODE_WILAYAH_REGEX;

/// Default page size for region listings
pub const DEFAULT_REGION_PAGE_SIZE: i64 = 100;

/// Default feature cap for `/api/regions/geojson`
pub const DEFAULT_GEOJSON_LIMIT: i64 = 100;

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct RegionListQuery {
    #[param(minimum = 1)]
    pub page: Option<i64>,
    /// Page size (default 100)
    #[param(minimum = 1, maximum = 500)]
    pub limit: Option<i64>,
    pub provinsi: Option<String>,
    pub kabupaten: Option<String>,
    pub kecamatan: Option<String>,
    /// Case-insensitive match on village, district or regency name
    pub search: Option<String>,
}

impl RegionListQuery {
    pub fn pagination(&self) -> PaginationQuery {
        PaginationQuery::with_limit(self.page, self.limit, DEFAULT_REGION_PAGE_SIZE)
    }
}

/// `?provinsi=` / `?kabupaten=` / `?kecamatan=` parent filter
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct ParentCodeQuery {
    pub provinsi: Option<String>,
    pub kabupaten: Option<String>,
    pub kecamatan: Option<String>,
}

impl ParentCodeQuery {
    fn require<'a>(value: &'a Option<String>, message: &str) -> Result<&'a str> {
        value
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AppError::InvalidParameter(message.to_string()))
    }

    pub fn provinsi(&self) -> Result<&str> {
        Self::require(&self.provinsi, "Kode provinsi is required")
    }

    pub fn kabupaten(&self) -> Result<&str> {
        Self::require(&self.kabupaten, "Kode kabupaten is required")
    }

    pub fn kecamatan(&self) -> Result<&str> {
        Self::require(&self.kecamatan, "Kode kecamatan is required")
    }
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct RegionGeoJsonQuery {
    pub provinsi: Option<String>,
    pub kabupaten: Option<String>,
    pub kecamatan: Option<String>,
    /// Maximum features returned (default 100)
    pub limit: Option<i64>,
}

impl RegionGeoJsonQuery {
    pub fn limit(&self) -> i64 {
        self.limit
            .unwrap_or(DEFAULT_GEOJSON_LIMIT)
            .clamp(1, MAX_PAGE_SIZE)
    }
}

/// Demographic attributes carried over from the BNPB source layer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BnpbPropertiesDto {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub objectid: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub population: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub households: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub area: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    #[schema(value_type = Option<Object>)]
    pub raw: Option<serde_json::Value>,
}

impl BnpbPropertiesDto {
    fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateRegionDto {
    #[validate(regex(
        path = *KODE_WILAYAH_REGEX,
        message = "Kode desa must be a numeric region code"
    ))]
    pub kode_desa: String,
    #[validate(length(min = 1, message = "Nama desa is required"))]
    pub nama_desa: String,
    #[validate(length(min = 1, message = "Kode kecamatan is required"))]
    pub kode_kecamatan: String,
    #[validate(length(min = 1, message = "Nama kecamatan is required"))]
    pub nama_kecamatan: String,
    #[validate(length(min = 1, message = "Kode kabupaten is required"))]
    pub kode_kabupaten: String,
    #[validate(length(min = 1, message = "Nama kabupaten is required"))]
    pub nama_kabupaten: String,
    #[validate(length(min = 1, message = "Kode provinsi is required"))]
    pub kode_provinsi: String,
    #[validate(length(min = 1, message = "Nama provinsi is required"))]
    pub nama_provinsi: String,
    pub tipe_desa: TipeDesa,
    #[validate(nested)]
    pub location: Option<PointDto>,
    /// GeoJSON Polygon or MultiPolygon
    #[schema(value_type = Option<Object>)]
    pub boundary: Option<geojson::Geometry>,
    pub bnpb_properties: Option<BnpbPropertiesDto>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRegionDto {
    #[validate(length(min = 1))]
    pub nama_desa: Option<String>,
    #[validate(length(min = 1))]
    pub kode_kecamatan: Option<String>,
    #[validate(length(min = 1))]
    pub nama_kecamatan: Option<String>,
    #[validate(length(min = 1))]
    pub kode_kabupaten: Option<String>,
    #[validate(length(min = 1))]
    pub nama_kabupaten: Option<String>,
    #[validate(length(min = 1))]
    pub kode_provinsi: Option<String>,
    #[validate(length(min = 1))]
    pub nama_provinsi: Option<String>,
    pub tipe_desa: Option<TipeDesa>,
    #[validate(nested)]
    pub location: Option<PointDto>,
    #[schema(value_type = Option<Object>)]
    pub boundary: Option<geojson::Geometry>,
    pub bnpb_properties: Option<BnpbPropertiesDto>,
}

/// Serialize a region boundary for `ST_GeomFromGeoJSON`. Only Polygon and
/// MultiPolygon are stored; polygons are promoted to MultiPolygon in SQL.
pub fn boundary_geojson(boundary: Option<&geojson::Geometry>) -> Result<Option<String>> {
    match boundary.map(|g| &g.value) {
        None => Ok(None),
        Some(geojson::Value::Polygon(_)) | Some(geojson::Value::MultiPolygon(_)) => boundary
            .map(|g| {
                serde_json::to_string(g)
                    .map_err(|e| AppError::Internal(format!("Failed to encode boundary: {}", e)))
            })
            .transpose(),
        Some(_) => Err(AppError::Validation(
            "Boundary must be a Polygon or MultiPolygon".to_string(),
        )),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegionResponseDto {
    pub id: Uuid,
    pub kode_desa: String,
    pub nama_desa: String,
    pub kode_kecamatan: String,
    pub nama_kecamatan: String,
    pub kode_kabupaten: String,
    pub nama_kabupaten: String,
    pub kode_provinsi: String,
    pub nama_provinsi: String,
    pub tipe_desa: TipeDesa,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<PointDto>,
    /// Whether a boundary polygon is stored (served by `/api/regions/geojson`)
    pub has_boundary: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bnpb_properties: Option<BnpbPropertiesDto>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Region> for RegionResponseDto {
    fn from(region: Region) -> Self {
        let bnpb = BnpbPropertiesDto {
            objectid: region.bnpb_objectid,
            population: region.bnpb_population,
            households: region.bnpb_households,
            area: region.bnpb_area,
            raw: region.bnpb_raw,
        };

        Self {
            id: region.id,
            kode_desa: region.kode_desa,
            nama_desa: region.nama_desa,
            kode_kecamatan: region.kode_kecamatan,
            nama_kecamatan: region.nama_kecamatan,
            kode_kabupaten: region.kode_kabupaten,
            nama_kabupaten: region.nama_kabupaten,
            kode_provinsi: region.kode_provinsi,
            nama_provinsi: region.nama_provinsi,
            tipe_desa: region.tipe_desa,
            location: GeoPoint::from_columns(region.lng, region.lat).map(Into::into),
            has_boundary: region.has_boundary,
            bnpb_properties: (!bnpb.is_empty()).then_some(bnpb),
            created_at: region.created_at,
            updated_at: region.updated_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegionFeaturePropertiesDto {
    pub kode_desa: String,
    pub nama_desa: String,
    pub kode_kecamatan: String,
    pub nama_kecamatan: String,
    pub kode_kabupaten: String,
    pub nama_kabupaten: String,
    pub kode_provinsi: String,
    pub nama_provinsi: String,
    pub population: Option<i64>,
    pub households: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RegionFeatureDto {
    #[serde(rename = "type")]
    #[schema(example = "Feature")]
    pub kind: String,
    #[schema(value_type = Object)]
    pub geometry: geojson::Geometry,
    pub properties: RegionFeaturePropertiesDto,
}

impl TryFrom<RegionBoundaryRow> for RegionFeatureDto {
    type Error = AppError;

    fn try_from(row: RegionBoundaryRow) -> Result<Self> {
        let geometry: geojson::Geometry = serde_json::from_str(&row.boundary).map_err(|e| {
            AppError::Internal(format!(
                "Region {} boundary is not GeoJSON: {}",
                row.kode_desa, e
            ))
        })?;

        Ok(Self {
            kind: FEATURE_TYPE.to_string(),
            geometry,
            properties: RegionFeaturePropertiesDto {
                kode_desa: row.kode_desa,
                nama_desa: row.nama_desa,
                kode_kecamatan: row.kode_kecamatan,
                nama_kecamatan: row.nama_kecamatan,
                kode_kabupaten: row.kode_kabupaten,
                nama_kabupaten: row.nama_kabupaten,
                kode_provinsi: row.kode_provinsi,
                nama_provinsi: row.nama_provinsi,
                population: row.bnpb_population,
                households: row.bnpb_households,
            },
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RegionFeatureCollectionDto {
    #[serde(rename = "type")]
    #[schema(example = "FeatureCollection")]
    pub kind: String,
    pub features: Vec<RegionFeatureDto>,
}

impl RegionFeatureCollectionDto {
    pub fn new(features: Vec<RegionFeatureDto>) -> Self {
        Self {
            kind: FEATURE_COLLECTION_TYPE.to_string(),
            features,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokio_test::{assert_err, assert_ok};

    fn create_body() -> serde_json::Value {
        json!({
            "kodeDesa": "12.71.01.1001",
            "namaDesa": "Aur",
            "kodeKecamatan": "12.71.01",
            "namaKecamatan": "Medan Maimun",
            "kodeKabupaten": "12.71",
            "namaKabupaten": "Kota Medan",
            "kodeProvinsi": "12",
            "namaProvinsi": "Sumatera Utara",
            "tipeDesa": "KELURAHAN"
        })
    }

    #[test]
    fn test_create_region_validates_kode_desa() {
        let dto: CreateRegionDto = serde_json::from_value(create_body()).unwrap();
        assert!(dto.validate().is_ok());
        assert_eq!(dto.tipe_desa, TipeDesa::Kelurahan);

        let mut body = create_body();
        body["kodeDesa"] = json!("12.71..01");
        let dto: CreateRegionDto = serde_json::from_value(body).unwrap();
        assert_err!(dto.validate());
    }

    #[test]
    fn test_tipe_desa_accepts_desa_adat() {
        let mut body = create_body();
        body["tipeDesa"] = json!("DESA ADAT");
        let dto: CreateRegionDto = serde_json::from_value(body).unwrap();
        assert_eq!(dto.tipe_desa, TipeDesa::DesaAdat);
    }

    #[test]
    fn test_boundary_must_be_polygonal() {
        let point: geojson::Geometry =
            serde_json::from_value(json!({ "type": "Point", "coordinates": [98.6, 3.6] }))
                .unwrap();
        assert!(matches!(
            boundary_geojson(Some(&point)),
            Err(AppError::Validation(_))
        ));

        let polygon: geojson::Geometry = serde_json::from_value(json!({
            "type": "Polygon",
            "coordinates": [[[98.0, 3.0], [99.0, 3.0], [99.0, 4.0], [98.0, 3.0]]]
        }))
        .unwrap();
        let encoded = assert_ok!(boundary_geojson(Some(&polygon)));
        assert!(encoded.is_some_and(|json| json.contains("\"Polygon\"")));

        assert_eq!(assert_ok!(boundary_geojson(None)), None);
    }

    #[test]
    fn test_geojson_limit_defaults_and_clamps() {
        assert_eq!(RegionGeoJsonQuery::default().limit(), 100);
        let query = RegionGeoJsonQuery {
            limit: Some(100_000),
            ..Default::default()
        };
        assert_eq!(query.limit(), MAX_PAGE_SIZE);
    }

    #[test]
    fn test_parent_code_required() {
        let query = ParentCodeQuery::default();
        assert!(matches!(
            query.provinsi(),
            Err(AppError::InvalidParameter(msg)) if msg == "Kode provinsi is required"
        ));

        let query = ParentCodeQuery {
            kabupaten: Some("12.71".into()),
            ..Default::default()
        };
        assert_eq!(query.kabupaten().unwrap(), "12.71");
    }
}
