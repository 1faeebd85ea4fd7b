use chrono::{DateTime, Utc};
use geo::{MultiPolygon, Polygon};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::core::error::AppError;

/// Administrative level of a boundary polygon, coarsest first
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Type,
    ToSchema,
)]
#[sqlx(type_name = "admin_level", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AdminLevel {
    Provinsi,
    Kabupaten,
    Kecamatan,
}

impl AdminLevel {
    pub const ALL: [AdminLevel; 3] = [
        AdminLevel::Provinsi,
        AdminLevel::Kabupaten,
        AdminLevel::Kecamatan,
    ];

    /// Default LOD zoom range `(zoom_min, zoom_max)`. Adjacent tiers share
    /// their boundary zoom so the map never shows an empty layer.
    pub fn default_zoom_range(&self) -> (i32, i32) {
        match self {
            AdminLevel::Provinsi => (4, 7),
            AdminLevel::Kabupaten => (7, 9),
            AdminLevel::Kecamatan => (9, 22),
        }
    }

    /// Human-readable level name shown on the map
    pub fn display_name(&self) -> &'static str {
        match self {
            AdminLevel::Provinsi => "Provinsi",
            AdminLevel::Kabupaten => "Kabupaten/Kota",
            AdminLevel::Kecamatan => "Kecamatan",
        }
    }
}

impl std::fmt::Display for AdminLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AdminLevel::Provinsi => write!(f, "provinsi"),
            AdminLevel::Kabupaten => write!(f, "kabupaten"),
            AdminLevel::Kecamatan => write!(f, "kecamatan"),
        }
    }
}

/// Code and name of one administrative unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionRef {
    pub kode: String,
    pub nama: String,
}

impl RegionRef {
    pub fn new(kode: impl Into<String>, nama: impl Into<String>) -> Self {
        Self {
            kode: kode.into(),
            nama: nama.into(),
        }
    }
}

/// Identity chain of a boundary. The variant fixes the admin level and
/// guarantees every ancestor is present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminIdentity {
    Provinsi {
        provinsi: RegionRef,
    },
    Kabupaten {
        provinsi: RegionRef,
        kabupaten: RegionRef,
    },
    Kecamatan {
        provinsi: RegionRef,
        kabupaten: RegionRef,
        kecamatan: RegionRef,
    },
}

/// Returned when the populated code/name columns do not form the chain
/// required by the admin level.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{level} boundary is missing {missing}")]
pub struct IdentityError {
    pub level: AdminLevel,
    pub missing: &'static str,
}

/// Flat code/name columns as stored or imported
#[derive(Debug, Clone, Default)]
pub struct IdentityColumns {
    pub kode_provinsi: Option<String>,
    pub nama_provinsi: Option<String>,
    pub kode_kabupaten: Option<String>,
    pub nama_kabupaten: Option<String>,
    pub kode_kecamatan: Option<String>,
    pub nama_kecamatan: Option<String>,
}

fn region_ref(
    level: AdminLevel,
    kode: Option<String>,
    nama: Option<String>,
    missing: &'static str,
) -> Result<RegionRef, IdentityError> {
    match (kode, nama) {
        (Some(kode), Some(nama)) if !kode.is_empty() && !nama.is_empty() => {
            Ok(RegionRef { kode, nama })
        }
        _ => Err(IdentityError { level, missing }),
    }
}

fn split(region: Option<&RegionRef>) -> (Option<String>, Option<String>) {
    match region {
        Some(r) => (Some(r.kode.clone()), Some(r.nama.clone())),
        None => (None, None),
    }
}

impl AdminIdentity {
    pub fn from_columns(level: AdminLevel, c: IdentityColumns) -> Result<Self, IdentityError> {
        let provinsi = region_ref(level, c.kode_provinsi, c.nama_provinsi, "provinsi")?;
        match level {
            AdminLevel::Provinsi => {
                if c.kode_kabupaten.is_some() || c.kode_kecamatan.is_some() {
                    return Err(IdentityError {
                        level,
                        missing: "an empty kabupaten/kecamatan chain",
                    });
                }
                Ok(AdminIdentity::Provinsi { provinsi })
            }
            AdminLevel::Kabupaten => {
                if c.kode_kecamatan.is_some() {
                    return Err(IdentityError {
                        level,
                        missing: "an empty kecamatan code",
                    });
                }
                let kabupaten = region_ref(level, c.kode_kabupaten, c.nama_kabupaten, "kabupaten")?;
                Ok(AdminIdentity::Kabupaten {
                    provinsi,
                    kabupaten,
                })
            }
            AdminLevel::Kecamatan => {
                let kabupaten = region_ref(level, c.kode_kabupaten, c.nama_kabupaten, "kabupaten")?;
                let kecamatan = region_ref(level, c.kode_kecamatan, c.nama_kecamatan, "kecamatan")?;
                Ok(AdminIdentity::Kecamatan {
                    provinsi,
                    kabupaten,
                    kecamatan,
                })
            }
        }
    }

    pub fn to_columns(&self) -> IdentityColumns {
        let (kode_provinsi, nama_provinsi) = split(Some(self.provinsi()));
        let (kode_kabupaten, nama_kabupaten) = split(self.kabupaten());
        let (kode_kecamatan, nama_kecamatan) = split(self.kecamatan());
        IdentityColumns {
            kode_provinsi,
            nama_provinsi,
            kode_kabupaten,
            nama_kabupaten,
            kode_kecamatan,
            nama_kecamatan,
        }
    }

    pub fn level(&self) -> AdminLevel {
        match self {
            AdminIdentity::Provinsi { .. } => AdminLevel::Provinsi,
            AdminIdentity::Kabupaten { .. } => AdminLevel::Kabupaten,
            AdminIdentity::Kecamatan { .. } => AdminLevel::Kecamatan,
        }
    }

    pub fn provinsi(&self) -> &RegionRef {
        match self {
            AdminIdentity::Provinsi { provinsi }
            | AdminIdentity::Kabupaten { provinsi, .. }
            | AdminIdentity::Kecamatan { provinsi, .. } => provinsi,
        }
    }

    pub fn kabupaten(&self) -> Option<&RegionRef> {
        match self {
            AdminIdentity::Provinsi { .. } => None,
            AdminIdentity::Kabupaten { kabupaten, .. }
            | AdminIdentity::Kecamatan { kabupaten, .. } => Some(kabupaten),
        }
    }

    pub fn kecamatan(&self) -> Option<&RegionRef> {
        match self {
            AdminIdentity::Kecamatan { kecamatan, .. } => Some(kecamatan),
            _ => None,
        }
    }
}

/// Boundary outline in lon/lat
#[derive(Debug, Clone, PartialEq)]
pub enum BoundaryGeometry {
    Polygon(Polygon<f64>),
    MultiPolygon(MultiPolygon<f64>),
}

impl TryFrom<geojson::Geometry> for BoundaryGeometry {
    type Error = AppError;

    fn try_from(geometry: geojson::Geometry) -> Result<Self, Self::Error> {
        match geometry.value {
            value @ geojson::Value::Polygon(_) => Polygon::<f64>::try_from(value)
                .map(BoundaryGeometry::Polygon)
                .map_err(|e| AppError::Internal(format!("Invalid polygon: {}", e))),
            value @ geojson::Value::MultiPolygon(_) => MultiPolygon::<f64>::try_from(value)
                .map(BoundaryGeometry::MultiPolygon)
                .map_err(|e| AppError::Internal(format!("Invalid multipolygon: {}", e))),
            other => Err(AppError::Internal(format!(
                "Unsupported boundary geometry type: {}",
                geometry_type_name(&other)
            ))),
        }
    }
}

fn geometry_type_name(value: &geojson::Value) -> &'static str {
    match value {
        geojson::Value::Point(_) => "Point",
        geojson::Value::MultiPoint(_) => "MultiPoint",
        geojson::Value::LineString(_) => "LineString",
        geojson::Value::MultiLineString(_) => "MultiLineString",
        geojson::Value::Polygon(_) => "Polygon",
        geojson::Value::MultiPolygon(_) => "MultiPolygon",
        geojson::Value::GeometryCollection(_) => "GeometryCollection",
    }
}

impl From<&BoundaryGeometry> for geojson::Geometry {
    fn from(geometry: &BoundaryGeometry) -> Self {
        let value = match geometry {
            BoundaryGeometry::Polygon(polygon) => geojson::Value::from(polygon),
            BoundaryGeometry::MultiPolygon(multi) => geojson::Value::from(multi),
        };
        geojson::Geometry::new(value)
    }
}

/// Demographic attributes carried over from the BNPB source layer
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundaryAttributes {
    pub objectid: Option<i64>,
    pub population: Option<i64>,
    pub households: Option<i64>,
    pub area: Option<f64>,
    pub luas_wilayah: Option<f64>,
    pub jumlah_penduduk: Option<i64>,
    pub jumlah_kk: Option<i64>,
    pub kepadatan: Option<f64>,
    pub raw: Option<serde_json::Value>,
}

/// Pre-simplified administrative boundary, visible for `zoom_min..=zoom_max`
#[derive(Debug, Clone)]
pub struct BoundaryPolygon {
    pub id: Uuid,
    pub identity: AdminIdentity,
    pub zoom_min: i32,
    pub zoom_max: i32,
    pub geometry: BoundaryGeometry,
    pub attributes: BoundaryAttributes,
    pub source: String,
    pub simplification_tolerance: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BoundaryPolygon {
    pub fn admin_level(&self) -> AdminLevel {
        self.identity.level()
    }

    pub fn covers_zoom(&self, zoom: i32) -> bool {
        self.zoom_min <= zoom && zoom <= self.zoom_max
    }
}

/// Database row for `boundary_polygons`, geometry selected as GeoJSON text
#[derive(Debug, Clone, FromRow)]
pub struct BoundaryRow {
    pub id: Uuid,
    pub admin_level: AdminLevel,
    pub zoom_min: i32,
    pub zoom_max: i32,
    pub kode_provinsi: Option<String>,
    pub nama_provinsi: Option<String>,
    pub kode_kabupaten: Option<String>,
    pub nama_kabupaten: Option<String>,
    pub kode_kecamatan: Option<String>,
    pub nama_kecamatan: Option<String>,
    pub geometry: String,
    pub objectid: Option<i64>,
    pub population: Option<i64>,
    pub households: Option<i64>,
    pub area: Option<f64>,
    pub luas_wilayah: Option<f64>,
    pub jumlah_penduduk: Option<i64>,
    pub jumlah_kk: Option<i64>,
    pub kepadatan: Option<f64>,
    pub raw: Option<serde_json::Value>,
    pub source: String,
    pub simplification_tolerance: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<BoundaryRow> for BoundaryPolygon {
    type Error = AppError;

    fn try_from(row: BoundaryRow) -> Result<Self, Self::Error> {
        let identity = AdminIdentity::from_columns(
            row.admin_level,
            IdentityColumns {
                kode_provinsi: row.kode_provinsi,
                nama_provinsi: row.nama_provinsi,
                kode_kabupaten: row.kode_kabupaten,
                nama_kabupaten: row.nama_kabupaten,
                kode_kecamatan: row.kode_kecamatan,
                nama_kecamatan: row.nama_kecamatan,
            },
        )
        .map_err(|e| AppError::Internal(format!("Boundary {}: {}", row.id, e)))?;

        let geojson: geojson::Geometry = serde_json::from_str(&row.geometry).map_err(|e| {
            AppError::Internal(format!("Boundary {} geometry is not GeoJSON: {}", row.id, e))
        })?;

        Ok(Self {
            id: row.id,
            identity,
            zoom_min: row.zoom_min,
            zoom_max: row.zoom_max,
            geometry: BoundaryGeometry::try_from(geojson)?,
            attributes: BoundaryAttributes {
                objectid: row.objectid,
                population: row.population,
                households: row.households,
                area: row.area,
                luas_wilayah: row.luas_wilayah,
                jumlah_penduduk: row.jumlah_penduduk,
                jumlah_kk: row.jumlah_kk,
                kepadatan: row.kepadatan,
                raw: row.raw,
            },
            source: row.source,
            simplification_tolerance: row.simplification_tolerance,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Boundary ready for insertion by the importer
#[derive(Debug, Clone)]
pub struct NewBoundary {
    pub identity: AdminIdentity,
    pub zoom_min: i32,
    pub zoom_max: i32,
    pub geometry: geojson::Geometry,
    pub attributes: BoundaryAttributes,
    pub source: String,
    pub simplification_tolerance: f64,
}

/// Per-level row count and zoom envelope
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct LevelStats {
    pub admin_level: AdminLevel,
    pub count: i64,
    pub zoom_min: i32,
    pub zoom_max: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns(levels: usize) -> IdentityColumns {
        let mut c = IdentityColumns {
            kode_provinsi: Some("11".into()),
            nama_provinsi: Some("ACEH".into()),
            ..Default::default()
        };
        if levels > 1 {
            c.kode_kabupaten = Some("1101".into());
            c.nama_kabupaten = Some("SIMEULUE".into());
        }
        if levels > 2 {
            c.kode_kecamatan = Some("110101".into());
            c.nama_kecamatan = Some("TEUPAH SELATAN".into());
        }
        c
    }

    #[test]
    fn test_identity_matches_level() {
        let identity = AdminIdentity::from_columns(AdminLevel::Kabupaten, columns(2)).unwrap();
        assert_eq!(identity.level(), AdminLevel::Kabupaten);
        assert_eq!(identity.provinsi().nama, "ACEH");
        assert_eq!(identity.kabupaten().map(|k| k.kode.as_str()), Some("1101"));
        assert!(identity.kecamatan().is_none());
    }

    #[test]
    fn test_identity_columns_roundtrip() {
        let identity = AdminIdentity::from_columns(AdminLevel::Kecamatan, columns(3)).unwrap();
        let again = AdminIdentity::from_columns(AdminLevel::Kecamatan, identity.to_columns());
        assert_eq!(again, Ok(identity));
    }

    #[test]
    fn test_identity_rejects_missing_ancestor() {
        let mut c = columns(3);
        c.nama_kabupaten = None;
        let err = AdminIdentity::from_columns(AdminLevel::Kecamatan, c).unwrap_err();
        assert_eq!(err.missing, "kabupaten");
    }

    #[test]
    fn test_identity_rejects_extra_levels() {
        assert!(AdminIdentity::from_columns(AdminLevel::Provinsi, columns(2)).is_err());
        assert!(AdminIdentity::from_columns(AdminLevel::Kabupaten, columns(3)).is_err());
    }

    #[test]
    fn test_admin_level_ordering() {
        assert!(AdminLevel::Provinsi < AdminLevel::Kabupaten);
        assert!(AdminLevel::Kabupaten < AdminLevel::Kecamatan);
        assert_eq!(AdminLevel::Kabupaten.display_name(), "Kabupaten/Kota");
    }

    #[test]
    fn test_geometry_rejects_points() {
        let point = geojson::Geometry::new(geojson::Value::Point(vec![98.0, 3.0]));
        assert!(BoundaryGeometry::try_from(point).is_err());
    }

    #[test]
    fn test_geometry_roundtrip_keeps_variant() {
        let square = geojson::Geometry::new(geojson::Value::Polygon(vec![vec![
            vec![0.0, 0.0],
            vec![1.0, 0.0],
            vec![1.0, 1.0],
            vec![0.0, 1.0],
            vec![0.0, 0.0],
        ]]));
        let geometry = BoundaryGeometry::try_from(square).unwrap();
        assert!(matches!(geometry, BoundaryGeometry::Polygon(_)));
        let back = geojson::Geometry::from(&geometry);
        assert!(matches!(back.value, geojson::Value::Polygon(_)));
    }
}
