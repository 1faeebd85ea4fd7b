use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::error::AppError;
use crate::features::boundaries::models::{
    AdminIdentity, AdminLevel, BoundaryAttributes, BoundaryGeometry, BoundaryQuery,
    IdentityColumns, NewBoundary,
};
use crate::features::boundaries::services::{BoundaryService, PgBoundaryRepository};

/// Features whose failure reason is logged individually per tier
const LOGGED_ERRORS_PER_TIER: usize = 3;

/// Zoom levels probed after an import
const VERIFICATION_ZOOMS: [i32; 3] = [5, 8, 12];

/// One pre-simplified source layer
#[derive(Debug, Clone, PartialEq)]
pub struct ImportTier {
    pub level: AdminLevel,
    pub file_name: &'static str,
    pub zoom_min: i32,
    pub zoom_max: i32,
    pub simplification_tolerance: f64,
}

impl ImportTier {
    fn new(level: AdminLevel, file_name: &'static str, simplification_tolerance: f64) -> Self {
        let (zoom_min, zoom_max) = level.default_zoom_range();
        Self {
            level,
            file_name,
            zoom_min,
            zoom_max,
            simplification_tolerance,
        }
    }

    pub fn defaults() -> Vec<Self> {
        vec![
            Self::new(AdminLevel::Provinsi, "bnpb_level1_provinsi.geojson", 0.01),
            Self::new(AdminLevel::Kabupaten, "bnpb_level2_kabupaten.geojson", 0.005),
            Self::new(AdminLevel::Kecamatan, "bnpb_level3_kecamatan.geojson", 0.0005),
        ]
    }
}

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{path} is not a GeoJSON FeatureCollection: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("feature has no properties")]
    MissingProperties,

    #[error("feature has no geometry")]
    MissingGeometry,

    #[error("unsupported geometry: {0}")]
    Geometry(String),

    #[error("incomplete identity: {0}")]
    Identity(String),

    #[error(transparent)]
    Store(#[from] AppError),
}

#[derive(Debug, Default)]
pub struct ImportSummary {
    pub imported: BTreeMap<AdminLevel, usize>,
    pub skipped: usize,
    pub missing_files: Vec<PathBuf>,
}

fn property_string(props: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match props.get(*key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

fn property_f64(props: &Map<String, Value>, keys: &[&str]) -> Option<f64> {
    keys.iter().find_map(|key| match props.get(*key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

fn property_i64(props: &Map<String, Value>, keys: &[&str]) -> Option<i64> {
    keys.iter().find_map(|key| match props.get(*key)? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.round() as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

/// Map one source feature onto a boundary for `tier`, accepting both the
/// long and the shapefile-truncated BNPB property names.
pub fn boundary_from_feature(
    tier: &ImportTier,
    feature: &geojson::Feature,
) -> Result<NewBoundary, ImportError> {
    let props = feature
        .properties
        .as_ref()
        .ok_or(ImportError::MissingProperties)?;
    let geometry = feature
        .geometry
        .clone()
        .ok_or(ImportError::MissingGeometry)?;

    BoundaryGeometry::try_from(geometry.clone()).map_err(|e| ImportError::Geometry(e.to_string()))?;

    let mut columns = IdentityColumns {
        kode_provinsi: property_string(props, &["kode_provinsi", "kode_prop_"]),
        nama_provinsi: property_string(props, &["nama_provinsi", "nama_prop"]),
        ..Default::default()
    };
    if tier.level >= AdminLevel::Kabupaten {
        columns.kode_kabupaten = property_string(props, &["kode_kabupaten", "kode_kab_"]);
        columns.nama_kabupaten = property_string(props, &["nama_kabupaten", "nama_kab"]);
    }
    if tier.level >= AdminLevel::Kecamatan {
        columns.kode_kecamatan = property_string(props, &["kode_kecamatan", "kode_kec_"]);
        columns.nama_kecamatan = property_string(props, &["nama_kecamatan", "nama_kec"]);
    }

    let identity = AdminIdentity::from_columns(tier.level, columns)
        .map_err(|e| ImportError::Identity(e.to_string()))?;

    let attributes = BoundaryAttributes {
        objectid: property_i64(props, &["objectid", "OBJECTID"]),
        population: property_i64(props, &["population", "jumlah_pen"]),
        households: property_i64(props, &["households", "jumlah_kk"]),
        area: property_f64(props, &["area", "luas_wilay"]),
        luas_wilayah: property_f64(props, &["luas_wilayah", "luas_wilay"]),
        jumlah_penduduk: property_i64(props, &["jumlah_penduduk", "jumlah_pen"]),
        jumlah_kk: property_i64(props, &["jumlah_kk"]),
        kepadatan: property_f64(props, &["kepadatan", "kepadatan_"]),
        raw: Some(Value::Object(props.clone())),
    };

    Ok(NewBoundary {
        identity,
        zoom_min: tier.zoom_min,
        zoom_max: tier.zoom_max,
        geometry,
        attributes,
        source: "BNPB".to_string(),
        simplification_tolerance: tier.simplification_tolerance,
    })
}

async fn read_collection(path: &Path) -> Result<geojson::FeatureCollection, ImportError> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| ImportError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    serde_json::from_str(&content).map_err(|source| ImportError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Offline ETL loading the LOD tiers into `boundary_polygons`
pub struct BoundaryImportService {
    repository: PgBoundaryRepository,
    resolver: BoundaryService,
    tiers: Vec<ImportTier>,
}

impl BoundaryImportService {
    pub fn new(repository: PgBoundaryRepository, resolver: BoundaryService) -> Self {
        Self {
            repository,
            resolver,
            tiers: ImportTier::defaults(),
        }
    }

    /// Replace every stored boundary with the tiers found in `data_dir`.
    pub async fn run(&self, data_dir: &Path) -> Result<ImportSummary, ImportError> {
        let cleared = self.repository.clear().await?;
        tracing::info!("Cleared {} existing boundary polygons", cleared);

        let mut summary = ImportSummary::default();

        for tier in &self.tiers {
            let path = data_dir.join(tier.file_name);
            if !path.exists() {
                tracing::warn!("Boundary file not found, skipping: {}", path.display());
                summary.missing_files.push(path);
                continue;
            }

            tracing::info!(
                "Importing {} (zoom {}-{}, tolerance {}) from {}",
                tier.level,
                tier.zoom_min,
                tier.zoom_max,
                tier.simplification_tolerance,
                path.display()
            );

            let collection = read_collection(&path).await?;
            let mut imported = 0usize;
            let mut errors = 0usize;

            for (index, feature) in collection.features.iter().enumerate() {
                let result = match boundary_from_feature(tier, feature) {
                    Ok(boundary) => self
                        .repository
                        .insert(&boundary)
                        .await
                        .map_err(ImportError::from),
                    Err(e) => Err(e),
                };

                match result {
                    Ok(_) => imported += 1,
                    Err(e) => {
                        errors += 1;
                        if errors <= LOGGED_ERRORS_PER_TIER {
                            tracing::warn!("Skipping {} feature #{}: {}", tier.level, index, e);
                        }
                    }
                }
            }

            tracing::info!(
                "Imported {} {} boundaries ({} skipped)",
                imported,
                tier.level,
                errors
            );
            summary.imported.insert(tier.level, imported);
            summary.skipped += errors;
        }

        self.verify().await?;
        Ok(summary)
    }

    async fn verify(&self) -> Result<(), ImportError> {
        for stats in self.resolver.level_stats().await? {
            tracing::info!(
                "{}: {} polygons, zoom {}-{}",
                stats.admin_level,
                stats.count,
                stats.zoom_min,
                stats.zoom_max
            );
        }

        for zoom in VERIFICATION_ZOOMS {
            let boundaries = self.resolver.resolve(&BoundaryQuery::at_zoom(zoom)).await?;
            let mut per_level: BTreeMap<AdminLevel, usize> = BTreeMap::new();
            for boundary in &boundaries {
                *per_level.entry(boundary.admin_level()).or_default() += 1;
            }
            tracing::info!("Zoom {} resolves {:?}", zoom, per_level);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn feature(properties: Value, geometry: Value) -> geojson::Feature {
        serde_json::from_value(json!({
            "type": "Feature",
            "properties": properties,
            "geometry": geometry
        }))
        .unwrap()
    }

    fn polygon() -> Value {
        json!({
            "type": "Polygon",
            "coordinates": [[[95.0, 2.0], [96.0, 2.0], [96.0, 3.0], [95.0, 3.0], [95.0, 2.0]]]
        })
    }

    fn tier(level: AdminLevel) -> ImportTier {
        ImportTier::defaults()
            .into_iter()
            .find(|t| t.level == level)
            .unwrap()
    }

    #[test]
    fn test_default_tiers() {
        let tiers = ImportTier::defaults();
        let ranges: Vec<(i32, i32, f64)> = tiers
            .iter()
            .map(|t| (t.zoom_min, t.zoom_max, t.simplification_tolerance))
            .collect();
        assert_eq!(ranges, vec![(4, 7, 0.01), (7, 9, 0.005), (9, 22, 0.0005)]);
    }

    #[test]
    fn test_truncated_property_names() {
        let f = feature(
            json!({
                "kode_prop_": 11,
                "nama_prop": "ACEH",
                "kode_kabupaten": "1101",
                "nama_kab": "SIMEULUE",
                "jumlah_pen": 95000,
                "jumlah_kk": 24000,
                "luas_wilay": 2051.5,
                "kepadatan_": "46.3"
            }),
            polygon(),
        );
        let boundary = boundary_from_feature(&tier(AdminLevel::Kabupaten), &f).unwrap();

        assert_eq!(boundary.identity.provinsi().kode, "11");
        assert_eq!(
            boundary.identity.kabupaten().map(|k| k.nama.as_str()),
            Some("SIMEULUE")
        );
        assert_eq!(boundary.zoom_min, 7);
        assert_eq!(boundary.zoom_max, 9);
        assert_eq!(boundary.attributes.population, Some(95000));
        assert_eq!(boundary.attributes.households, Some(24000));
        assert_eq!(boundary.attributes.area, Some(2051.5));
        assert_eq!(boundary.attributes.kepadatan, Some(46.3));
        assert_eq!(boundary.simplification_tolerance, 0.005);
    }

    #[test]
    fn test_provinsi_tier_ignores_lower_levels() {
        let f = feature(
            json!({
                "kode_provinsi": "12",
                "nama_provinsi": "SUMATERA UTARA",
                "kode_kabupaten": "1275"
            }),
            polygon(),
        );
        let boundary = boundary_from_feature(&tier(AdminLevel::Provinsi), &f).unwrap();
        assert_eq!(boundary.identity.level(), AdminLevel::Provinsi);
    }

    #[test]
    fn test_missing_name_is_rejected() {
        let f = feature(
            json!({ "kode_provinsi": "11", "nama_provinsi": "ACEH", "kode_kabupaten": "1101" }),
            polygon(),
        );
        let err = boundary_from_feature(&tier(AdminLevel::Kabupaten), &f).unwrap_err();
        assert!(matches!(err, ImportError::Identity(_)));
    }

    #[test]
    fn test_point_geometry_is_rejected() {
        let f = feature(
            json!({ "kode_provinsi": "11", "nama_provinsi": "ACEH" }),
            json!({ "type": "Point", "coordinates": [95.0, 2.0] }),
        );
        let err = boundary_from_feature(&tier(AdminLevel::Provinsi), &f).unwrap_err();
        assert!(matches!(err, ImportError::Geometry(_)));
    }
}
