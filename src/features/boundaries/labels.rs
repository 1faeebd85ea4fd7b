//! One label point per administrative unit.
//!
//! A unit can arrive as several features (split polygons, duplicated
//! source rows). Labels are keyed by level and ancestor names, the first
//! feature seen for a key wins and output keeps first-appearance order.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use utoipa::ToSchema;

use crate::features::boundaries::centroid::label_point;
use crate::features::boundaries::dtos::{
    BoundaryFeatureCollectionDto, BoundaryPropertiesDto, FEATURE_COLLECTION_TYPE, FEATURE_TYPE,
};
use crate::features::boundaries::models::{AdminLevel, BoundaryGeometry};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct LabelFeatureDto {
    #[serde(rename = "type")]
    pub kind: String,
    pub properties: BoundaryPropertiesDto,
    /// GeoJSON Point
    #[schema(value_type = Object)]
    pub geometry: geojson::Geometry,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct LabelCollectionDto {
    #[serde(rename = "type")]
    pub kind: String,
    pub features: Vec<LabelFeatureDto>,
}

impl LabelCollectionDto {
    pub fn empty() -> Self {
        Self {
            kind: FEATURE_COLLECTION_TYPE.to_string(),
            features: Vec::new(),
        }
    }
}

/// Dedup key from level plus ancestor names, `None` when a needed name is absent.
pub fn label_key(properties: &BoundaryPropertiesDto) -> Option<String> {
    let provinsi = properties.nama_provinsi.as_deref()?;
    match properties.admin_level {
        AdminLevel::Provinsi => Some(format!("provinsi|{}", provinsi)),
        AdminLevel::Kabupaten => {
            let kabupaten = properties.nama_kabupaten.as_deref()?;
            Some(format!("kabupaten|{}|{}", provinsi, kabupaten))
        }
        AdminLevel::Kecamatan => {
            let kabupaten = properties.nama_kabupaten.as_deref()?;
            let kecamatan = properties.nama_kecamatan.as_deref()?;
            Some(format!("kecamatan|{}|{}|{}", provinsi, kabupaten, kecamatan))
        }
    }
}

pub fn deduplicate_labels(collection: &BoundaryFeatureCollectionDto) -> LabelCollectionDto {
    let mut seen: HashSet<String> = HashSet::new();
    let mut labels = LabelCollectionDto::empty();

    for feature in &collection.features {
        let Some(key) = label_key(&feature.properties) else {
            continue;
        };
        if seen.contains(&key) {
            continue;
        }

        let anchor = BoundaryGeometry::try_from(feature.geometry.clone())
            .ok()
            .and_then(|geometry| label_point(&geometry));
        let Some(anchor) = anchor else {
            tracing::debug!("No label anchor for {}", key);
            continue;
        };

        seen.insert(key);
        labels.features.push(LabelFeatureDto {
            kind: FEATURE_TYPE.to_string(),
            properties: feature.properties.clone(),
            geometry: geojson::Geometry::new(geojson::Value::from(&anchor)),
        });
    }

    labels
}
