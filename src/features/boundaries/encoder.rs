//! Boundary transfer encoding: stored boundaries to the GeoJSON wire shape.

use chrono::{DateTime, Utc};

use crate::features::boundaries::dtos::{
    BoundaryAttributesDto, BoundaryFeatureCollectionDto, BoundaryFeatureDto,
    BoundaryPropertiesDto, CollectionMetadataDto, FEATURE_COLLECTION_TYPE, FEATURE_TYPE,
};
use crate::features::boundaries::models::BoundaryPolygon;

/// Encode one boundary. Provenance (`source`, simplification tolerance,
/// timestamps) is not part of the wire form.
pub fn encode_feature(boundary: &BoundaryPolygon) -> BoundaryFeatureDto {
    let columns = boundary.identity.to_columns();
    let attributes = &boundary.attributes;
    let level = boundary.admin_level();

    BoundaryFeatureDto {
        kind: FEATURE_TYPE.to_string(),
        id: boundary.id,
        properties: BoundaryPropertiesDto {
            admin_level: level,
            level_name: level.display_name().to_string(),
            kode_provinsi: columns.kode_provinsi,
            nama_provinsi: columns.nama_provinsi,
            kode_kabupaten: columns.kode_kabupaten,
            nama_kabupaten: columns.nama_kabupaten,
            kode_kecamatan: columns.kode_kecamatan,
            nama_kecamatan: columns.nama_kecamatan,
            zoom_min: boundary.zoom_min,
            zoom_max: boundary.zoom_max,
            attributes: BoundaryAttributesDto {
                objectid: attributes.objectid,
                population: attributes.population,
                households: attributes.households,
                area: attributes.area,
                luas_wilayah: attributes.luas_wilayah,
                jumlah_penduduk: attributes.jumlah_penduduk,
                jumlah_kk: attributes.jumlah_kk,
                kepadatan: attributes.kepadatan,
                raw: attributes.raw.clone(),
            },
        },
        geometry: geojson::Geometry::from(&boundary.geometry),
    }
}

/// Encode a resolver result, keeping its order.
pub fn encode_collection(
    zoom: i32,
    boundaries: &[BoundaryPolygon],
    timestamp: DateTime<Utc>,
) -> BoundaryFeatureCollectionDto {
    let features: Vec<BoundaryFeatureDto> = boundaries.iter().map(encode_feature).collect();

    BoundaryFeatureCollectionDto {
        kind: FEATURE_COLLECTION_TYPE.to_string(),
        metadata: CollectionMetadataDto {
            zoom,
            count: features.len(),
            admin_level: boundaries.first().map(|b| b.admin_level()),
            timestamp,
        },
        features,
    }
}
