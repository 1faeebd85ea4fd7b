use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "tipe_desa")]
pub enum TipeDesa {
    #[sqlx(rename = "KELURAHAN")]
    #[serde(rename = "KELURAHAN")]
    Kelurahan,
    #[default]
    #[sqlx(rename = "DESA")]
    #[serde(rename = "DESA")]
    Desa,
    #[sqlx(rename = "DESA ADAT")]
    #[serde(rename = "DESA ADAT")]
    DesaAdat,
}

/// Village (desa/kelurahan) with its administrative chain
#[derive(Debug, Clone, FromRow)]
pub struct Region {
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
    pub lng: Option<f64>,
    pub lat: Option<f64>,
    pub has_boundary: bool,
    pub bnpb_objectid: Option<i64>,
    pub bnpb_population: Option<i64>,
    pub bnpb_households: Option<i64>,
    pub bnpb_area: Option<f64>,
    pub bnpb_raw: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Region with its boundary selected as GeoJSON text
#[derive(Debug, Clone, FromRow)]
pub struct RegionBoundaryRow {
    pub kode_desa: String,
    pub nama_desa: String,
    pub kode_kecamatan: String,
    pub nama_kecamatan: String,
    pub kode_kabupaten: String,
    pub nama_kabupaten: String,
    pub kode_provinsi: String,
    pub nama_provinsi: String,
    pub boundary: String,
    pub bnpb_population: Option<i64>,
    pub bnpb_households: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProvinceSummary {
    pub kode_provinsi: String,
    pub nama_provinsi: String,
}

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct KabupatenSummary {
    pub kode_kabupaten: String,
    pub nama_kabupaten: String,
}

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct KecamatanSummary {
    pub kode_kecamatan: String,
    pub nama_kecamatan: String,
}
