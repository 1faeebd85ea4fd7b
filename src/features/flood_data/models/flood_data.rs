use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "status_banjir", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum StatusBanjir {
    Aktif,
    Surut,
    #[default]
    Normal,
}

/// Where a flood record came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "sumber_data")]
pub enum SumberData {
    #[sqlx(rename = "BNPB")]
    #[serde(rename = "BNPB")]
    Bnpb,
    #[default]
    Manual,
    Scraping,
    #[sqlx(rename = "API")]
    #[serde(rename = "API")]
    Api,
}

/// Village-level damage and casualty counts
#[derive(Debug, Clone, Default, PartialEq, FromRow)]
pub struct DamageCounts {
    pub pendidikan_rusak: i32,
    pub fasyankes_rusak: i32,
    pub rumah_ibadat_rusak: i32,
    pub jembatan_rusak: i32,
    pub rumah_rusak_berat: i32,
    pub rumah_rusak_sedang: i32,
    pub rumah_rusak_ringan: i32,
    pub korban_meninggal: i32,
    pub korban_hilang: i32,
    pub korban_luka_berat: i32,
    pub korban_luka_ringan: i32,
    pub pengungsi: i32,
}

impl DamageCounts {
    pub fn total_rumah_rusak(&self) -> i64 {
        i64::from(self.rumah_rusak_berat)
            + i64::from(self.rumah_rusak_sedang)
            + i64::from(self.rumah_rusak_ringan)
    }

    /// Dead, missing and injured. Evacuees are not casualties.
    pub fn total_korban(&self) -> i64 {
        i64::from(self.korban_meninggal)
            + i64::from(self.korban_hilang)
            + i64::from(self.korban_luka_berat)
            + i64::from(self.korban_luka_ringan)
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct FloodData {
    pub id: Uuid,
    pub kode_desa: String,
    pub kode_kecamatan: String,
    pub kode_kabupaten: String,
    pub kode_provinsi: String,
    pub nama_wilayah: String,
    #[sqlx(flatten)]
    pub counts: DamageCounts,
    pub deskripsi: Option<String>,
    pub status_banjir: StatusBanjir,
    pub tinggi_air: f64,
    pub lng: Option<f64>,
    pub lat: Option<f64>,
    pub tanggal_kejadian: DateTime<Utc>,
    pub tanggal_update: DateTime<Utc>,
    pub sumber_data: SumberData,
    pub terverifikasi: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Aggregate over the flood records of one province, kabupaten or kecamatan
#[derive(Debug, Clone, Default, PartialEq, FromRow, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FloodSummary {
    pub total_pendidikan_rusak: i64,
    pub total_fasyankes_rusak: i64,
    pub total_rumah_ibadat_rusak: i64,
    pub total_jembatan_rusak: i64,
    pub total_rumah_rusak_berat: i64,
    pub total_rumah_rusak_sedang: i64,
    pub total_rumah_rusak_ringan: i64,
    pub total_korban_meninggal: i64,
    pub total_korban_hilang: i64,
    pub total_pengungsi: i64,
    pub jumlah_wilayah_terdampak: i64,
    pub wilayah_aktif: i64,
}
