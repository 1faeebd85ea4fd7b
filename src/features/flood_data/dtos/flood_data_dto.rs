use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::features::flood_data::models::{FloodData, StatusBanjir, SumberData};
use crate::shared::constants::DEFAULT_PAGE_SIZE;
use crate::shared::types::{GeoPoint, PaginationQuery, PointDto, SortOrder};

/// Sortable flood data columns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum FloodDataSortField {
    #[default]
    TanggalUpdate,
    TanggalKejadian,
    NamaWilayah,
    TinggiAir,
    RumahRusakBerat,
    KorbanMeninggal,
    Pengungsi,
}

impl FloodDataSortField {
    pub fn as_column(&self) -> &'static str {
        match self {
            FloodDataSortField::TanggalUpdate => "tanggal_update",
            FloodDataSortField::TanggalKejadian => "tanggal_kejadian",
            FloodDataSortField::NamaWilayah => "nama_wilayah",
            FloodDataSortField::TinggiAir => "tinggi_air",
            FloodDataSortField::RumahRusakBerat => "rumah_rusak_berat",
            FloodDataSortField::KorbanMeninggal => "korban_meninggal",
            FloodDataSortField::Pengungsi => "pengungsi",
        }
    }
}

/// Filters for `GET /api/flood-data`
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct FloodDataListQuery {
    #[param(minimum = 1)]
    pub page: Option<i64>,
    /// Page size (default 50)
    #[param(minimum = 1, maximum = 500)]
    pub limit: Option<i64>,
    pub provinsi: Option<String>,
    pub kabupaten: Option<String>,
    pub kecamatan: Option<String>,
    #[param(value_type = Option<String>, example = "aktif")]
    pub status: Option<StatusBanjir>,
    #[param(value_type = Option<String>, example = "BNPB")]
    pub sumber_data: Option<SumberData>,
    /// Sort column (default: tanggalUpdate)
    #[param(value_type = Option<String>, example = "tinggiAir")]
    pub sort_by: Option<FloodDataSortField>,
    #[param(value_type = Option<String>, example = "desc")]
    pub order: Option<SortOrder>,
}

impl FloodDataListQuery {
    pub fn pagination(&self) -> PaginationQuery {
        PaginationQuery::with_limit(self.page, self.limit, DEFAULT_PAGE_SIZE)
    }
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct ActiveFloodQuery {
    /// Restrict to one province code
    pub provinsi: Option<String>,
}

/// Aggregation level for `/api/flood-data/summary/{kode}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SummaryLevel {
    Provinsi,
    #[default]
    Kabupaten,
    Kecamatan,
}

impl SummaryLevel {
    pub fn as_column(&self) -> &'static str {
        match self {
            SummaryLevel::Provinsi => "kode_provinsi",
            SummaryLevel::Kabupaten => "kode_kabupaten",
            SummaryLevel::Kecamatan => "kode_kecamatan",
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct FloodSummaryQuery {
    /// provinsi, kabupaten (default) or kecamatan
    #[param(value_type = Option<String>, example = "kabupaten")]
    pub level: Option<SummaryLevel>,
}

/// Damage and casualty counts as sent by clients, all non-negative
#[derive(Debug, Clone, Default, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DamageCountsDto {
    #[validate(range(min = 0))]
    pub pendidikan_rusak: Option<i32>,
    #[validate(range(min = 0))]
    pub fasyankes_rusak: Option<i32>,
    #[validate(range(min = 0))]
    pub rumah_ibadat_rusak: Option<i32>,
    #[validate(range(min = 0))]
    pub jembatan_rusak: Option<i32>,
    #[validate(range(min = 0))]
    pub rumah_rusak_berat: Option<i32>,
    #[validate(range(min = 0))]
    pub rumah_rusak_sedang: Option<i32>,
    #[validate(range(min = 0))]
    pub rumah_rusak_ringan: Option<i32>,
    #[validate(range(min = 0))]
    pub korban_meninggal: Option<i32>,
    #[validate(range(min = 0))]
    pub korban_hilang: Option<i32>,
    #[validate(range(min = 0))]
    pub korban_luka_berat: Option<i32>,
    #[validate(range(min = 0))]
    pub korban_luka_ringan: Option<i32>,
    #[validate(range(min = 0))]
    pub pengungsi: Option<i32>,
}

#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateFloodDataDto {
    #[validate(length(min = 1, message = "Kode desa is required"))]
    pub kode_desa: String,
    #[validate(length(min = 1, message = "Kode kecamatan is required"))]
    pub kode_kecamatan: String,
    #[validate(length(min = 1, message = "Kode kabupaten is required"))]
    pub kode_kabupaten: String,
    #[validate(length(min = 1, message = "Kode provinsi is required"))]
    pub kode_provinsi: String,
    #[validate(length(min = 1, message = "Nama wilayah is required"))]
    pub nama_wilayah: String,
    #[serde(flatten)]
    #[validate(nested)]
    pub counts: DamageCountsDto,
    pub deskripsi: Option<String>,
    pub status_banjir: Option<StatusBanjir>,
    #[validate(range(min = 0.0, message = "Tinggi air must not be negative"))]
    pub tinggi_air: Option<f64>,
    /// Taken from the region with the same kode desa when absent
    #[validate(nested)]
    pub location: Option<PointDto>,
    pub tanggal_kejadian: Option<DateTime<Utc>>,
    pub sumber_data: Option<SumberData>,
    pub terverifikasi: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFloodDataDto {
    #[validate(length(min = 1))]
    pub nama_wilayah: Option<String>,
    #[serde(flatten)]
    #[validate(nested)]
    pub counts: DamageCountsDto,
    pub deskripsi: Option<String>,
    pub status_banjir: Option<StatusBanjir>,
    #[validate(range(min = 0.0, message = "Tinggi air must not be negative"))]
    pub tinggi_air: Option<f64>,
    #[validate(nested)]
    pub location: Option<PointDto>,
    pub tanggal_kejadian: Option<DateTime<Utc>>,
    pub sumber_data: Option<SumberData>,
    pub terverifikasi: Option<bool>,
}

impl UpdateFloodDataDto {
    pub fn point(&self) -> Option<GeoPoint> {
        self.location.as_ref().and_then(PointDto::to_point)
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFloodStatusDto {
    pub status_banjir: Option<StatusBanjir>,
    #[validate(range(min = 0.0, message = "Tinggi air must not be negative"))]
    pub tinggi_air: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FloodDataResponseDto {
    pub id: Uuid,
    pub kode_desa: String,
    pub kode_kecamatan: String,
    pub kode_kabupaten: String,
    pub kode_provinsi: String,
    pub nama_wilayah: String,

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
    pub total_rumah_rusak: i64,
    pub total_korban: i64,

    pub deskripsi: Option<String>,
    pub status_banjir: StatusBanjir,
    /// Water depth in centimeters
    pub tinggi_air: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<PointDto>,
    pub tanggal_kejadian: DateTime<Utc>,
    pub tanggal_update: DateTime<Utc>,
    pub sumber_data: SumberData,
    pub terverifikasi: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<FloodData> for FloodDataResponseDto {
    fn from(data: FloodData) -> Self {
        let total_rumah_rusak = data.counts.total_rumah_rusak();
        let total_korban = data.counts.total_korban();
        let c = data.counts;

        Self {
            id: data.id,
            kode_desa: data.kode_desa,
            kode_kecamatan: data.kode_kecamatan,
            kode_kabupaten: data.kode_kabupaten,
            kode_provinsi: data.kode_provinsi,
            nama_wilayah: data.nama_wilayah,
            pendidikan_rusak: c.pendidikan_rusak,
            fasyankes_rusak: c.fasyankes_rusak,
            rumah_ibadat_rusak: c.rumah_ibadat_rusak,
            jembatan_rusak: c.jembatan_rusak,
            rumah_rusak_berat: c.rumah_rusak_berat,
            rumah_rusak_sedang: c.rumah_rusak_sedang,
            rumah_rusak_ringan: c.rumah_rusak_ringan,
            korban_meninggal: c.korban_meninggal,
            korban_hilang: c.korban_hilang,
            korban_luka_berat: c.korban_luka_berat,
            korban_luka_ringan: c.korban_luka_ringan,
            pengungsi: c.pengungsi,
            total_rumah_rusak,
            total_korban,
            deskripsi: data.deskripsi,
            status_banjir: data.status_banjir,
            tinggi_air: data.tinggi_air,
            location: GeoPoint::from_columns(data.lng, data.lat).map(Into::into),
            tanggal_kejadian: data.tanggal_kejadian,
            tanggal_update: data.tanggal_update,
            sumber_data: data.sumber_data,
            terverifikasi: data.terverifikasi,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }
}
