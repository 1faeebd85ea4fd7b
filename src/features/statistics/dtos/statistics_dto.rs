use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::features::statistics::models::{Statistics, StatisticsLevel, StatusTerkini};
use crate::shared::types::SortOrder;

/// Sortable statistics columns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum StatisticsSortField {
    #[default]
    TanggalUpdate,
    NamaWilayah,
    TotalPendidikanRusak,
    TotalFasyankesRusak,
    TotalRumahIbadatRusak,
    TotalJembatanRusak,
    TotalRumahRusakBerat,
    TotalRumahRusakSedang,
    TotalRumahRusakRingan,
    TotalKorbanMeninggal,
    TotalKorbanHilang,
    TotalPengungsi,
    JumlahDesaTerdampak,
}

impl StatisticsSortField {
    pub fn as_column(&self) -> &'static str {
        match self {
            StatisticsSortField::TanggalUpdate => "tanggal_update",
            StatisticsSortField::NamaWilayah => "nama_wilayah",
            StatisticsSortField::TotalPendidikanRusak => "total_pendidikan_rusak",
            StatisticsSortField::TotalFasyankesRusak => "total_fasyankes_rusak",
            StatisticsSortField::TotalRumahIbadatRusak => "total_rumah_ibadat_rusak",
            StatisticsSortField::TotalJembatanRusak => "total_jembatan_rusak",
            StatisticsSortField::TotalRumahRusakBerat => "total_rumah_rusak_berat",
            StatisticsSortField::TotalRumahRusakSedang => "total_rumah_rusak_sedang",
            StatisticsSortField::TotalRumahRusakRingan => "total_rumah_rusak_ringan",
            StatisticsSortField::TotalKorbanMeninggal => "total_korban_meninggal",
            StatisticsSortField::TotalKorbanHilang => "total_korban_hilang",
            StatisticsSortField::TotalPengungsi => "total_pengungsi",
            StatisticsSortField::JumlahDesaTerdampak => "jumlah_desa_terdampak",
        }
    }
}

/// Filters for `GET /api/statistics`
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct StatisticsListQuery {
    pub level: Option<StatisticsLevel>,
    #[param(example = "sumatera")]
    pub region: Option<String>,
    pub kode_wilayah: Option<String>,
    /// Sort column (default: tanggalUpdate)
    #[param(value_type = Option<String>, example = "totalRumahRusakBerat")]
    pub sort_by: Option<StatisticsSortField>,
    #[param(value_type = Option<String>, example = "desc")]
    pub order: Option<SortOrder>,
}

/// Parameters for `GET /api/statistics/comparison/top`
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonQuery {
    /// Level to rank (default: kabupaten)
    #[serde(default = "default_comparison_level")]
    pub level: StatisticsLevel,
    /// Ranking column, always descending (default: totalRumahRusakBerat)
    #[serde(default = "default_comparison_sort")]
    #[param(value_type = String, example = "totalRumahRusakBerat")]
    pub sort_by: StatisticsSortField,
    #[serde(default = "default_comparison_limit")]
    #[param(minimum = 1, maximum = 100)]
    pub limit: i64,
}

fn default_comparison_level() -> StatisticsLevel {
    StatisticsLevel::Kabupaten
}

fn default_comparison_sort() -> StatisticsSortField {
    StatisticsSortField::TotalRumahRusakBerat
}

fn default_comparison_limit() -> i64 {
    10
}

impl ComparisonQuery {
    pub fn limit(&self) -> i64 {
        self.limit.clamp(1, 100)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PeriodeDataDto {
    pub dari: Option<DateTime<Utc>>,
    pub hingga: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatisticsResponseDto {
    pub id: Uuid,
    pub region: String,
    pub level: StatisticsLevel,
    pub kode_wilayah: String,
    pub nama_wilayah: String,

    pub total_pendidikan_rusak: i64,
    pub total_fasyankes_rusak: i64,
    pub total_rumah_ibadat_rusak: i64,
    pub total_jembatan_rusak: i64,
    pub total_rumah_rusak_berat: i64,
    pub total_rumah_rusak_sedang: i64,
    pub total_rumah_rusak_ringan: i64,
    pub total_korban_meninggal: i64,
    pub total_korban_hilang: i64,
    pub total_korban_luka_berat: i64,
    pub total_korban_luka_ringan: i64,
    pub total_pengungsi: i64,
    pub jumlah_desa_terdampak: i32,
    pub jumlah_kecamatan_terdampak: i32,
    pub jumlah_kabupaten_terdampak: i32,

    pub total_rumah_rusak: i64,
    pub total_korban: i64,
    pub total_infrastruktur_rusak: i64,

    pub status_terkini: StatusTerkini,
    pub periode_data: PeriodeDataDto,
    pub tanggal_update: DateTime<Utc>,
    pub last_sync: Option<DateTime<Utc>>,
    pub sumber_data: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Statistics> for StatisticsResponseDto {
    fn from(s: Statistics) -> Self {
        let t = &s.totals;
        Self {
            total_rumah_rusak: t.total_rumah_rusak(),
            total_korban: t.total_korban(),
            total_infrastruktur_rusak: t.total_infrastruktur_rusak(),
            total_pendidikan_rusak: t.total_pendidikan_rusak,
            total_fasyankes_rusak: t.total_fasyankes_rusak,
            total_rumah_ibadat_rusak: t.total_rumah_ibadat_rusak,
            total_jembatan_rusak: t.total_jembatan_rusak,
            total_rumah_rusak_berat: t.total_rumah_rusak_berat,
            total_rumah_rusak_sedang: t.total_rumah_rusak_sedang,
            total_rumah_rusak_ringan: t.total_rumah_rusak_ringan,
            total_korban_meninggal: t.total_korban_meninggal,
            total_korban_hilang: t.total_korban_hilang,
            total_korban_luka_berat: t.total_korban_luka_berat,
            total_korban_luka_ringan: t.total_korban_luka_ringan,
            total_pengungsi: t.total_pengungsi,
            jumlah_desa_terdampak: t.jumlah_desa_terdampak,
            jumlah_kecamatan_terdampak: t.jumlah_kecamatan_terdampak,
            jumlah_kabupaten_terdampak: t.jumlah_kabupaten_terdampak,
            id: s.id,
            region: s.region,
            level: s.level,
            kode_wilayah: s.kode_wilayah,
            nama_wilayah: s.nama_wilayah,
            status_terkini: s.status_terkini,
            periode_data: PeriodeDataDto {
                dari: s.periode_dari,
                hingga: s.periode_hingga,
            },
            tanggal_update: s.tanggal_update,
            last_sync: s.last_sync,
            sumber_data: s.sumber_data,
            created_at: s.created_at,
            updated_at: s.updated_at,
        }
    }
}

/// Result of a manual BNPB sync
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SyncResultDto {
    /// False when BNPB returned nothing and the row was left untouched
    pub synced: bool,
    pub statistics: Option<StatisticsResponseDto>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::statistics::models::StatisticsTotals;

    #[test]
    fn test_comparison_query_defaults() {
        let query: ComparisonQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(query.level, StatisticsLevel::Kabupaten);
        assert_eq!(query.sort_by, StatisticsSortField::TotalRumahRusakBerat);
        assert_eq!(query.limit(), 10);
    }

    #[test]
    fn test_sort_field_rejects_unknown_columns() {
        let parsed: Result<StatisticsListQuery, _> =
            serde_json::from_str(r#"{"sortBy":"id; DROP TABLE statistics"}"#);
        assert!(parsed.is_err());

        let parsed: StatisticsListQuery =
            serde_json::from_str(r#"{"sortBy":"totalPengungsi","order":"asc"}"#).unwrap();
        assert_eq!(
            parsed.sort_by.map(|f| f.as_column()),
            Some("total_pengungsi")
        );
        assert_eq!(parsed.order, Some(SortOrder::Asc));
    }

    #[test]
    fn test_response_includes_derived_totals() {
        let now = Utc::now();
        let stats = Statistics {
            id: Uuid::new_v4(),
            region: "sumatera".into(),
            level: StatisticsLevel::Regional,
            kode_wilayah: "SUMATERA".into(),
            nama_wilayah: "Sumatera".into(),
            totals: StatisticsTotals {
                total_rumah_rusak_berat: 5,
                total_rumah_rusak_ringan: 7,
                total_jembatan_rusak: 2,
                ..Default::default()
            },
            status_terkini: StatusTerkini::Waspada,
            periode_dari: Some(now),
            periode_hingga: Some(now),
            tanggal_update: now,
            last_sync: Some(now),
            sumber_data: "BNPB".into(),
            created_at: now,
            updated_at: now,
        };

        let json = serde_json::to_value(StatisticsResponseDto::from(stats)).unwrap();
        assert_eq!(json["totalRumahRusak"], 12);
        assert_eq!(json["totalInfrastrukturRusak"], 2);
        assert_eq!(json["totalKorban"], 0);
        assert_eq!(json["statusTerkini"], "waspada");
        assert_eq!(json["kodeWilayah"], "SUMATERA");
        assert!(json["periodeData"]["dari"].is_string());
    }
}
