use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use utoipa::ToSchema;
use uuid::Uuid;

/// Scope a statistics row aggregates over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "statistics_level", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum StatisticsLevel {
    Nasional,
    Regional,
    Provinsi,
    Kabupaten,
    Kecamatan,
}

impl std::fmt::Display for StatisticsLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StatisticsLevel::Nasional => write!(f, "nasional"),
            StatisticsLevel::Regional => write!(f, "regional"),
            StatisticsLevel::Provinsi => write!(f, "provinsi"),
            StatisticsLevel::Kabupaten => write!(f, "kabupaten"),
            StatisticsLevel::Kecamatan => write!(f, "kecamatan"),
        }
    }
}

impl FromStr for StatisticsLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "nasional" => Ok(StatisticsLevel::Nasional),
            "regional" => Ok(StatisticsLevel::Regional),
            "provinsi" => Ok(StatisticsLevel::Provinsi),
            "kabupaten" => Ok(StatisticsLevel::Kabupaten),
            "kecamatan" => Ok(StatisticsLevel::Kecamatan),
            other => Err(format!("Invalid level: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "status_terkini", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum StatusTerkini {
    Darurat,
    Siaga,
    Waspada,
    #[default]
    Normal,
}

/// Damage, casualty and impact counters shared by reads and upserts
#[derive(Debug, Clone, Default, PartialEq, FromRow)]
pub struct StatisticsTotals {
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
}

impl StatisticsTotals {
    pub fn total_rumah_rusak(&self) -> i64 {
        self.total_rumah_rusak_berat + self.total_rumah_rusak_sedang + self.total_rumah_rusak_ringan
    }

    pub fn total_korban(&self) -> i64 {
        self.total_korban_meninggal
            + self.total_korban_hilang
            + self.total_korban_luka_berat
            + self.total_korban_luka_ringan
    }

    pub fn total_infrastruktur_rusak(&self) -> i64 {
        self.total_pendidikan_rusak
            + self.total_fasyankes_rusak
            + self.total_rumah_ibadat_rusak
            + self.total_jembatan_rusak
    }
}

/// Aggregated rollup for one region
#[derive(Debug, Clone, FromRow)]
pub struct Statistics {
    pub id: Uuid,
    pub region: String,
    pub level: StatisticsLevel,
    pub kode_wilayah: String,
    pub nama_wilayah: String,
    #[sqlx(flatten)]
    pub totals: StatisticsTotals,
    pub status_terkini: StatusTerkini,
    pub periode_dari: Option<DateTime<Utc>>,
    pub periode_hingga: Option<DateTime<Utc>>,
    pub tanggal_update: DateTime<Utc>,
    pub last_sync: Option<DateTime<Utc>>,
    pub sumber_data: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Row written by the sync job, keyed on `(level, kode_wilayah)`
#[derive(Debug, Clone, PartialEq)]
pub struct UpsertStatistics {
    pub region: String,
    pub level: StatisticsLevel,
    pub kode_wilayah: String,
    pub nama_wilayah: String,
    pub totals: StatisticsTotals,
    pub status_terkini: StatusTerkini,
    pub periode_dari: DateTime<Utc>,
    pub periode_hingga: DateTime<Utc>,
    pub synced_at: DateTime<Utc>,
    pub sumber_data: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_totals() {
        let totals = StatisticsTotals {
            total_pendidikan_rusak: 1,
            total_fasyankes_rusak: 2,
            total_rumah_ibadat_rusak: 3,
            total_jembatan_rusak: 4,
            total_rumah_rusak_berat: 10,
            total_rumah_rusak_sedang: 20,
            total_rumah_rusak_ringan: 30,
            total_korban_meninggal: 5,
            total_korban_hilang: 6,
            total_korban_luka_berat: 7,
            total_korban_luka_ringan: 8,
            total_pengungsi: 1000,
            ..Default::default()
        };
        assert_eq!(totals.total_infrastruktur_rusak(), 10);
        assert_eq!(totals.total_rumah_rusak(), 60);
        assert_eq!(totals.total_korban(), 26);
    }

    #[test]
    fn test_level_round_trips_through_str() {
        for level in [
            StatisticsLevel::Nasional,
            StatisticsLevel::Regional,
            StatisticsLevel::Provinsi,
            StatisticsLevel::Kabupaten,
            StatisticsLevel::Kecamatan,
        ] {
            assert_eq!(level.to_string().parse::<StatisticsLevel>(), Ok(level));
        }
        assert!("desa".parse::<StatisticsLevel>().is_err());
    }
}
