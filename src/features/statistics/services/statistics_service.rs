use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::statistics::dtos::{ComparisonQuery, StatisticsListQuery};
use crate::features::statistics::models::{Statistics, StatisticsLevel, UpsertStatistics};

const STATISTICS_COLUMNS: &str = r#"
    id, region, level, kode_wilayah, nama_wilayah,
    total_pendidikan_rusak, total_fasyankes_rusak, total_rumah_ibadat_rusak,
    total_jembatan_rusak, total_rumah_rusak_berat, total_rumah_rusak_sedang,
    total_rumah_rusak_ringan, total_korban_meninggal, total_korban_hilang,
    total_korban_luka_berat, total_korban_luka_ringan, total_pengungsi,
    jumlah_desa_terdampak, jumlah_kecamatan_terdampak, jumlah_kabupaten_terdampak,
    status_terkini, periode_dari, periode_hingga, tanggal_update, last_sync,
    sumber_data, created_at, updated_at
"#;

/// Region code of the Sumatra-wide rollup written by the BNPB sync
pub const SUMATRA_KODE_WILAYAH: &str = "SUMATERA";
pub const SUMATRA_REGION: &str = "sumatera";

pub struct StatisticsService {
    pool: PgPool,
}

impl StatisticsService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, query: &StatisticsListQuery) -> Result<Vec<Statistics>> {
        let sort = query.sort_by.unwrap_or_default();
        let order = query.order.unwrap_or_default();

        let sql = format!(
            r#"
            SELECT {STATISTICS_COLUMNS}
            FROM statistics
            WHERE ($1::statistics_level IS NULL OR level = $1)
              AND ($2::text IS NULL OR region = $2)
              AND ($3::text IS NULL OR kode_wilayah = $3)
            ORDER BY {} {}, id
            "#,
            sort.as_column(),
            order.as_sql()
        );

        sqlx::query_as::<_, Statistics>(&sql)
            .bind(query.level)
            .bind(query.region.as_deref().filter(|s| !s.is_empty()))
            .bind(query.kode_wilayah.as_deref().filter(|s| !s.is_empty()))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list statistics: {:?}", e);
                AppError::Database(e)
            })
    }

    /// Most recent Sumatra-wide regional rollup
    pub async fn latest_sumatra(&self) -> Result<Statistics> {
        let sql = format!(
            r#"
            SELECT {STATISTICS_COLUMNS}
            FROM statistics
            WHERE region = $1 AND level = 'regional'
            ORDER BY tanggal_update DESC
            LIMIT 1
            "#
        );

        sqlx::query_as::<_, Statistics>(&sql)
            .bind(SUMATRA_REGION)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to fetch Sumatra statistics: {:?}", e);
                AppError::Database(e)
            })?
            .ok_or_else(|| AppError::NotFound("Sumatra statistics not found".to_string()))
    }

    pub async fn list_sumatra_provinces(&self) -> Result<Vec<Statistics>> {
        let sql = format!(
            r#"
            SELECT {STATISTICS_COLUMNS}
            FROM statistics
            WHERE region = $1 AND level = 'provinsi'
            ORDER BY tanggal_update DESC
            "#
        );

        sqlx::query_as::<_, Statistics>(&sql)
            .bind(SUMATRA_REGION)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list province statistics: {:?}", e);
                AppError::Database(e)
            })
    }

    /// Most affected regions at a level, highest first
    pub async fn top(&self, query: &ComparisonQuery) -> Result<Vec<Statistics>> {
        let sql = format!(
            r#"
            SELECT {STATISTICS_COLUMNS}
            FROM statistics
            WHERE level = $1
            ORDER BY {} DESC, id
            LIMIT $2
            "#,
            query.sort_by.as_column()
        );

        sqlx::query_as::<_, Statistics>(&sql)
            .bind(query.level)
            .bind(query.limit())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to fetch top statistics for {}: {:?}", query.level, e);
                AppError::Database(e)
            })
    }

    pub async fn find(
        &self,
        level: StatisticsLevel,
        kode_wilayah: &str,
    ) -> Result<Option<Statistics>> {
        let sql = format!(
            r#"
            SELECT {STATISTICS_COLUMNS}
            FROM statistics
            WHERE level = $1 AND kode_wilayah = $2
            ORDER BY tanggal_update DESC
            LIMIT 1
            "#
        );

        sqlx::query_as::<_, Statistics>(&sql)
            .bind(level)
            .bind(kode_wilayah)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!(
                    "Failed to fetch statistics for {} {}: {:?}",
                    level,
                    kode_wilayah,
                    e
                );
                AppError::Database(e)
            })
    }

    pub async fn get(&self, level: StatisticsLevel, kode_wilayah: &str) -> Result<Statistics> {
        self.find(level, kode_wilayah)
            .await?
            .ok_or_else(|| AppError::NotFound("Statistics not found".to_string()))
    }

    /// Insert or replace the row for `(level, kode_wilayah)`
    pub async fn upsert(&self, row: &UpsertStatistics) -> Result<Statistics> {
        let t = &row.totals;
        let sql = format!(
            r#"
            INSERT INTO statistics (
                region, level, kode_wilayah, nama_wilayah,
                total_pendidikan_rusak, total_fasyankes_rusak, total_rumah_ibadat_rusak,
                total_jembatan_rusak, total_rumah_rusak_berat, total_rumah_rusak_sedang,
                total_rumah_rusak_ringan, total_korban_meninggal, total_korban_hilang,
                total_korban_luka_berat, total_korban_luka_ringan, total_pengungsi,
                jumlah_desa_terdampak, jumlah_kecamatan_terdampak, jumlah_kabupaten_terdampak,
                status_terkini, periode_dari, periode_hingga, tanggal_update, last_sync,
                sumber_data
            )
            VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16,
                $17, $18, $19, $20, $21, $22, $23, $23, $24
            )
            ON CONFLICT (level, kode_wilayah) DO UPDATE SET
                region = EXCLUDED.region,
                nama_wilayah = EXCLUDED.nama_wilayah,
                total_pendidikan_rusak = EXCLUDED.total_pendidikan_rusak,
                total_fasyankes_rusak = EXCLUDED.total_fasyankes_rusak,
                total_rumah_ibadat_rusak = EXCLUDED.total_rumah_ibadat_rusak,
                total_jembatan_rusak = EXCLUDED.total_jembatan_rusak,
                total_rumah_rusak_berat = EXCLUDED.total_rumah_rusak_berat,
                total_rumah_rusak_sedang = EXCLUDED.total_rumah_rusak_sedang,
                total_rumah_rusak_ringan = EXCLUDED.total_rumah_rusak_ringan,
                total_korban_meninggal = EXCLUDED.total_korban_meninggal,
                total_korban_hilang = EXCLUDED.total_korban_hilang,
                total_korban_luka_berat = EXCLUDED.total_korban_luka_berat,
                total_korban_luka_ringan = EXCLUDED.total_korban_luka_ringan,
                total_pengungsi = EXCLUDED.total_pengungsi,
                jumlah_desa_terdampak = EXCLUDED.jumlah_desa_terdampak,
                jumlah_kecamatan_terdampak = EXCLUDED.jumlah_kecamatan_terdampak,
                jumlah_kabupaten_terdampak = EXCLUDED.jumlah_kabupaten_terdampak,
                status_terkini = EXCLUDED.status_terkini,
                periode_dari = EXCLUDED.periode_dari,
                periode_hingga = EXCLUDED.periode_hingga,
                tanggal_update = EXCLUDED.tanggal_update,
                last_sync = EXCLUDED.last_sync,
                sumber_data = EXCLUDED.sumber_data,
                updated_at = NOW()
            RETURNING {STATISTICS_COLUMNS}
            "#
        );

        sqlx::query_as::<_, Statistics>(&sql)
            .bind(&row.region)
            .bind(row.level)
            .bind(&row.kode_wilayah)
            .bind(&row.nama_wilayah)
            .bind(t.total_pendidikan_rusak)
            .bind(t.total_fasyankes_rusak)
            .bind(t.total_rumah_ibadat_rusak)
            .bind(t.total_jembatan_rusak)
            .bind(t.total_rumah_rusak_berat)
            .bind(t.total_rumah_rusak_sedang)
            .bind(t.total_rumah_rusak_ringan)
            .bind(t.total_korban_meninggal)
            .bind(t.total_korban_hilang)
            .bind(t.total_korban_luka_berat)
            .bind(t.total_korban_luka_ringan)
            .bind(t.total_pengungsi)
            .bind(t.jumlah_desa_terdampak)
            .bind(t.jumlah_kecamatan_terdampak)
            .bind(t.jumlah_kabupaten_terdampak)
            .bind(row.status_terkini)
            .bind(row.periode_dari)
            .bind(row.periode_hingga)
            .bind(row.synced_at)
            .bind(&row.sumber_data)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!(
                    "Failed to upsert statistics for {} {}: {:?}",
                    row.level,
                    row.kode_wilayah,
                    e
                );
                AppError::Database(e)
            })
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM statistics WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete statistics {}: {:?}", id, e);
                AppError::Database(e)
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Statistics not found".to_string()));
        }

        Ok(())
    }
}
