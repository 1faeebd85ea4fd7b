use std::sync::Arc;

use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::flood_data::dtos::{
    CreateFloodDataDto, FloodDataListQuery, SummaryLevel, UpdateFloodDataDto,
    UpdateFloodStatusDto,
};
use crate::features::flood_data::models::{FloodData, FloodSummary, StatusBanjir};
use crate::features::regions::RegionService;
use crate::shared::constants::NEARBY_RESULT_LIMIT;
use crate::shared::types::PaginationQuery;

const FLOOD_DATA_COLUMNS: &str = r#"
    id, kode_desa, kode_kecamatan, kode_kabupaten, kode_provinsi, nama_wilayah,
    pendidikan_rusak, fasyankes_rusak, rumah_ibadat_rusak, jembatan_rusak,
    rumah_rusak_berat, rumah_rusak_sedang, rumah_rusak_ringan,
    korban_meninggal, korban_hilang, korban_luka_berat, korban_luka_ringan, pengungsi,
    deskripsi, status_banjir, tinggi_air, lng, lat,
    tanggal_kejadian, tanggal_update, sumber_data, terverifikasi,
    created_at, updated_at
"#;

const FLOOD_DATA_FILTER: &str = r#"
    ($1::text IS NULL OR kode_provinsi = $1)
    AND ($2::text IS NULL OR kode_kabupaten = $2)
    AND ($3::text IS NULL OR kode_kecamatan = $3)
    AND ($4::status_banjir IS NULL OR status_banjir = $4)
    AND ($5::sumber_data IS NULL OR sumber_data = $5)
"#;

/// Service for village-level flood damage records
pub struct FloodDataService {
    pool: PgPool,
    regions: Arc<RegionService>,
}

impl FloodDataService {
    pub fn new(pool: PgPool, regions: Arc<RegionService>) -> Self {
        Self { pool, regions }
    }

    /// One page of flood records plus the total matching count
    pub async fn list(
        &self,
        query: &FloodDataListQuery,
        pagination: &PaginationQuery,
    ) -> Result<(Vec<FloodData>, i64)> {
        let sort = query.sort_by.unwrap_or_default().as_column();
        let order = query.order.unwrap_or_default().as_sql();

        let sql = format!(
            r#"
            SELECT {FLOOD_DATA_COLUMNS}
            FROM flood_data
            WHERE {FLOOD_DATA_FILTER}
            ORDER BY {sort} {order}, id
            LIMIT $6 OFFSET $7
            "#
        );

        let rows = sqlx::query_as::<_, FloodData>(&sql)
            .bind(&query.provinsi)
            .bind(&query.kabupaten)
            .bind(&query.kecamatan)
            .bind(query.status)
            .bind(query.sumber_data)
            .bind(pagination.limit())
            .bind(pagination.offset())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list flood data: {:?}", e);
                AppError::Database(e)
            })?;

        let count_sql = format!("SELECT COUNT(*) FROM flood_data WHERE {FLOOD_DATA_FILTER}");
        let total: i64 = sqlx::query_scalar(&count_sql)
            .bind(&query.provinsi)
            .bind(&query.kabupaten)
            .bind(&query.kecamatan)
            .bind(query.status)
            .bind(query.sumber_data)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to count flood data: {:?}", e);
                AppError::Database(e)
            })?;

        Ok((rows, total))
    }

    /// Most recently updated record of a village
    pub async fn latest_for_desa(&self, kode_desa: &str) -> Result<FloodData> {
        let sql = format!(
            r#"
            SELECT {FLOOD_DATA_COLUMNS}
            FROM flood_data
            WHERE kode_desa = $1
            ORDER BY tanggal_update DESC
            LIMIT 1
            "#
        );

        sqlx::query_as::<_, FloodData>(&sql)
            .bind(kode_desa)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to fetch flood data of {}: {:?}", kode_desa, e);
                AppError::Database(e)
            })?
            .ok_or_else(|| AppError::NotFound("Flood data not found for this desa".to_string()))
    }

    pub async fn list_by_kabupaten(&self, kode_kabupaten: &str) -> Result<Vec<FloodData>> {
        self.list_by_code("kode_kabupaten", kode_kabupaten).await
    }

    pub async fn list_by_provinsi(&self, kode_provinsi: &str) -> Result<Vec<FloodData>> {
        self.list_by_code("kode_provinsi", kode_provinsi).await
    }

    /// `column` is a fixed code column, never user input
    async fn list_by_code(&self, column: &'static str, kode: &str) -> Result<Vec<FloodData>> {
        let sql = format!(
            r#"
            SELECT {FLOOD_DATA_COLUMNS}
            FROM flood_data
            WHERE {column} = $1
            ORDER BY tanggal_update DESC, id
            "#
        );

        sqlx::query_as::<_, FloodData>(&sql)
            .bind(kode)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list flood data by {} {}: {:?}", column, kode, e);
                AppError::Database(e)
            })
    }

    /// Active floods, deepest water first
    pub async fn active(&self, kode_provinsi: Option<&str>) -> Result<Vec<FloodData>> {
        let sql = format!(
            r#"
            SELECT {FLOOD_DATA_COLUMNS}
            FROM flood_data
            WHERE status_banjir = $1
              AND ($2::text IS NULL OR kode_provinsi = $2)
            ORDER BY tinggi_air DESC, tanggal_update DESC, id
            "#
        );

        sqlx::query_as::<_, FloodData>(&sql)
            .bind(StatusBanjir::Aktif)
            .bind(kode_provinsi)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list active floods: {:?}", e);
                AppError::Database(e)
            })
    }

    /// Records within `radius_m` meters of a point, most recent first
    pub async fn nearby(&self, lng: f64, lat: f64, radius_m: f64) -> Result<Vec<FloodData>> {
        let sql = format!(
            r#"
            SELECT {FLOOD_DATA_COLUMNS}
            FROM flood_data
            WHERE ST_DWithin(location, ST_SetSRID(ST_MakePoint($1, $2), 4326)::geography, $3)
            ORDER BY tanggal_update DESC, id
            LIMIT $4
            "#
        );

        sqlx::query_as::<_, FloodData>(&sql)
            .bind(lng)
            .bind(lat)
            .bind(radius_m)
            .bind(NEARBY_RESULT_LIMIT)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to search nearby flood data: {:?}", e);
                AppError::Database(e)
            })
    }

    /// Sums the records of one province, kabupaten or kecamatan.
    /// 404 when the area has no records at all.
    pub async fn summary(&self, level: SummaryLevel, kode: &str) -> Result<FloodSummary> {
        let column = level.as_column();
        let sql = format!(
            r#"
            SELECT
                COALESCE(SUM(pendidikan_rusak), 0)::bigint AS total_pendidikan_rusak,
                COALESCE(SUM(fasyankes_rusak), 0)::bigint AS total_fasyankes_rusak,
                COALESCE(SUM(rumah_ibadat_rusak), 0)::bigint AS total_rumah_ibadat_rusak,
                COALESCE(SUM(jembatan_rusak), 0)::bigint AS total_jembatan_rusak,
                COALESCE(SUM(rumah_rusak_berat), 0)::bigint AS total_rumah_rusak_berat,
                COALESCE(SUM(rumah_rusak_sedang), 0)::bigint AS total_rumah_rusak_sedang,
                COALESCE(SUM(rumah_rusak_ringan), 0)::bigint AS total_rumah_rusak_ringan,
                COALESCE(SUM(korban_meninggal), 0)::bigint AS total_korban_meninggal,
                COALESCE(SUM(korban_hilang), 0)::bigint AS total_korban_hilang,
                COALESCE(SUM(pengungsi), 0)::bigint AS total_pengungsi,
                COUNT(*) AS jumlah_wilayah_terdampak,
                COUNT(*) FILTER (WHERE status_banjir = 'aktif') AS wilayah_aktif
            FROM flood_data
            WHERE {column} = $1
            "#
        );

        let summary = sqlx::query_as::<_, FloodSummary>(&sql)
            .bind(kode)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to summarize flood data of {}: {:?}", kode, e);
                AppError::Database(e)
            })?;

        if summary.jumlah_wilayah_terdampak == 0 {
            return Err(AppError::NotFound(
                "No flood data found for this region".to_string(),
            ));
        }

        Ok(summary)
    }

    /// Insert a record. A missing location falls back to the point of the
    /// region with the same kode desa, if that region has one.
    pub async fn create(&self, dto: CreateFloodDataDto) -> Result<FloodData> {
        let point = match dto.location.as_ref().and_then(|l| l.to_point()) {
            Some(point) => Some(point),
            None => self.regions.find_location(&dto.kode_desa).await?,
        };
        let c = &dto.counts;

        let sql = format!(
            r#"
            INSERT INTO flood_data (
                kode_desa, kode_kecamatan, kode_kabupaten, kode_provinsi, nama_wilayah,
                pendidikan_rusak, fasyankes_rusak, rumah_ibadat_rusak, jembatan_rusak,
                rumah_rusak_berat, rumah_rusak_sedang, rumah_rusak_ringan,
                korban_meninggal, korban_hilang, korban_luka_berat, korban_luka_ringan,
                pengungsi, deskripsi, status_banjir, tinggi_air, lng, lat,
                tanggal_kejadian, sumber_data, terverifikasi
            )
            VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16,
                $17, $18, $19, $20, $21, $22, COALESCE($23, NOW()), $24, $25
            )
            RETURNING {FLOOD_DATA_COLUMNS}
            "#
        );

        let data = sqlx::query_as::<_, FloodData>(&sql)
            .bind(&dto.kode_desa)
            .bind(&dto.kode_kecamatan)
            .bind(&dto.kode_kabupaten)
            .bind(&dto.kode_provinsi)
            .bind(&dto.nama_wilayah)
            .bind(c.pendidikan_rusak.unwrap_or(0))
            .bind(c.fasyankes_rusak.unwrap_or(0))
            .bind(c.rumah_ibadat_rusak.unwrap_or(0))
            .bind(c.jembatan_rusak.unwrap_or(0))
            .bind(c.rumah_rusak_berat.unwrap_or(0))
            .bind(c.rumah_rusak_sedang.unwrap_or(0))
            .bind(c.rumah_rusak_ringan.unwrap_or(0))
            .bind(c.korban_meninggal.unwrap_or(0))
            .bind(c.korban_hilang.unwrap_or(0))
            .bind(c.korban_luka_berat.unwrap_or(0))
            .bind(c.korban_luka_ringan.unwrap_or(0))
            .bind(c.pengungsi.unwrap_or(0))
            .bind(&dto.deskripsi)
            .bind(dto.status_banjir.unwrap_or_default())
            .bind(dto.tinggi_air.unwrap_or(0.0))
            .bind(point.map(|p| p.lng))
            .bind(point.map(|p| p.lat))
            .bind(dto.tanggal_kejadian)
            .bind(dto.sumber_data.unwrap_or_default())
            .bind(dto.terverifikasi.unwrap_or(false))
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to create flood data for {}: {:?}", dto.kode_desa, e);
                AppError::Database(e)
            })?;

        tracing::info!(
            "Created flood data {} for {} ({:?})",
            data.id,
            data.kode_desa,
            data.status_banjir
        );
        Ok(data)
    }

    /// Partial update; always refreshes `tanggal_update`
    pub async fn update(&self, id: Uuid, dto: UpdateFloodDataDto) -> Result<FloodData> {
        let point = dto.point();
        let c = &dto.counts;

        let sql = format!(
            r#"
            UPDATE flood_data SET
                nama_wilayah = COALESCE($2, nama_wilayah),
                pendidikan_rusak = COALESCE($3, pendidikan_rusak),
                fasyankes_rusak = COALESCE($4, fasyankes_rusak),
                rumah_ibadat_rusak = COALESCE($5, rumah_ibadat_rusak),
                jembatan_rusak = COALESCE($6, jembatan_rusak),
                rumah_rusak_berat = COALESCE($7, rumah_rusak_berat),
                rumah_rusak_sedang = COALESCE($8, rumah_rusak_sedang),
                rumah_rusak_ringan = COALESCE($9, rumah_rusak_ringan),
                korban_meninggal = COALESCE($10, korban_meninggal),
                korban_hilang = COALESCE($11, korban_hilang),
                korban_luka_berat = COALESCE($12, korban_luka_berat),
                korban_luka_ringan = COALESCE($13, korban_luka_ringan),
                pengungsi = COALESCE($14, pengungsi),
                deskripsi = COALESCE($15, deskripsi),
                status_banjir = COALESCE($16, status_banjir),
                tinggi_air = COALESCE($17, tinggi_air),
                lng = COALESCE($18, lng),
                lat = COALESCE($19, lat),
                tanggal_kejadian = COALESCE($20, tanggal_kejadian),
                sumber_data = COALESCE($21, sumber_data),
                terverifikasi = COALESCE($22, terverifikasi),
                tanggal_update = NOW(),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {FLOOD_DATA_COLUMNS}
            "#
        );

        sqlx::query_as::<_, FloodData>(&sql)
            .bind(id)
            .bind(&dto.nama_wilayah)
            .bind(c.pendidikan_rusak)
            .bind(c.fasyankes_rusak)
            .bind(c.rumah_ibadat_rusak)
            .bind(c.jembatan_rusak)
            .bind(c.rumah_rusak_berat)
            .bind(c.rumah_rusak_sedang)
            .bind(c.rumah_rusak_ringan)
            .bind(c.korban_meninggal)
            .bind(c.korban_hilang)
            .bind(c.korban_luka_berat)
            .bind(c.korban_luka_ringan)
            .bind(c.pengungsi)
            .bind(&dto.deskripsi)
            .bind(dto.status_banjir)
            .bind(dto.tinggi_air)
            .bind(point.map(|p| p.lng))
            .bind(point.map(|p| p.lat))
            .bind(dto.tanggal_kejadian)
            .bind(dto.sumber_data)
            .bind(dto.terverifikasi)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to update flood data {}: {:?}", id, e);
                AppError::Database(e)
            })?
            .ok_or_else(|| AppError::NotFound("Flood data not found".to_string()))
    }

    pub async fn update_status(
        &self,
        id: Uuid,
        status: StatusBanjir,
        dto: &UpdateFloodStatusDto,
    ) -> Result<FloodData> {
        let sql = format!(
            r#"
            UPDATE flood_data SET
                status_banjir = $2,
                tinggi_air = COALESCE($3, tinggi_air),
                tanggal_update = NOW(),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {FLOOD_DATA_COLUMNS}
            "#
        );

        let data = sqlx::query_as::<_, FloodData>(&sql)
            .bind(id)
            .bind(status)
            .bind(dto.tinggi_air)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to update status of flood data {}: {:?}", id, e);
                AppError::Database(e)
            })?
            .ok_or_else(|| AppError::NotFound("Flood data not found".to_string()))?;

        tracing::info!("Flood data {} is now {:?}", id, status);
        Ok(data)
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM flood_data WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete flood data {}: {:?}", id, e);
                AppError::Database(e)
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Flood data not found".to_string()));
        }

        Ok(())
    }
}
