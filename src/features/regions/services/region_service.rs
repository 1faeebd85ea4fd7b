use sqlx::PgPool;

use crate::core::error::{AppError, Result};
use crate::features::regions::dtos::{
    boundary_geojson, CreateRegionDto, RegionGeoJsonQuery, RegionListQuery, UpdateRegionDto,
};
use crate::features::regions::models::{
    KabupatenSummary, KecamatanSummary, ProvinceSummary, Region, RegionBoundaryRow,
};
use crate::shared::constants::NEARBY_RESULT_LIMIT;
use crate::shared::types::{GeoPoint, PaginationQuery};

const REGION_COLUMNS: &str = r#"
    id, kode_desa, nama_desa, kode_kecamatan, nama_kecamatan,
    kode_kabupaten, nama_kabupaten, kode_provinsi, nama_provinsi, tipe_desa,
    lng, lat, boundary IS NOT NULL AS has_boundary,
    bnpb_objectid, bnpb_population, bnpb_households, bnpb_area, bnpb_raw,
    created_at, updated_at
"#;

const REGION_FILTER: &str = r#"
    ($1::text IS NULL OR kode_provinsi = $1)
    AND ($2::text IS NULL OR kode_kabupaten = $2)
    AND ($3::text IS NULL OR kode_kecamatan = $3)
"#;

const REGION_ORDER: &str = "nama_provinsi, nama_kabupaten, nama_kecamatan, nama_desa";

/// Service for village-level administrative regions
pub struct RegionService {
    pool: PgPool,
}

impl RegionService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// One page of regions plus the total matching count
    pub async fn list(
        &self,
        query: &RegionListQuery,
        pagination: &PaginationQuery,
    ) -> Result<(Vec<Region>, i64)> {
        let search = query
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| format!("%{}%", s));

        let filter = format!(
            r#"{REGION_FILTER}
            AND ($4::text IS NULL
                OR nama_desa ILIKE $4
                OR nama_kecamatan ILIKE $4
                OR nama_kabupaten ILIKE $4)"#
        );

        let sql = format!(
            r#"
            SELECT {REGION_COLUMNS}
            FROM regions
            WHERE {filter}
            ORDER BY {REGION_ORDER}
            LIMIT $5 OFFSET $6
            "#
        );

        let regions = sqlx::query_as::<_, Region>(&sql)
            .bind(&query.provinsi)
            .bind(&query.kabupaten)
            .bind(&query.kecamatan)
            .bind(&search)
            .bind(pagination.limit())
            .bind(pagination.offset())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list regions: {:?}", e);
                AppError::Database(e)
            })?;

        let count_sql = format!("SELECT COUNT(*) FROM regions WHERE {filter}");
        let total: i64 = sqlx::query_scalar(&count_sql)
            .bind(&query.provinsi)
            .bind(&query.kabupaten)
            .bind(&query.kecamatan)
            .bind(&search)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to count regions: {:?}", e);
                AppError::Database(e)
            })?;

        Ok((regions, total))
    }

    pub async fn provinces(&self) -> Result<Vec<ProvinceSummary>> {
        sqlx::query_as::<_, ProvinceSummary>(
            r#"
            SELECT DISTINCT kode_provinsi, nama_provinsi
            FROM regions
            ORDER BY nama_provinsi
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list provinces: {:?}", e);
            AppError::Database(e)
        })
    }

    pub async fn kabupaten(&self, kode_provinsi: &str) -> Result<Vec<KabupatenSummary>> {
        sqlx::query_as::<_, KabupatenSummary>(
            r#"
            SELECT DISTINCT kode_kabupaten, nama_kabupaten
            FROM regions
            WHERE kode_provinsi = $1
            ORDER BY nama_kabupaten
            "#,
        )
        .bind(kode_provinsi)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list kabupaten of {}: {:?}", kode_provinsi, e);
            AppError::Database(e)
        })
    }

    pub async fn kecamatan(&self, kode_kabupaten: &str) -> Result<Vec<KecamatanSummary>> {
        sqlx::query_as::<_, KecamatanSummary>(
            r#"
            SELECT DISTINCT kode_kecamatan, nama_kecamatan
            FROM regions
            WHERE kode_kabupaten = $1
            ORDER BY nama_kecamatan
            "#,
        )
        .bind(kode_kabupaten)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list kecamatan of {}: {:?}", kode_kabupaten, e);
            AppError::Database(e)
        })
    }

    pub async fn desa(&self, kode_kecamatan: &str) -> Result<Vec<Region>> {
        let sql = format!(
            "SELECT {REGION_COLUMNS} FROM regions WHERE kode_kecamatan = $1 ORDER BY nama_desa"
        );

        sqlx::query_as::<_, Region>(&sql)
            .bind(kode_kecamatan)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list desa of {}: {:?}", kode_kecamatan, e);
                AppError::Database(e)
            })
    }

    /// Regions that carry a boundary, with the polygon as GeoJSON text
    pub async fn geojson(&self, query: &RegionGeoJsonQuery) -> Result<Vec<RegionBoundaryRow>> {
        let sql = format!(
            r#"
            SELECT kode_desa, nama_desa, kode_kecamatan, nama_kecamatan,
                   kode_kabupaten, nama_kabupaten, kode_provinsi, nama_provinsi,
                   ST_AsGeoJSON(boundary) AS boundary,
                   bnpb_population, bnpb_households
            FROM regions
            WHERE boundary IS NOT NULL AND {REGION_FILTER}
            ORDER BY {REGION_ORDER}
            LIMIT $4
            "#
        );

        sqlx::query_as::<_, RegionBoundaryRow>(&sql)
            .bind(&query.provinsi)
            .bind(&query.kabupaten)
            .bind(&query.kecamatan)
            .bind(query.limit())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to load region boundaries: {:?}", e);
                AppError::Database(e)
            })
    }

    /// Closest regions within `radius_m` meters, nearest first
    pub async fn nearby(&self, lng: f64, lat: f64, radius_m: f64) -> Result<Vec<Region>> {
        let sql = format!(
            r#"
            SELECT {REGION_COLUMNS}
            FROM regions
            WHERE ST_DWithin(location, ST_SetSRID(ST_MakePoint($1, $2), 4326)::geography, $3)
            ORDER BY location <-> ST_SetSRID(ST_MakePoint($1, $2), 4326)::geography
            LIMIT $4
            "#
        );

        sqlx::query_as::<_, Region>(&sql)
            .bind(lng)
            .bind(lat)
            .bind(radius_m)
            .bind(NEARBY_RESULT_LIMIT)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to search nearby regions: {:?}", e);
                AppError::Database(e)
            })
    }

    pub async fn get_by_kode(&self, kode_desa: &str) -> Result<Region> {
        let sql = format!("SELECT {REGION_COLUMNS} FROM regions WHERE kode_desa = $1");

        sqlx::query_as::<_, Region>(&sql)
            .bind(kode_desa)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to fetch region {}: {:?}", kode_desa, e);
                AppError::Database(e)
            })?
            .ok_or_else(|| AppError::NotFound("Region not found".to_string()))
    }

    /// Stored point of a village, used to backfill flood data coordinates
    pub async fn find_location(&self, kode_desa: &str) -> Result<Option<GeoPoint>> {
        let row: Option<(Option<f64>, Option<f64>)> =
            sqlx::query_as("SELECT lng, lat FROM regions WHERE kode_desa = $1")
                .bind(kode_desa)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to look up location of {}: {:?}", kode_desa, e);
                    AppError::Database(e)
                })?;

        Ok(row.and_then(|(lng, lat)| GeoPoint::from_columns(lng, lat)))
    }

    pub async fn create(&self, dto: CreateRegionDto) -> Result<Region> {
        let boundary = boundary_geojson(dto.boundary.as_ref())?;
        let point = dto.location.as_ref().and_then(|l| l.to_point());
        let bnpb = dto.bnpb_properties.unwrap_or_default();

        let sql = format!(
            r#"
            INSERT INTO regions (
                kode_desa, nama_desa, kode_kecamatan, nama_kecamatan,
                kode_kabupaten, nama_kabupaten, kode_provinsi, nama_provinsi, tipe_desa,
                lng, lat, boundary,
                bnpb_objectid, bnpb_population, bnpb_households, bnpb_area, bnpb_raw
            )
            VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11,
                ST_Multi(ST_SetSRID(ST_GeomFromGeoJSON($12), 4326)),
                $13, $14, $15, $16, $17
            )
            RETURNING {REGION_COLUMNS}
            "#
        );

        let region = sqlx::query_as::<_, Region>(&sql)
            .bind(&dto.kode_desa)
            .bind(&dto.nama_desa)
            .bind(&dto.kode_kecamatan)
            .bind(&dto.nama_kecamatan)
            .bind(&dto.kode_kabupaten)
            .bind(&dto.nama_kabupaten)
            .bind(&dto.kode_provinsi)
            .bind(&dto.nama_provinsi)
            .bind(dto.tipe_desa)
            .bind(point.map(|p| p.lng))
            .bind(point.map(|p| p.lat))
            .bind(boundary)
            .bind(bnpb.objectid)
            .bind(bnpb.population)
            .bind(bnpb.households)
            .bind(bnpb.area)
            .bind(bnpb.raw)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to create region {}: {:?}", dto.kode_desa, e);
                match AppError::from_store(e) {
                    AppError::Conflict(_) => {
                        AppError::Conflict(format!("Region {} already exists", dto.kode_desa))
                    }
                    other => other,
                }
            })?;

        tracing::info!("Created region {} ({})", region.kode_desa, region.nama_desa);
        Ok(region)
    }

    /// Partial update; absent fields keep their stored value
    pub async fn update(&self, kode_desa: &str, dto: UpdateRegionDto) -> Result<Region> {
        let boundary = boundary_geojson(dto.boundary.as_ref())?;
        let point = dto.location.as_ref().and_then(|l| l.to_point());
        let bnpb = dto.bnpb_properties.unwrap_or_default();

        let sql = format!(
            r#"
            UPDATE regions SET
                nama_desa = COALESCE($2, nama_desa),
                kode_kecamatan = COALESCE($3, kode_kecamatan),
                nama_kecamatan = COALESCE($4, nama_kecamatan),
                kode_kabupaten = COALESCE($5, kode_kabupaten),
                nama_kabupaten = COALESCE($6, nama_kabupaten),
                kode_provinsi = COALESCE($7, kode_provinsi),
                nama_provinsi = COALESCE($8, nama_provinsi),
                tipe_desa = COALESCE($9, tipe_desa),
                lng = COALESCE($10, lng),
                lat = COALESCE($11, lat),
                boundary = COALESCE(
                    ST_Multi(ST_SetSRID(ST_GeomFromGeoJSON($12), 4326)),
                    boundary
                ),
                bnpb_objectid = COALESCE($13, bnpb_objectid),
                bnpb_population = COALESCE($14, bnpb_population),
                bnpb_households = COALESCE($15, bnpb_households),
                bnpb_area = COALESCE($16, bnpb_area),
                bnpb_raw = COALESCE($17, bnpb_raw),
                updated_at = NOW()
            WHERE kode_desa = $1
            RETURNING {REGION_COLUMNS}
            "#
        );

        sqlx::query_as::<_, Region>(&sql)
            .bind(kode_desa)
            .bind(dto.nama_desa)
            .bind(dto.kode_kecamatan)
            .bind(dto.nama_kecamatan)
            .bind(dto.kode_kabupaten)
            .bind(dto.nama_kabupaten)
            .bind(dto.kode_provinsi)
            .bind(dto.nama_provinsi)
            .bind(dto.tipe_desa)
            .bind(point.map(|p| p.lng))
            .bind(point.map(|p| p.lat))
            .bind(boundary)
            .bind(bnpb.objectid)
            .bind(bnpb.population)
            .bind(bnpb.households)
            .bind(bnpb.area)
            .bind(bnpb.raw)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to update region {}: {:?}", kode_desa, e);
                AppError::Database(e)
            })?
            .ok_or_else(|| AppError::NotFound("Region not found".to_string()))
    }

    pub async fn delete(&self, kode_desa: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM regions WHERE kode_desa = $1")
            .bind(kode_desa)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete region {}: {:?}", kode_desa, e);
                AppError::Database(e)
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Region not found".to_string()));
        }

        Ok(())
    }
}
