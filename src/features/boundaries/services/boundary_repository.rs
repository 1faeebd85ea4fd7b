use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::boundaries::models::{
    BoundaryPolygon, BoundaryQuery, BoundaryRow, LevelStats, NewBoundary,
};

/// Read access to the spatial store.
///
/// `find_candidates` may return a superset of the matching boundaries (for
/// example a bounding-box prefilter); the resolver applies the exact
/// selection rule afterwards.
#[async_trait]
pub trait BoundaryRepository: Send + Sync {
    async fn find_candidates(&self, query: &BoundaryQuery) -> Result<Vec<BoundaryPolygon>>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<BoundaryPolygon>>;

    /// Row count and zoom envelope per admin level, ordered by `zoom_min`
    async fn level_stats(&self) -> Result<Vec<LevelStats>>;
}

const BOUNDARY_COLUMNS: &str = r#"
    id, admin_level, zoom_min, zoom_max,
    kode_provinsi, nama_provinsi, kode_kabupaten, nama_kabupaten,
    kode_kecamatan, nama_kecamatan,
    ST_AsGeoJSON(geometry) AS geometry,
    objectid, population, households, area, luas_wilayah,
    jumlah_penduduk, jumlah_kk, kepadatan, raw,
    source, simplification_tolerance, created_at, updated_at
"#;

/// PostGIS-backed boundary store
pub struct PgBoundaryRepository {
    pool: PgPool,
}

impl PgBoundaryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn decode(rows: Vec<BoundaryRow>) -> Result<Vec<BoundaryPolygon>> {
        rows.into_iter()
            .map(|row| {
                BoundaryPolygon::try_from(row).inspect_err(|e| {
                    tracing::error!("Failed to decode boundary row: {}", e);
                })
            })
            .collect()
    }

    /// Remove every boundary. Used by the importer before a fresh load.
    pub async fn clear(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM boundary_polygons")
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to clear boundary polygons: {:?}", e);
                AppError::from_store(e)
            })?;
        Ok(result.rows_affected())
    }

    pub async fn insert(&self, boundary: &NewBoundary) -> Result<Uuid> {
        let id = Uuid::now_v7();
        let columns = boundary.identity.to_columns();
        let geometry = serde_json::to_string(&boundary.geometry)
            .map_err(|e| AppError::Internal(format!("Failed to serialize geometry: {}", e)))?;
        let attributes = &boundary.attributes;

        sqlx::query(
            r#"
            INSERT INTO boundary_polygons (
                id, admin_level, zoom_min, zoom_max,
                kode_provinsi, nama_provinsi, kode_kabupaten, nama_kabupaten,
                kode_kecamatan, nama_kecamatan, geometry,
                objectid, population, households, area, luas_wilayah,
                jumlah_penduduk, jumlah_kk, kepadatan, raw,
                source, simplification_tolerance
            )
            VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10,
                ST_SetSRID(ST_GeomFromGeoJSON($11), 4326),
                $12, $13, $14, $15, $16, $17, $18, $19, $20, $21, $22
            )
            "#,
        )
        .bind(id)
        .bind(boundary.identity.level())
        .bind(boundary.zoom_min)
        .bind(boundary.zoom_max)
        .bind(columns.kode_provinsi)
        .bind(columns.nama_provinsi)
        .bind(columns.kode_kabupaten)
        .bind(columns.nama_kabupaten)
        .bind(columns.kode_kecamatan)
        .bind(columns.nama_kecamatan)
        .bind(geometry)
        .bind(attributes.objectid)
        .bind(attributes.population)
        .bind(attributes.households)
        .bind(attributes.area)
        .bind(attributes.luas_wilayah)
        .bind(attributes.jumlah_penduduk)
        .bind(attributes.jumlah_kk)
        .bind(attributes.kepadatan)
        .bind(&attributes.raw)
        .bind(&boundary.source)
        .bind(boundary.simplification_tolerance)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to insert boundary polygon: {:?}", e);
            AppError::from_store(e)
        })?;

        Ok(id)
    }
}

#[async_trait]
impl BoundaryRepository for PgBoundaryRepository {
    async fn find_candidates(&self, query: &BoundaryQuery) -> Result<Vec<BoundaryPolygon>> {
        let sql = format!(
            r#"
            SELECT {}
            FROM boundary_polygons
            WHERE zoom_min <= $1 AND zoom_max >= $1
              AND ($2::text IS NULL OR kode_provinsi = $2)
              AND ($3::text IS NULL OR kode_kabupaten = $3)
              AND ($4::float8 IS NULL
                   OR geometry && ST_MakeEnvelope($4, $5, $6, $7, 4326))
            ORDER BY created_at ASC, id ASC
            "#,
            BOUNDARY_COLUMNS
        );

        let bounds = query.bounds.as_ref();
        let rows = sqlx::query_as::<_, BoundaryRow>(&sql)
            .bind(query.zoom)
            .bind(query.provinsi.as_deref())
            .bind(query.kabupaten.as_deref())
            .bind(bounds.map(|b| b.west))
            .bind(bounds.map(|b| b.south))
            .bind(bounds.map(|b| b.east))
            .bind(bounds.map(|b| b.north))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to query boundaries at zoom {}: {:?}", query.zoom, e);
                AppError::from_store(e)
            })?;

        Self::decode(rows)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<BoundaryPolygon>> {
        let sql = format!(
            "SELECT {} FROM boundary_polygons WHERE id = $1",
            BOUNDARY_COLUMNS
        );

        let row = sqlx::query_as::<_, BoundaryRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to fetch boundary {}: {:?}", id, e);
                AppError::from_store(e)
            })?;

        row.map(BoundaryPolygon::try_from).transpose()
    }

    async fn level_stats(&self) -> Result<Vec<LevelStats>> {
        sqlx::query_as::<_, LevelStats>(
            r#"
            SELECT admin_level,
                   COUNT(*) AS count,
                   MIN(zoom_min) AS zoom_min,
                   MAX(zoom_max) AS zoom_max
            FROM boundary_polygons
            GROUP BY admin_level
            ORDER BY MIN(zoom_min) ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to aggregate boundary stats: {:?}", e);
            AppError::from_store(e)
        })
    }
}
