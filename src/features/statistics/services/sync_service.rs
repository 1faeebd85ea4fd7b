use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use crate::core::error::Result;
use crate::features::statistics::models::{
    Statistics, StatisticsLevel, StatisticsTotals, StatusTerkini, UpsertStatistics,
};
use crate::features::statistics::services::statistics_service::{
    StatisticsService, SUMATRA_KODE_WILAYAH, SUMATRA_REGION,
};
use crate::modules::bnpb::{count, BnpbClient, HousingDamage, InfrastructureDamage};

/// Days covered by a synced BNPB snapshot
const SYNC_PERIOD_DAYS: i64 = 30;

/// Pulls the Sumatra-wide damage totals from BNPB into the statistics table
pub struct StatisticsSyncService {
    client: BnpbClient,
    statistics: Arc<StatisticsService>,
}

impl StatisticsSyncService {
    pub fn new(client: BnpbClient, statistics: Arc<StatisticsService>) -> Self {
        Self { client, statistics }
    }

    /// Run one sync. Returns the upserted row, or `None` when BNPB returned
    /// nothing for both queries and the stored row was left alone.
    pub async fn sync(&self) -> Result<Option<Statistics>> {
        tracing::info!("Starting BNPB data sync");

        let (infrastructure, housing) = futures::join!(
            self.client.fetch_infrastructure(),
            self.client.fetch_housing()
        );

        let Some(row) = sumatra_statistics(infrastructure, housing, Utc::now()) else {
            tracing::warn!("No data fetched from BNPB, skipping sync");
            return Ok(None);
        };

        let t = &row.totals;
        tracing::info!(
            "BNPB totals: pendidikan {}, fasyankes {}, rumah ibadat {}, jembatan {}, \
             rumah rusak berat {} sedang {} ringan {}",
            t.total_pendidikan_rusak,
            t.total_fasyankes_rusak,
            t.total_rumah_ibadat_rusak,
            t.total_jembatan_rusak,
            t.total_rumah_rusak_berat,
            t.total_rumah_rusak_sedang,
            t.total_rumah_rusak_ringan
        );

        let saved = self.statistics.upsert(&row).await?;
        tracing::info!("BNPB data sync completed (statistics {})", saved.id);

        Ok(Some(saved))
    }

    /// Stored Sumatra rollup, if any
    pub async fn current(&self) -> Result<Option<Statistics>> {
        self.statistics
            .find(StatisticsLevel::Regional, SUMATRA_KODE_WILAYAH)
            .await
    }
}

/// Sumatra rollup from the two BNPB queries. Casualty and affected-area
/// counters are not published by this layer and stay at zero.
pub fn sumatra_statistics(
    infrastructure: Option<InfrastructureDamage>,
    housing: Option<HousingDamage>,
    now: DateTime<Utc>,
) -> Option<UpsertStatistics> {
    if infrastructure.is_none() && housing.is_none() {
        return None;
    }

    let infrastructure = infrastructure.unwrap_or_default();
    let housing = housing.unwrap_or_default();

    Some(UpsertStatistics {
        region: SUMATRA_REGION.to_string(),
        level: StatisticsLevel::Regional,
        kode_wilayah: SUMATRA_KODE_WILAYAH.to_string(),
        nama_wilayah: "Sumatera".to_string(),
        totals: StatisticsTotals {
            total_pendidikan_rusak: count(infrastructure.pendidikan_rusak),
            total_fasyankes_rusak: count(infrastructure.fasyankes_rusak),
            total_rumah_ibadat_rusak: count(infrastructure.rumah_ibadat_rusak),
            total_jembatan_rusak: count(infrastructure.jembatan_rusak),
            total_rumah_rusak_berat: count(housing.rumah_rusak_berat),
            total_rumah_rusak_sedang: count(housing.rumah_rusak_sedang),
            total_rumah_rusak_ringan: count(housing.rumah_rusak_ringan),
            ..Default::default()
        },
        status_terkini: StatusTerkini::Waspada,
        periode_dari: now - Duration::days(SYNC_PERIOD_DAYS),
        periode_hingga: now,
        synced_at: now,
        sumber_data: "BNPB".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skips_when_both_queries_empty() {
        assert!(sumatra_statistics(None, None, Utc::now()).is_none());
    }

    #[test]
    fn test_partial_data_still_syncs() {
        let now = Utc::now();
        let housing = HousingDamage {
            rumah_rusak_berat: Some(1520.0),
            rumah_rusak_sedang: Some(310.0),
            rumah_rusak_ringan: None,
        };

        let row = sumatra_statistics(None, Some(housing), now).unwrap();
        assert_eq!(row.level, StatisticsLevel::Regional);
        assert_eq!(row.kode_wilayah, "SUMATERA");
        assert_eq!(row.region, "sumatera");
        assert_eq!(row.status_terkini, StatusTerkini::Waspada);
        assert_eq!(row.sumber_data, "BNPB");
        assert_eq!(row.totals.total_rumah_rusak_berat, 1520);
        assert_eq!(row.totals.total_rumah_rusak_ringan, 0);
        assert_eq!(row.totals.total_pendidikan_rusak, 0);
        assert_eq!(row.totals.total_korban(), 0);
        assert_eq!(row.periode_hingga - row.periode_dari, Duration::days(30));
        assert_eq!(row.synced_at, now);
    }

    #[test]
    fn test_infrastructure_counts_are_rounded() {
        let infrastructure = InfrastructureDamage {
            pendidikan_rusak: Some(41.0),
            fasyankes_rusak: Some(12.0),
            rumah_ibadat_rusak: Some(87.4),
            jembatan_rusak: Some(-1.0),
        };

        let row = sumatra_statistics(Some(infrastructure), None, Utc::now()).unwrap();
        assert_eq!(row.totals.total_infrastruktur_rusak(), 41 + 12 + 87);
    }
}
