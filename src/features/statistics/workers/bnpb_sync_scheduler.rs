use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveTime, Utc};

use crate::features::statistics::services::StatisticsSyncService;

/// WIB (Asia/Jakarta) is a fixed UTC+7 with no daylight saving
const WIB_OFFSET_HOURS: u32 = 7;

/// Next instant strictly after `now` at `hour_wib`:00 WIB
pub fn next_run_after(now: DateTime<Utc>, hour_wib: u32) -> DateTime<Utc> {
    let hour_utc = (hour_wib % 24 + 24 - WIB_OFFSET_HOURS) % 24;
    let time = NaiveTime::from_hms_opt(hour_utc, 0, 0).unwrap_or(NaiveTime::MIN);
    let candidate = now.date_naive().and_time(time).and_utc();

    if candidate > now {
        candidate
    } else {
        candidate + Duration::days(1)
    }
}

/// Daily BNPB statistics sync
pub struct BnpbSyncScheduler {
    sync_service: Arc<StatisticsSyncService>,
    hour_wib: u32,
    run_on_startup: bool,
}

impl BnpbSyncScheduler {
    pub fn new(sync_service: Arc<StatisticsSyncService>, hour_wib: u32, run_on_startup: bool) -> Self {
        Self {
            sync_service,
            hour_wib,
            run_on_startup,
        }
    }

    /// Run the scheduler loop forever
    pub async fn run(&self) {
        tracing::info!(
            "Starting BNPB sync scheduler (daily at {:02}:00 WIB)",
            self.hour_wib
        );

        if self.run_on_startup {
            self.run_once().await;
        }

        loop {
            let now = Utc::now();
            let next = next_run_after(now, self.hour_wib);
            tracing::info!("Next BNPB sync at {}", next.to_rfc3339());

            let wait = (next - now).to_std().unwrap_or_default();
            tokio::time::sleep(wait).await;

            self.run_once().await;
        }
    }

    async fn run_once(&self) {
        match self.sync_service.sync().await {
            Ok(Some(stats)) => tracing::info!("Scheduled BNPB sync stored statistics {}", stats.id),
            Ok(None) => tracing::warn!("Scheduled BNPB sync skipped, no data"),
            Err(e) => tracing::error!("Scheduled BNPB sync failed: {:?}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    #[test]
    fn test_next_run_later_today_wib() {
        // 05:00 WIB on Dec 2
        let now = utc(2025, 12, 1, 22, 0);
        assert_eq!(next_run_after(now, 6), utc(2025, 12, 1, 23, 0));
    }

    #[test]
    fn test_next_run_rolls_to_tomorrow() {
        // 07:00 WIB, today's run already passed
        let now = utc(2025, 12, 1, 0, 0);
        assert_eq!(next_run_after(now, 6), utc(2025, 12, 1, 23, 0));

        let now = utc(2025, 12, 1, 23, 30);
        assert_eq!(next_run_after(now, 6), utc(2025, 12, 2, 23, 0));
    }

    #[test]
    fn test_exact_run_time_schedules_next_day() {
        let now = utc(2025, 12, 1, 23, 0);
        assert_eq!(next_run_after(now, 6), utc(2025, 12, 2, 23, 0));
    }

    #[test]
    fn test_hours_before_offset_wrap() {
        // 03:00 WIB is 20:00 UTC the previous day
        let now = utc(2025, 12, 1, 12, 0);
        assert_eq!(next_run_after(now, 3), utc(2025, 12, 1, 20, 0));
    }
}
