use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use crate::core::config::LodClientConfig;
use crate::modules::lod_client::controller::{LodController, MapEvent};
use crate::modules::lod_client::fetcher::HttpBoundaryFetcher;
use crate::modules::lod_client::renderer::{RenderSummary, TracingRenderer};
use crate::modules::lod_client::tiers::LodTiers;

/// Replays a scripted zoom sequence against a running API
pub struct LodReplay {
    config: LodClientConfig,
    zooms: Vec<f64>,
    interval: Duration,
}

impl LodReplay {
    pub fn new(config: LodClientConfig, zooms: Vec<f64>, interval: Duration) -> Self {
        Self {
            config,
            zooms,
            interval,
        }
    }

    pub async fn run(self) -> anyhow::Result<RenderSummary> {
        let fetcher = HttpBoundaryFetcher::new(&self.config)?;

        let tiers = match fetcher.fetch_stats().await {
            Ok(stats) => LodTiers::from_stats(&stats),
            Err(e) => {
                tracing::warn!("Failed to fetch boundary stats, using default tiers: {}", e);
                LodTiers::defaults()
            }
        };

        let renderer = Arc::new(TracingRenderer::default());
        let controller = LodController::new(fetcher, renderer.clone(), tiers, &self.config);
        let (tx, rx) = mpsc::channel(32);
        let handle = tokio::spawn(controller.run(rx));

        tracing::info!(
            "Replaying {} zoom events every {:?}",
            self.zooms.len(),
            self.interval
        );
        for zoom in &self.zooms {
            tracing::debug!("Map zoom -> {}", zoom);
            if tx.send(MapEvent::ZoomChanged(*zoom)).await.is_err() {
                break;
            }
            tokio::time::sleep(self.interval).await;
        }

        // Let the last debounce and transition finish.
        tokio::time::sleep(self.config.debounce + self.config.fade_out + self.config.http_timeout)
            .await;
        drop(tx);

        let controller = handle.await?;
        let summary = renderer.summary();
        tracing::info!(
            "Replay finished in state {:?}: {} boundary updates, last {} boundaries and {} labels",
            controller.state(),
            summary.boundary_updates,
            summary.last_boundary_count,
            summary.last_label_count
        );

        Ok(summary)
    }
}
