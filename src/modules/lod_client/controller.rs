use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{sleep, sleep_until, Instant};

use crate::core::config::LodClientConfig;
use crate::features::boundaries::labels::deduplicate_labels;
use crate::features::boundaries::models::ViewportBounds;
use crate::modules::lod_client::fetcher::BoundaryFetcher;
use crate::modules::lod_client::renderer::{BoundaryRenderer, OpacityTarget};
use crate::modules::lod_client::tiers::{settle_zoom, LodTiers, ZoomBucket};

/// Input from the map
#[derive(Debug, Clone, PartialEq)]
pub enum MapEvent {
    /// Raw (fractional) zoom reported by the map
    ZoomChanged(f64),
    ViewportChanged(ViewportBounds),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LodState {
    Idle,
    Transitioning,
    Loaded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LodTiming {
    pub debounce: Duration,
    pub fade_out: Duration,
    pub fade_in: Duration,
}

impl From<&LodClientConfig> for LodTiming {
    fn from(config: &LodClientConfig) -> Self {
        Self {
            debounce: config.debounce,
            fade_out: config.fade_out,
            fade_in: config.fade_in,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TransitionOutcome {
    Applied,
    Failed,
    Stale,
}

/// What happened while a transition was in flight
#[derive(Debug, Default)]
struct TransitionEvents {
    viewport: Option<ViewportBounds>,
    dropped_zooms: usize,
    closed: bool,
}

/// Drives boundary reloads from map zoom events.
///
/// Zoom events are debounced, and a settled zoom only triggers a load when
/// its bucket differs from what is on screen. A load fades the layers out,
/// fetches, swaps boundaries and labels, then fades back in. Zoom events
/// arriving mid-load are dropped. Each load carries a generation number; a
/// viewport change during the load (with viewport bounds enabled) bumps the
/// generation and the result is discarded.
pub struct LodController<F, R> {
    fetcher: F,
    renderer: R,
    tiers: LodTiers,
    timing: LodTiming,
    send_viewport_bounds: bool,
    generation: AtomicU64,
    state: LodState,
    displayed: Option<ZoomBucket>,
    viewport: Option<ViewportBounds>,
    last_zoom: Option<i32>,
}

impl<F: BoundaryFetcher, R: BoundaryRenderer> LodController<F, R> {
    pub fn new(fetcher: F, renderer: R, tiers: LodTiers, config: &LodClientConfig) -> Self {
        Self {
            fetcher,
            renderer,
            tiers,
            timing: LodTiming::from(config),
            send_viewport_bounds: config.send_viewport_bounds,
            generation: AtomicU64::new(0),
            state: LodState::Idle,
            displayed: None,
            viewport: None,
            last_zoom: None,
        }
    }

    pub fn state(&self) -> LodState {
        self.state
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn displayed_bucket(&self) -> Option<&ZoomBucket> {
        self.displayed.as_ref()
    }

    /// Process events until the sender side closes, then hand the
    /// controller back.
    pub async fn run(mut self, mut events: mpsc::Receiver<MapEvent>) -> Self {
        let mut pending: Option<i32> = None;
        let mut deadline: Option<Instant> = None;

        loop {
            let settle_at = deadline;
            let timer = async move {
                match settle_at {
                    Some(at) => sleep_until(at).await,
                    None => std::future::pending::<()>().await,
                }
            };

            tokio::select! {
                event = events.recv() => match event {
                    None => break,
                    Some(MapEvent::ZoomChanged(raw)) => {
                        if let Some(zoom) = settle_zoom(raw) {
                            pending = Some(zoom);
                            deadline = Some(Instant::now() + self.timing.debounce);
                        }
                    }
                    Some(MapEvent::ViewportChanged(bounds)) => {
                        if let Some(zoom) = self.apply_viewport(bounds) {
                            pending.get_or_insert(zoom);
                            deadline = Some(Instant::now() + self.timing.debounce);
                        }
                    }
                },
                _ = timer => {
                    deadline = None;
                    let Some(zoom) = pending.take() else {
                        continue;
                    };

                    let during = self.settle(zoom, &mut events).await;
                    if let Some(bounds) = during.viewport {
                        if let Some(zoom) = self.apply_viewport(bounds) {
                            pending = Some(zoom);
                            deadline = Some(Instant::now() + self.timing.debounce);
                        }
                    }
                    if during.closed {
                        break;
                    }
                }
            }
        }

        tracing::debug!("LOD controller stopped in state {:?}", self.state);
        self
    }

    /// Record the viewport. With viewport bounds enabled the displayed data
    /// is invalidated and the zoom to reload at is returned.
    fn apply_viewport(&mut self, bounds: ViewportBounds) -> Option<i32> {
        self.viewport = Some(bounds);
        if !self.send_viewport_bounds {
            return None;
        }
        self.displayed = None;
        self.last_zoom
    }

    async fn settle(&mut self, zoom: i32, events: &mut mpsc::Receiver<MapEvent>) -> TransitionEvents {
        self.last_zoom = Some(zoom);
        let bucket = self.tiers.bucket(zoom);

        if self.displayed.as_ref() == Some(&bucket) {
            tracing::debug!("Zoom {} stays in bucket {:?}, no reload", zoom, bucket);
            return TransitionEvents::default();
        }

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let bounds = if self.send_viewport_bounds {
            self.viewport
        } else {
            None
        };
        self.state = LodState::Transitioning;
        tracing::debug!("Loading zoom {} (generation {})", zoom, generation);

        let mut during = TransitionEvents::default();
        let outcome = {
            let transition = self.transition(zoom, generation, bounds);
            tokio::pin!(transition);

            loop {
                tokio::select! {
                    outcome = &mut transition => break outcome,
                    event = events.recv(), if !during.closed => match event {
                        Some(MapEvent::ZoomChanged(raw)) => {
                            during.dropped_zooms += 1;
                            tracing::debug!("Transition in flight, dropping zoom {}", raw);
                        }
                        Some(MapEvent::ViewportChanged(bounds)) => {
                            during.viewport = Some(bounds);
                            if self.send_viewport_bounds {
                                self.generation.fetch_add(1, Ordering::SeqCst);
                            }
                        }
                        None => during.closed = true,
                    },
                }
            }
        };

        match outcome {
            TransitionOutcome::Applied => {
                self.displayed = Some(bucket);
                self.state = LodState::Loaded;
            }
            TransitionOutcome::Failed | TransitionOutcome::Stale => {
                self.state = LodState::Idle;
            }
        }

        during
    }

    async fn transition(
        &self,
        zoom: i32,
        generation: u64,
        bounds: Option<ViewportBounds>,
    ) -> TransitionOutcome {
        for target in OpacityTarget::ALL {
            self.renderer.set_opacity(target, 0.0);
        }
        sleep(self.timing.fade_out).await;

        let result = self.fetcher.fetch(zoom, bounds).await;

        if self.generation.load(Ordering::SeqCst) != generation {
            tracing::debug!("Discarding stale boundaries for zoom {}", zoom);
            self.restore_opacity();
            return TransitionOutcome::Stale;
        }

        match result {
            Ok(collection) => {
                let labels = deduplicate_labels(&collection);
                self.renderer.replace_boundaries(&collection);
                self.renderer.replace_labels(&labels);

                sleep(self.timing.fade_in).await;
                self.restore_opacity();

                tracing::info!(
                    "Loaded {} boundaries and {} labels at zoom {}",
                    collection.features.len(),
                    labels.features.len(),
                    zoom
                );
                TransitionOutcome::Applied
            }
            Err(e) => {
                tracing::warn!("Failed to load boundaries at zoom {}: {}", zoom, e);
                self.restore_opacity();
                TransitionOutcome::Failed
            }
        }
    }

    fn restore_opacity(&self) {
        for target in OpacityTarget::ALL {
            self.renderer.set_opacity(target, target.resting_opacity());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::boundaries::dtos::BoundaryFeatureCollectionDto;
    use crate::features::boundaries::encoder::encode_collection;
    use crate::features::boundaries::labels::LabelCollectionDto;
    use crate::features::boundaries::models::{AdminLevel, BoundaryQuery};
    use crate::modules::lod_client::fetcher::ClientError;
    use crate::shared::test_helpers::sumatra_fixture;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct FakeFetcher {
        calls: Arc<Mutex<Vec<(i32, Option<ViewportBounds>)>>>,
        fail: bool,
        delay: Duration,
    }

    impl FakeFetcher {
        fn zooms(&self) -> Vec<i32> {
            self.calls.lock().unwrap().iter().map(|(z, _)| *z).collect()
        }
    }

    #[async_trait]
    impl BoundaryFetcher for FakeFetcher {
        async fn fetch(
            &self,
            zoom: i32,
            bounds: Option<ViewportBounds>,
        ) -> Result<BoundaryFeatureCollectionDto, ClientError> {
            self.calls.lock().unwrap().push((zoom, bounds));
            if !self.delay.is_zero() {
                sleep(self.delay).await;
            }
            if self.fail {
                return Err(ClientError::Api("boom".to_string()));
            }
            let boundaries: Vec<_> = sumatra_fixture()
                .into_iter()
                .filter(|b| BoundaryQuery::at_zoom(zoom).matches(b))
                .collect();
            Ok(encode_collection(zoom, &boundaries, Utc::now()))
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    enum RenderCall {
        Boundaries(usize),
        Labels(usize),
        Opacity(OpacityTarget, f32),
    }

    #[derive(Clone, Default)]
    struct RecordingRenderer {
        calls: Arc<Mutex<Vec<RenderCall>>>,
    }

    impl RecordingRenderer {
        fn calls(&self) -> Vec<RenderCall> {
            self.calls.lock().unwrap().clone()
        }

        fn boundary_updates(&self) -> usize {
            self.calls()
                .iter()
                .filter(|c| matches!(c, RenderCall::Boundaries(_)))
                .count()
        }

        fn opacity_of(&self, target: OpacityTarget) -> Option<f32> {
            self.calls().iter().rev().find_map(|c| match c {
                RenderCall::Opacity(t, o) if *t == target => Some(*o),
                _ => None,
            })
        }
    }

    impl BoundaryRenderer for RecordingRenderer {
        fn replace_boundaries(&self, boundaries: &BoundaryFeatureCollectionDto) {
            self.calls
                .lock()
                .unwrap()
                .push(RenderCall::Boundaries(boundaries.features.len()));
        }

        fn replace_labels(&self, labels: &LabelCollectionDto) {
            self.calls
                .lock()
                .unwrap()
                .push(RenderCall::Labels(labels.features.len()));
        }

        fn set_opacity(&self, target: OpacityTarget, opacity: f32) {
            self.calls
                .lock()
                .unwrap()
                .push(RenderCall::Opacity(target, opacity));
        }
    }

    struct Harness {
        fetcher: FakeFetcher,
        renderer: RecordingRenderer,
        tx: mpsc::Sender<MapEvent>,
        handle: tokio::task::JoinHandle<LodController<FakeFetcher, RecordingRenderer>>,
    }

    impl Harness {
        fn start(fetcher: FakeFetcher, send_viewport_bounds: bool) -> Self {
            let renderer = RecordingRenderer::default();
            let config = LodClientConfig {
                send_viewport_bounds,
                ..Default::default()
            };
            let controller = LodController::new(
                fetcher.clone(),
                renderer.clone(),
                LodTiers::defaults(),
                &config,
            );
            let (tx, rx) = mpsc::channel(16);
            let handle = tokio::spawn(controller.run(rx));
            Self {
                fetcher,
                renderer,
                tx,
                handle,
            }
        }

        async fn zoom(&self, zoom: f64) {
            self.tx.send(MapEvent::ZoomChanged(zoom)).await.unwrap();
        }

        async fn finish(self) -> LodController<FakeFetcher, RecordingRenderer> {
            drop(self.tx);
            self.handle.await.unwrap()
        }
    }

    async fn wait(ms: u64) {
        sleep(Duration::from_millis(ms)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_zoom_round_trip_within_debounce_fetches_once() {
        let harness = Harness::start(FakeFetcher::default(), false);
        harness.zoom(6.0).await;
        wait(100).await;
        harness.zoom(9.0).await;
        wait(100).await;
        harness.zoom(6.0).await;
        wait(2_000).await;

        let fetcher = harness.fetcher.clone();
        let controller = harness.finish().await;
        assert_eq!(fetcher.zooms(), vec![6]);
        assert_eq!(controller.state(), LodState::Loaded);
    }

    #[tokio::test(start_paused = true)]
    async fn test_same_zoom_after_load_does_not_fetch() {
        let harness = Harness::start(FakeFetcher::default(), false);
        harness.zoom(6.0).await;
        wait(2_000).await;
        harness.zoom(6.2).await;
        wait(2_000).await;

        let fetcher = harness.fetcher.clone();
        harness.finish().await;
        assert_eq!(fetcher.zooms(), vec![6]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_same_bucket_does_not_fetch() {
        let harness = Harness::start(FakeFetcher::default(), false);
        harness.zoom(5.0).await;
        wait(2_000).await;
        harness.zoom(6.0).await;
        wait(2_000).await;
        harness.zoom(8.0).await;
        wait(2_000).await;

        let fetcher = harness.fetcher.clone();
        harness.finish().await;
        assert_eq!(fetcher.zooms(), vec![5, 8]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transition_order() {
        let harness = Harness::start(FakeFetcher::default(), false);
        harness.zoom(5.0).await;
        wait(2_000).await;

        let renderer = harness.renderer.clone();
        harness.finish().await;
        let calls = renderer.calls();

        // Fade out every target, swap data, then restore.
        assert!(calls[..4]
            .iter()
            .all(|c| matches!(c, RenderCall::Opacity(_, o) if *o == 0.0)));
        assert_eq!(calls[4], RenderCall::Boundaries(2));
        assert_eq!(calls[5], RenderCall::Labels(2));
        assert_eq!(calls.len(), 10);
        assert_eq!(
            renderer.opacity_of(OpacityTarget::Fill(AdminLevel::Provinsi)),
            Some(0.4)
        );
        assert_eq!(
            renderer.opacity_of(OpacityTarget::Fill(AdminLevel::Kabupaten)),
            Some(0.3)
        );
        assert_eq!(
            renderer.opacity_of(OpacityTarget::Fill(AdminLevel::Kecamatan)),
            Some(0.2)
        );
        assert_eq!(renderer.opacity_of(OpacityTarget::Outline), Some(0.8));
    }

    #[tokio::test(start_paused = true)]
    async fn test_zoom_during_transition_is_dropped() {
        let harness = Harness::start(FakeFetcher::default(), false);
        harness.zoom(6.0).await;
        // Debounce elapsed at 300ms, fade-out runs until 600ms.
        wait(400).await;
        harness.zoom(12.0).await;
        wait(2_000).await;
        assert_eq!(harness.fetcher.zooms(), vec![6]);

        harness.zoom(12.0).await;
        wait(2_000).await;

        let fetcher = harness.fetcher.clone();
        harness.finish().await;
        assert_eq!(fetcher.zooms(), vec![6, 12]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_failure_restores_opacity_without_retry() {
        let fetcher = FakeFetcher {
            fail: true,
            ..Default::default()
        };
        let harness = Harness::start(fetcher, false);
        harness.zoom(8.0).await;
        wait(5_000).await;

        let fetcher = harness.fetcher.clone();
        let renderer = harness.renderer.clone();
        let controller = harness.finish().await;

        assert_eq!(fetcher.zooms(), vec![8]);
        assert_eq!(controller.state(), LodState::Idle);
        assert!(controller.displayed_bucket().is_none());
        assert_eq!(renderer.boundary_updates(), 0);
        assert_eq!(renderer.opacity_of(OpacityTarget::Outline), Some(0.8));
    }

    #[tokio::test(start_paused = true)]
    async fn test_viewport_change_mid_load_discards_result() {
        let fetcher = FakeFetcher {
            delay: Duration::from_millis(500),
            ..Default::default()
        };
        let harness = Harness::start(fetcher, true);
        harness.zoom(8.0).await;
        // Fetch is in flight between 600ms and 1100ms.
        wait(700).await;
        let bounds = ViewportBounds::new(95.0, 2.0, 98.0, 6.0).unwrap();
        harness
            .tx
            .send(MapEvent::ViewportChanged(bounds))
            .await
            .unwrap();
        wait(5_000).await;

        let fetcher = harness.fetcher.clone();
        let renderer = harness.renderer.clone();
        let controller = harness.finish().await;

        let calls = fetcher.calls.lock().unwrap().clone();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0], (8, None));
        assert_eq!(calls[1], (8, Some(bounds)));
        assert_eq!(renderer.boundary_updates(), 1);
        assert_eq!(controller.state(), LodState::Loaded);
    }

    #[tokio::test(start_paused = true)]
    async fn test_viewport_ignored_when_bounds_disabled() {
        let harness = Harness::start(FakeFetcher::default(), false);
        harness.zoom(8.0).await;
        wait(2_000).await;
        let bounds = ViewportBounds::new(95.0, 2.0, 98.0, 6.0).unwrap();
        harness
            .tx
            .send(MapEvent::ViewportChanged(bounds))
            .await
            .unwrap();
        wait(2_000).await;

        let fetcher = harness.fetcher.clone();
        harness.finish().await;
        assert_eq!(fetcher.zooms(), vec![8]);
    }
}
