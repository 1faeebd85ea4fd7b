use std::sync::{Arc, Mutex};

use crate::features::boundaries::dtos::BoundaryFeatureCollectionDto;
use crate::features::boundaries::labels::LabelCollectionDto;
use crate::features::boundaries::models::AdminLevel;

/// Paint property the controller fades during a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpacityTarget {
    Fill(AdminLevel),
    Outline,
}

impl OpacityTarget {
    pub const ALL: [OpacityTarget; 4] = [
        OpacityTarget::Fill(AdminLevel::Provinsi),
        OpacityTarget::Fill(AdminLevel::Kabupaten),
        OpacityTarget::Fill(AdminLevel::Kecamatan),
        OpacityTarget::Outline,
    ];

    /// Opacity restored after a transition
    pub fn resting_opacity(&self) -> f32 {
        match self {
            OpacityTarget::Fill(AdminLevel::Provinsi) => 0.4,
            OpacityTarget::Fill(AdminLevel::Kabupaten) => 0.3,
            OpacityTarget::Fill(AdminLevel::Kecamatan) => 0.2,
            OpacityTarget::Outline => 0.8,
        }
    }
}

/// Map layers the controller writes to. Only the controller calls these.
pub trait BoundaryRenderer: Send + Sync {
    fn replace_boundaries(&self, boundaries: &BoundaryFeatureCollectionDto);

    fn replace_labels(&self, labels: &LabelCollectionDto);

    fn set_opacity(&self, target: OpacityTarget, opacity: f32);
}

impl<R: BoundaryRenderer + ?Sized> BoundaryRenderer for Arc<R> {
    fn replace_boundaries(&self, boundaries: &BoundaryFeatureCollectionDto) {
        (**self).replace_boundaries(boundaries)
    }

    fn replace_labels(&self, labels: &LabelCollectionDto) {
        (**self).replace_labels(labels)
    }

    fn set_opacity(&self, target: OpacityTarget, opacity: f32) {
        (**self).set_opacity(target, opacity)
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct RenderSummary {
    pub boundary_updates: usize,
    pub label_updates: usize,
    pub last_boundary_count: usize,
    pub last_label_count: usize,
}

/// Headless renderer that logs layer updates
#[derive(Debug, Default)]
pub struct TracingRenderer {
    summary: Mutex<RenderSummary>,
}

impl TracingRenderer {
    pub fn summary(&self) -> RenderSummary {
        self.summary
            .lock()
            .map(|s| s.clone())
            .unwrap_or_default()
    }
}

impl BoundaryRenderer for TracingRenderer {
    fn replace_boundaries(&self, boundaries: &BoundaryFeatureCollectionDto) {
        tracing::info!(
            "Boundary layer: {} features at zoom {} (level {:?})",
            boundaries.metadata.count,
            boundaries.metadata.zoom,
            boundaries.metadata.admin_level
        );
        if let Ok(mut summary) = self.summary.lock() {
            summary.boundary_updates += 1;
            summary.last_boundary_count = boundaries.features.len();
        }
    }

    fn replace_labels(&self, labels: &LabelCollectionDto) {
        tracing::info!("Label layer: {} labels", labels.features.len());
        if let Ok(mut summary) = self.summary.lock() {
            summary.label_updates += 1;
            summary.last_label_count = labels.features.len();
        }
    }

    fn set_opacity(&self, target: OpacityTarget, opacity: f32) {
        tracing::debug!("{:?} opacity -> {}", target, opacity);
    }
}
