use std::sync::Arc;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::boundaries::models::{BoundaryPolygon, BoundaryQuery, LevelStats};
use crate::features::boundaries::services::BoundaryRepository;

/// LOD boundary resolver over a spatial store
pub struct BoundaryService {
    repository: Arc<dyn BoundaryRepository>,
}

impl BoundaryService {
    pub fn new(repository: Arc<dyn BoundaryRepository>) -> Self {
        Self { repository }
    }

    /// Boundaries visible at `query.zoom`, intersecting `query.bounds` when
    /// given and matching every code filter. Store order is preserved.
    pub async fn resolve(&self, query: &BoundaryQuery) -> Result<Vec<BoundaryPolygon>> {
        let candidates = self.repository.find_candidates(query).await?;
        let candidate_count = candidates.len();

        let selected: Vec<BoundaryPolygon> = candidates
            .into_iter()
            .filter(|boundary| query.matches(boundary))
            .collect();

        tracing::debug!(
            "Resolved {} of {} candidate boundaries at zoom {}",
            selected.len(),
            candidate_count,
            query.zoom
        );

        Ok(selected)
    }

    pub async fn get(&self, id: Uuid) -> Result<BoundaryPolygon> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Boundary not found".to_string()))
    }

    pub async fn level_stats(&self) -> Result<Vec<LevelStats>> {
        self.repository.level_stats().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::boundaries::models::{AdminLevel, ViewportBounds};
    use crate::shared::test_helpers::{sumatra_fixture, InMemoryBoundaryRepository};

    fn service() -> (BoundaryService, Arc<InMemoryBoundaryRepository>) {
        let repository = Arc::new(InMemoryBoundaryRepository::new(sumatra_fixture()));
        (BoundaryService::new(repository.clone()), repository)
    }

    #[tokio::test]
    async fn test_zoom_5_returns_only_provinces() {
        let (service, _) = service();
        let result = service.resolve(&BoundaryQuery::at_zoom(5)).await.unwrap();

        assert_eq!(result.len(), 2);
        assert!(result
            .iter()
            .all(|b| b.admin_level() == AdminLevel::Provinsi));
    }

    #[tokio::test]
    async fn test_zoom_8_with_aceh_bounds_returns_aceh_kabupaten() {
        let (service, _) = service();
        let aceh = ViewportBounds::new(95.0, 2.0, 97.9, 6.0).unwrap();
        let result = service
            .resolve(&BoundaryQuery::at_zoom(8).with_bounds(aceh))
            .await
            .unwrap();

        assert_eq!(result.len(), 2);
        for boundary in &result {
            assert_eq!(boundary.admin_level(), AdminLevel::Kabupaten);
            assert_eq!(boundary.identity.provinsi().kode, "11");
        }
    }

    #[tokio::test]
    async fn test_zoom_7_overlap_returns_both_levels() {
        let (service, _) = service();
        let result = service.resolve(&BoundaryQuery::at_zoom(7)).await.unwrap();
        let levels: Vec<AdminLevel> = result.iter().map(|b| b.admin_level()).collect();
        assert!(levels.contains(&AdminLevel::Provinsi));
        assert!(levels.contains(&AdminLevel::Kabupaten));
        assert!(!levels.contains(&AdminLevel::Kecamatan));
    }

    #[tokio::test]
    async fn test_resolve_is_idempotent() {
        let (service, _) = service();
        let query = BoundaryQuery::at_zoom(12);
        let first: Vec<Uuid> = service
            .resolve(&query)
            .await
            .unwrap()
            .iter()
            .map(|b| b.id)
            .collect();
        let second: Vec<Uuid> = service
            .resolve(&query)
            .await
            .unwrap()
            .iter()
            .map(|b| b.id)
            .collect();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_zoom_outside_every_range_is_empty() {
        let (service, _) = service();
        assert!(service
            .resolve(&BoundaryQuery::at_zoom(2))
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_get_unknown_id_is_not_found() {
        let (service, _) = service();
        let err = service.get(Uuid::now_v7()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_store_unavailable_propagates() {
        let (service, repository) = service();
        repository.set_unavailable(true);
        let err = service
            .resolve(&BoundaryQuery::at_zoom(5))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::StoreUnavailable(_)));
    }

    #[tokio::test]
    async fn test_level_stats_ordered_by_zoom() {
        let (service, _) = service();
        let stats = service.level_stats().await.unwrap();
        let levels: Vec<AdminLevel> = stats.iter().map(|s| s.admin_level).collect();
        assert_eq!(
            levels,
            vec![
                AdminLevel::Provinsi,
                AdminLevel::Kabupaten,
                AdminLevel::Kecamatan
            ]
        );
        assert_eq!(stats[1].count, 3);
    }
}
