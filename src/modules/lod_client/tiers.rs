use crate::features::boundaries::dtos::BoundaryStatsDto;
use crate::features::boundaries::models::AdminLevel;
use crate::shared::constants::{MAX_MAP_ZOOM, MIN_MAP_ZOOM};

/// Zoom range in which one admin level is displayed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LodTier {
    pub level: AdminLevel,
    pub zoom_min: i32,
    pub zoom_max: i32,
}

/// Set of levels visible at one integer zoom. Two zooms with the same
/// bucket render the same data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoomBucket(Vec<AdminLevel>);

impl ZoomBucket {
    pub fn levels(&self) -> &[AdminLevel] {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LodTiers(Vec<LodTier>);

impl LodTiers {
    pub fn new(tiers: Vec<LodTier>) -> Self {
        Self(tiers)
    }

    /// provinsi 4-7, kabupaten 7-9, kecamatan 9-22
    pub fn defaults() -> Self {
        Self(
            AdminLevel::ALL
                .iter()
                .map(|&level| {
                    let (zoom_min, zoom_max) = level.default_zoom_range();
                    LodTier {
                        level,
                        zoom_min,
                        zoom_max,
                    }
                })
                .collect(),
        )
    }

    /// Tiers as reported by `/api/boundaries/stats`; defaults when empty.
    pub fn from_stats(stats: &BoundaryStatsDto) -> Self {
        if stats.by_level.is_empty() {
            return Self::defaults();
        }
        Self(
            stats
                .by_level
                .iter()
                .map(|s| LodTier {
                    level: s.admin_level,
                    zoom_min: s.zoom_min,
                    zoom_max: s.zoom_max,
                })
                .collect(),
        )
    }

    pub fn bucket(&self, zoom: i32) -> ZoomBucket {
        let mut levels: Vec<AdminLevel> = self
            .0
            .iter()
            .filter(|t| t.zoom_min <= zoom && zoom <= t.zoom_max)
            .map(|t| t.level)
            .collect();
        levels.sort();
        levels.dedup();
        ZoomBucket(levels)
    }
}

/// Integer zoom the map settles on: clamped to the allowed range, then
/// rounded half away from zero. Non-finite input is ignored.
pub fn settle_zoom(raw: f64) -> Option<i32> {
    if !raw.is_finite() {
        return None;
    }
    Some(raw.clamp(MIN_MAP_ZOOM, MAX_MAP_ZOOM).round() as i32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::boundaries::dtos::LevelStatsDto;

    #[test]
    fn test_default_buckets() {
        let tiers = LodTiers::defaults();
        assert_eq!(tiers.bucket(5).levels(), &[AdminLevel::Provinsi]);
        assert_eq!(
            tiers.bucket(7).levels(),
            &[AdminLevel::Provinsi, AdminLevel::Kabupaten]
        );
        assert_eq!(tiers.bucket(8).levels(), &[AdminLevel::Kabupaten]);
        assert_eq!(
            tiers.bucket(9).levels(),
            &[AdminLevel::Kabupaten, AdminLevel::Kecamatan]
        );
        assert_eq!(tiers.bucket(15).levels(), &[AdminLevel::Kecamatan]);
        assert!(tiers.bucket(2).levels().is_empty());
        assert_eq!(tiers.bucket(5), tiers.bucket(6));
    }

    #[test]
    fn test_from_stats() {
        let stats = BoundaryStatsDto {
            total: 10,
            by_level: vec![LevelStatsDto {
                admin_level: AdminLevel::Provinsi,
                count: 10,
                zoom_min: 3,
                zoom_max: 8,
            }],
        };
        let tiers = LodTiers::from_stats(&stats);
        assert_eq!(tiers.bucket(8).levels(), &[AdminLevel::Provinsi]);

        let empty = BoundaryStatsDto {
            total: 0,
            by_level: vec![],
        };
        assert_eq!(LodTiers::from_stats(&empty), LodTiers::defaults());
    }

    #[test]
    fn test_settle_zoom() {
        assert_eq!(settle_zoom(6.4), Some(6));
        assert_eq!(settle_zoom(6.5), Some(7));
        assert_eq!(settle_zoom(1.0), Some(5));
        assert_eq!(settle_zoom(25.0), Some(18));
        assert_eq!(settle_zoom(f64::NAN), None);
    }
}
