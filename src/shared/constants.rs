/// Default page size for paginated flood data listings
pub const DEFAULT_PAGE_SIZE: i64 = 50;

/// Maximum page size allowed
pub const MAX_PAGE_SIZE: i64 = 500;

/// Default radius for `/nearby` searches, in meters (50 km)
pub const DEFAULT_NEARBY_DISTANCE_M: f64 = 50_000.0;

/// Result cap for `/nearby` searches on regions and flood data
pub const NEARBY_RESULT_LIMIT: i64 = 20;

// =============================================================================
// MAP VIEWPORT
// =============================================================================

/// Zoom range the dashboard map allows
pub const MIN_MAP_ZOOM: f64 = 4.5;
pub const MAX_MAP_ZOOM: f64 = 18.0;
