mod boundary;
mod query;

pub use boundary::{
    AdminIdentity, AdminLevel, BoundaryAttributes, BoundaryGeometry, BoundaryPolygon, BoundaryRow,
    IdentityColumns, IdentityError, LevelStats, NewBoundary, RegionRef,
};
pub use query::{parse_zoom, BoundaryQuery, ViewportBounds};
