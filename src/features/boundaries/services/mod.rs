mod boundary_repository;
mod boundary_service;
mod import_service;

pub use boundary_repository::{BoundaryRepository, PgBoundaryRepository};
pub use boundary_service::BoundaryService;
pub use import_service::{
    boundary_from_feature, BoundaryImportService, ImportError, ImportSummary, ImportTier,
};
