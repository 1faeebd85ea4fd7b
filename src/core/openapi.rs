use utoipa::{Modify, OpenApi};

use crate::features::boundaries::{
    dtos as boundaries_dtos, handlers as boundaries_handlers, labels as boundaries_labels,
    models as boundaries_models,
};
use crate::features::flood_data::{
    dtos as flood_data_dtos, handlers as flood_data_handlers, models as flood_data_models,
};
use crate::features::regions::{
    dtos as regions_dtos, handlers as regions_handlers, models as regions_models,
};
use crate::features::reports::{
    dtos as reports_dtos, handlers as reports_handlers, models as reports_models,
};
use crate::features::statistics::{
    dtos as statistics_dtos, handlers as statistics_handlers, models as statistics_models,
};
use crate::shared::types::{ApiResponse, GeoPoint, Meta, PointDto, SortOrder};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Boundaries
        boundaries_handlers::list_boundaries,
        boundaries_handlers::get_boundary_stats,
        boundaries_handlers::get_boundary,
        // Regions
        regions_handlers::list_regions,
        regions_handlers::list_provinces,
        regions_handlers::list_kabupaten,
        regions_handlers::list_kecamatan,
        regions_handlers::list_desa,
        regions_handlers::get_regions_geojson,
        regions_handlers::list_nearby_regions,
        regions_handlers::get_region,
        regions_handlers::create_region,
        regions_handlers::update_region,
        regions_handlers::delete_region,
        // Reports
        reports_handlers::list_reports,
        reports_handlers::list_nearby_reports,
        reports_handlers::get_report_summary,
        reports_handlers::get_report,
        reports_handlers::create_report,
        reports_handlers::update_report,
        reports_handlers::delete_report,
        // Flood data
        flood_data_handlers::list_flood_data,
        flood_data_handlers::get_flood_data_by_desa,
        flood_data_handlers::list_flood_data_by_kabupaten,
        flood_data_handlers::list_flood_data_by_provinsi,
        flood_data_handlers::list_active_floods,
        flood_data_handlers::list_nearby_flood_data,
        flood_data_handlers::get_flood_summary,
        flood_data_handlers::create_flood_data,
        flood_data_handlers::update_flood_data,
        flood_data_handlers::update_flood_status,
        flood_data_handlers::delete_flood_data,
        // Statistics
        statistics_handlers::list_statistics,
        statistics_handlers::get_latest_sumatra,
        statistics_handlers::list_sumatra_provinces,
        statistics_handlers::get_top_comparison,
        statistics_handlers::get_statistics,
        statistics_handlers::sync_bnpb,
        statistics_handlers::delete_statistics,
    ),
    components(
        schemas(
            // Shared
            Meta,
            GeoPoint,
            PointDto,
            SortOrder,
            // Boundaries
            boundaries_models::ViewportBounds,
            boundaries_dtos::BoundaryAttributesDto,
            boundaries_dtos::BoundaryPropertiesDto,
            boundaries_dtos::BoundaryFeatureDto,
            boundaries_dtos::CollectionMetadataDto,
            boundaries_dtos::BoundaryFeatureCollectionDto,
            boundaries_dtos::LevelStatsDto,
            boundaries_dtos::BoundaryStatsDto,
            boundaries_labels::LabelFeatureDto,
            boundaries_labels::LabelCollectionDto,
            ApiResponse<boundaries_dtos::BoundaryFeatureCollectionDto>,
            ApiResponse<boundaries_dtos::BoundaryFeatureDto>,
            ApiResponse<boundaries_dtos::BoundaryStatsDto>,
            // Regions
            regions_models::TipeDesa,
            regions_models::ProvinceSummary,
            regions_models::KabupatenSummary,
            regions_models::KecamatanSummary,
            regions_dtos::BnpbPropertiesDto,
            regions_dtos::CreateRegionDto,
            regions_dtos::UpdateRegionDto,
            regions_dtos::RegionResponseDto,
            regions_dtos::RegionFeaturePropertiesDto,
            regions_dtos::RegionFeatureDto,
            regions_dtos::RegionFeatureCollectionDto,
            ApiResponse<Vec<regions_dtos::RegionResponseDto>>,
            ApiResponse<regions_dtos::RegionResponseDto>,
            ApiResponse<Vec<regions_models::ProvinceSummary>>,
            ApiResponse<Vec<regions_models::KabupatenSummary>>,
            ApiResponse<Vec<regions_models::KecamatanSummary>>,
            // Reports
            reports_models::ReportCategory,
            reports_models::ReportSeverity,
            reports_models::BucketCount,
            reports_dtos::CreateReportDto,
            reports_dtos::UpdateReportDto,
            reports_dtos::ReportResponseDto,
            reports_dtos::ReportSummaryDto,
            ApiResponse<Vec<reports_dtos::ReportResponseDto>>,
            ApiResponse<reports_dtos::ReportResponseDto>,
            ApiResponse<reports_dtos::ReportSummaryDto>,
            // Flood data
            flood_data_models::StatusBanjir,
            flood_data_models::SumberData,
            flood_data_models::FloodSummary,
            flood_data_dtos::FloodDataSortField,
            flood_data_dtos::SummaryLevel,
            flood_data_dtos::DamageCountsDto,
            flood_data_dtos::CreateFloodDataDto,
            flood_data_dtos::UpdateFloodDataDto,
            flood_data_dtos::UpdateFloodStatusDto,
            flood_data_dtos::FloodDataResponseDto,
            ApiResponse<Vec<flood_data_dtos::FloodDataResponseDto>>,
            ApiResponse<flood_data_dtos::FloodDataResponseDto>,
            ApiResponse<flood_data_models::FloodSummary>,
            // Statistics
            statistics_models::StatisticsLevel,
            statistics_models::StatusTerkini,
            statistics_dtos::StatisticsSortField,
            statistics_dtos::PeriodeDataDto,
            statistics_dtos::StatisticsResponseDto,
            statistics_dtos::SyncResultDto,
            ApiResponse<Vec<statistics_dtos::StatisticsResponseDto>>,
            ApiResponse<statistics_dtos::StatisticsResponseDto>,
            ApiResponse<statistics_dtos::SyncResultDto>,
        )
    ),
    tags(
        (name = "boundaries", description = "Level-of-detail administrative boundaries for the map"),
        (name = "regions", description = "Village-level administrative regions"),
        (name = "reports", description = "Citizen flood reports"),
        (name = "flood-data", description = "Village-level flood damage records"),
        (name = "statistics", description = "Aggregated damage statistics and BNPB sync"),
    ),
    info(
        title = "Kawal Banjir API",
        version = "0.1.0",
        description = "Sumatra flood monitoring and LOD boundary API",
    )
)]
pub struct ApiDoc;

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_every_feature() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/boundaries",
            "/api/boundaries/{id}",
            "/api/regions/geojson",
            "/api/reports/stats/summary",
            "/api/flood-data/{id}/status",
            "/api/statistics/sync/bnpb",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }

    #[test]
    fn test_info_modifier_overrides_title() {
        let mut doc = ApiDoc::openapi();
        SwaggerInfoModifier {
            title: "Staging".into(),
            version: "9.9.9".into(),
            description: "staging build".into(),
        }
        .modify(&mut doc);
        assert_eq!(doc.info.title, "Staging");
        assert_eq!(doc.info.version, "9.9.9");
    }
}
