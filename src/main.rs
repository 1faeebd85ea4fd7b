mod core;
mod features;
mod modules;
mod shared;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::{extract::DefaultBodyLimit, middleware::from_fn, Router};
use clap::{Parser, Subcommand};
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::Modify;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::core::config::{
    load_dotenv, Config, DatabaseConfig, ImportConfig, LodClientConfig, SyncConfig,
};
use crate::core::openapi::{ApiDoc, SwaggerInfoModifier};
use crate::core::{database, middleware};
use crate::features::boundaries::services::BoundaryImportService;
use crate::features::boundaries::{
    routes as boundaries_routes, BoundaryService, PgBoundaryRepository,
};
use crate::features::flood_data::{routes as flood_data_routes, FloodDataService};
use crate::features::regions::{routes as regions_routes, RegionService};
use crate::features::reports::{routes as reports_routes, ReportService};
use crate::features::statistics::{
    routes as statistics_routes, BnpbSyncScheduler, StatisticsService, StatisticsState,
    StatisticsSyncService,
};
use crate::modules::bnpb::BnpbClient;
use crate::modules::lod_client::LodReplay;

#[derive(Parser, Debug)]
#[command(author, version, about = "Sumatra flood dashboard backend")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP API (default)
    Serve,

    /// Replace the stored LOD boundaries with the GeoJSON tiers in a directory
    ImportBoundaries {
        /// Directory holding the per-level GeoJSON files (default: BOUNDARY_DATA_DIR or ./data)
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },

    /// Pull the Sumatra totals from BNPB once and exit
    SyncBnpb,

    /// Drive the headless map client through a zoom sequence against a running API
    LodReplay {
        /// Comma-separated zoom levels
        #[arg(long, value_delimiter = ',', default_values_t = [5.0, 8.0, 10.0, 8.0, 5.0])]
        zooms: Vec<f64>,

        /// Pause between zoom events in milliseconds
        #[arg(long, default_value_t = 1000)]
        interval_ms: u64,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Build Tokio runtime with configurable worker threads
    let worker_threads = std::env::var("TOKIO_WORKER_THREADS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|p| p.get())
                .unwrap_or(4)
        });

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(worker_threads)
        .max_blocking_threads(worker_threads * 4)
        .enable_all()
        .build()?;

    runtime.block_on(async_main(cli, worker_threads))
}

async fn async_main(cli: Cli, worker_threads: usize) -> anyhow::Result<()> {
    // Load .env file BEFORE initializing logger so RUST_LOG is available
    load_dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(worker_threads).await,
        Command::ImportBoundaries { data_dir } => import_boundaries(data_dir).await,
        Command::SyncBnpb => sync_bnpb().await,
        Command::LodReplay { zooms, interval_ms } => {
            lod_replay(zooms, Duration::from_millis(interval_ms)).await
        }
    }
}

async fn connect(config: &DatabaseConfig) -> anyhow::Result<sqlx::PgPool> {
    let pool = database::create_pool(config).await?;
    tracing::info!("Database connection pool created");
    database::run_migrations(&pool).await?;
    Ok(pool)
}

async fn import_boundaries(data_dir: Option<PathBuf>) -> anyhow::Result<()> {
    let database = DatabaseConfig::from_env().map_err(|e| anyhow::anyhow!(e))?;
    let data_dir = match data_dir {
        Some(dir) => dir,
        None => {
            ImportConfig::from_env()
                .map_err(|e| anyhow::anyhow!(e))?
                .data_dir
        }
    };

    let pool = connect(&database).await?;
    let resolver = BoundaryService::new(Arc::new(PgBoundaryRepository::new(pool.clone())));
    let importer = BoundaryImportService::new(PgBoundaryRepository::new(pool), resolver);

    tracing::info!("Importing boundaries from {}", data_dir.display());
    let summary = importer.run(&data_dir).await?;

    for (level, count) in &summary.imported {
        tracing::info!("  {}: {} boundaries", level, count);
    }
    if summary.skipped > 0 {
        tracing::warn!("{} features skipped", summary.skipped);
    }
    if !summary.missing_files.is_empty() {
        tracing::warn!("{} tier files were missing", summary.missing_files.len());
    }

    Ok(())
}

async fn sync_bnpb() -> anyhow::Result<()> {
    let database = DatabaseConfig::from_env().map_err(|e| anyhow::anyhow!(e))?;
    let sync = SyncConfig::from_env().map_err(|e| anyhow::anyhow!(e))?;

    let pool = connect(&database).await?;
    let statistics_service = Arc::new(StatisticsService::new(pool));
    let sync_service = StatisticsSyncService::new(BnpbClient::new(&sync)?, statistics_service);

    match sync_service.sync().await? {
        Some(stats) => tracing::info!(
            "Synced Sumatra statistics (updated {})",
            stats.tanggal_update
        ),
        None => tracing::warn!("No data fetched from BNPB, nothing stored"),
    }

    Ok(())
}

async fn lod_replay(zooms: Vec<f64>, interval: Duration) -> anyhow::Result<()> {
    let config = LodClientConfig::from_env().map_err(|e| anyhow::anyhow!(e))?;
    tracing::info!(
        "Replaying zooms {:?} against {} every {:?}",
        zooms,
        config.api_base_url,
        interval
    );

    LodReplay::new(config, zooms, interval).run().await?;
    Ok(())
}

async fn serve(worker_threads: usize) -> anyhow::Result<()> {
    // Load configuration
    let config = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;

    // Log system info
    let available_cpus = std::thread::available_parallelism()
        .map(|p| p.get())
        .unwrap_or(1);
    tracing::info!(
        "System info: available_cpus={}, tokio_worker_threads={}, pid={}",
        available_cpus,
        worker_threads,
        std::process::id()
    );

    tracing::info!("Configuration loaded successfully");

    let pool = connect(&config.database).await?;

    // Boundaries
    let boundary_service = Arc::new(BoundaryService::new(Arc::new(
        PgBoundaryRepository::new(pool.clone()),
    )));
    tracing::info!("Boundary resolver initialized");

    // Regions, reports, flood data
    let region_service = Arc::new(RegionService::new(pool.clone()));
    let report_service = Arc::new(ReportService::new(pool.clone()));
    let flood_data_service = Arc::new(FloodDataService::new(
        pool.clone(),
        Arc::clone(&region_service),
    ));
    tracing::info!("Region, report and flood data services initialized");

    // Statistics and BNPB sync
    let statistics_service = Arc::new(StatisticsService::new(pool.clone()));
    let sync_service = Arc::new(StatisticsSyncService::new(
        BnpbClient::new(&config.sync)?,
        Arc::clone(&statistics_service),
    ));
    tracing::info!("Statistics services initialized");

    if config.sync.enabled {
        let scheduler = BnpbSyncScheduler::new(
            Arc::clone(&sync_service),
            config.sync.hour_wib,
            config.sync.run_on_startup,
        );
        tokio::spawn(async move {
            scheduler.run().await;
        });
        tracing::info!(
            "BNPB sync scheduler spawned (daily at {:02}:00 WIB)",
            config.sync.hour_wib
        );
    } else {
        tracing::info!("BNPB sync scheduler disabled");
    }

    // Build application router with dynamic swagger config
    let swagger_modifier = SwaggerInfoModifier {
        title: config.swagger.title.clone(),
        version: config.swagger.version.clone(),
        description: config.swagger.description.clone(),
    };

    let mut openapi = ApiDoc::openapi();
    swagger_modifier.modify(&mut openapi);

    // Build swagger router
    let swagger = if let Some(credentials) = config.swagger.credentials() {
        tracing::info!("Swagger UI basic auth enabled");
        Router::new()
            .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
            .layer(from_fn(middleware::basic_auth_middleware(Arc::new(
                credentials,
            ))))
    } else {
        tracing::info!("Swagger UI basic auth disabled (no credentials configured)");
        Router::new().merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
    };

    // Simple health check endpoint
    async fn health_check() -> axum::http::StatusCode {
        axum::http::StatusCode::OK
    }
    let health_route = Router::new().route("/health", axum::routing::get(health_check));

    let api_routes = Router::new()
        .merge(boundaries_routes::routes(boundary_service))
        .merge(regions_routes::routes(region_service))
        .merge(reports_routes::routes(report_service))
        .merge(flood_data_routes::routes(flood_data_service))
        .merge(statistics_routes::routes(StatisticsState {
            statistics_service,
            sync_service,
        }));

    let app = Router::new()
        .merge(swagger)
        .merge(api_routes)
        .merge(health_route)
        .layer(DefaultBodyLimit::max(config.app.max_request_body_size))
        .layer(middleware::cors_layer(
            config.app.cors_allowed_origins.clone(),
        ))
        // Propagate X-Request-Id to response headers
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(middleware::MakeSpanWithRequestId)
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Generate X-Request-Id using UUID v7 (or use client-provided one)
        .layer(SetRequestIdLayer::x_request_id(middleware::MakeRequestUuid));

    // Start server
    let addr = config.app.server_address();
    let socket_addr: std::net::SocketAddr = addr
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid address: {}", e))?;

    // Use socket2 for TCP listener configuration
    let socket = socket2::Socket::new(
        socket2::Domain::for_address(socket_addr),
        socket2::Type::STREAM,
        Some(socket2::Protocol::TCP),
    )?;

    socket.set_reuse_address(true)?;
    #[cfg(unix)]
    socket.set_reuse_port(true)?;
    socket.set_nodelay(true)?;

    socket.set_recv_buffer_size(256 * 1024)?;
    socket.set_send_buffer_size(256 * 1024)?;

    #[cfg(target_os = "linux")]
    {
        let keepalive = socket2::TcpKeepalive::new()
            .with_time(Duration::from_secs(60))
            .with_interval(Duration::from_secs(10))
            .with_retries(3);
        socket.set_tcp_keepalive(&keepalive)?;
    }
    #[cfg(not(target_os = "linux"))]
    {
        let keepalive = socket2::TcpKeepalive::new().with_time(Duration::from_secs(60));
        socket.set_tcp_keepalive(&keepalive)?;
    }

    socket.set_nonblocking(true)?;
    socket.bind(&socket_addr.into())?;
    socket.listen(65535)?;

    let listener = tokio::net::TcpListener::from_std(socket.into())?;
    tracing::info!("Server listening on {}", format!("http://{}", addr));
    tracing::info!(
        "Swagger UI available at {}",
        format!("http://{}/swagger-ui/", addr)
    );

    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults_to_serve() {
        let cli = Cli::try_parse_from(["kawal-banjir-core"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_lod_replay_parses_zoom_list() {
        let cli = Cli::try_parse_from([
            "kawal-banjir-core",
            "lod-replay",
            "--zooms",
            "6,9,6",
            "--interval-ms",
            "250",
        ])
        .unwrap();

        match cli.command {
            Some(Command::LodReplay { zooms, interval_ms }) => {
                assert_eq!(zooms, vec![6.0, 9.0, 6.0]);
                assert_eq!(interval_ms, 250);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_import_boundaries_takes_data_dir() {
        let cli = Cli::try_parse_from([
            "kawal-banjir-core",
            "import-boundaries",
            "--data-dir",
            "/srv/geojson",
        ])
        .unwrap();

        match cli.command {
            Some(Command::ImportBoundaries { data_dir }) => {
                assert_eq!(data_dir, Some(PathBuf::from("/srv/geojson")));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
