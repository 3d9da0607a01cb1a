use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rust_lookup_api::audit::TracingAuditSink;
use rust_lookup_api::config::Config;
use rust_lookup_api::enrichment::WebEnricher;
use rust_lookup_api::handlers::{self, AppState};
use rust_lookup_api::services::LookupService;
use rust_lookup_api::table::ExcelSource;

/// Main entry point for the application.
///
/// Initializes tracing, loads configuration, reads the customer workbook,
/// builds the web enricher and starts the Axum server.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rust_lookup_api=debug,audit=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!("Configuration loaded successfully");

    let source = Arc::new(ExcelSource::new(&config.excel_path, &config.sheet_name));
    let enricher = WebEnricher::new(&config)?;

    // Workbook read is blocking; keep it off the async workers
    let lookup = tokio::task::spawn_blocking(move || {
        LookupService::new(source, enricher, Arc::new(TracingAuditSink))
    })
    .await?;
    tracing::info!("✓ Customer table ready: {} rows", lookup.rows_loaded());

    let app_state = Arc::new(AppState {
        lookup: Arc::new(lookup),
    });

    // Page fetches run after the search request, so allow for both timeouts
    let request_timeout =
        Duration::from_secs(config.search_timeout_secs + config.page_timeout_secs + 5);

    let app = handlers::app(app_state, request_timeout);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
