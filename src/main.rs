use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::{AppState, router};
use mw_core::{ReportService, RuntimeConfig};

/// Main entry point for the MediWhisper service.
///
/// Resolves configuration once, opens the report store and serves the REST API (with
/// Swagger UI) until the process is stopped.
///
/// # Environment Variables
/// - `MW_REST_ADDR`: REST server address (default: "0.0.0.0:5000")
/// - `REPORT_DATA_DIR`, `MW_STORE`: report storage
/// - `GEMINI_API_KEY`, `GEMINI_MODEL`, `GEMINI_BASE_URL`: oracle connection
/// - `MW_ORACLE_*`, `MW_PIPELINE_DEADLINE_SECS`: pipeline timing, retry and admission
///
/// # Errors
/// Returns an error if:
/// - the logging configuration cannot be initialised,
/// - any configuration value is invalid,
/// - the report store cannot be opened, or
/// - the server address cannot be bound.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("mediwhisper_run=info".parse()?)
                .add_directive("api_rest=info".parse()?)
                .add_directive("mw_core=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr = std::env::var("MW_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:5000".into());

    let cfg = RuntimeConfig::from_env()?;
    let reports = ReportService::from_runtime_config(&cfg)?;

    tracing::info!("++ Starting MediWhisper REST on {}", rest_addr);

    let app = router(AppState { reports });
    let listener = tokio::net::TcpListener::bind(&rest_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
