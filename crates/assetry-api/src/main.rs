//! assetry-api server binary.

use std::net::SocketAddr;
use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use assetry_api::{router, AppState, ServerConfig};
use assetry_db::{in_memory_registry, Database, PoolConfig};
use assetry_inference::{
    MediaSourceFetcher, OpenAIVisionBackend, SuggestionConfig, SuggestionOrchestrator,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing with configurable output
    //
    // Environment variables:
    //   LOG_FORMAT  - "json" or "text" (default: "text")
    //   LOG_FILE    - path to log file (optional, enables file logging)
    //   LOG_ANSI    - "true"/"false" override ANSI colors (auto-detected by default)
    //   RUST_LOG    - standard env filter (default: "assetry_api=debug,tower_http=debug")
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let log_file = std::env::var("LOG_FILE").ok();
    let log_ansi = std::env::var("LOG_ANSI")
        .ok()
        .map(|v| v == "true" || v == "1");

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "assetry_api=debug,assetry_core=debug,assetry_db=debug,assetry_inference=debug,tower_http=debug"
            .into()
    });

    let registry = tracing_subscriber::registry().with(env_filter);

    // Optionally create a file appender with daily rotation
    let _file_guard = if let Some(ref path) = log_file {
        let file_dir = std::path::Path::new(path)
            .parent()
            .unwrap_or(std::path::Path::new("."));
        let file_name = std::path::Path::new(path)
            .file_name()
            .and_then(|f| f.to_str())
            .unwrap_or("assetry-api.log");
        let file_appender = tracing_appender::rolling::daily(file_dir, file_name);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        if log_format == "json" {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(non_blocking),
                )
                .init();
        } else {
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(log_ansi.unwrap_or(false)); // no ANSI in files by default
            registry.with(layer).init();
        }
        Some(guard)
    } else {
        // Console-only output
        if log_format == "json" {
            registry
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        } else {
            let mut layer = tracing_subscriber::fmt::layer();
            if let Some(ansi) = log_ansi {
                layer = layer.with_ansi(ansi);
            }
            registry.with(layer).init();
        }
        None
    };

    info!(
        log_format = %log_format,
        log_file = log_file.as_deref().unwrap_or("(stdout)"),
        "Logging initialized"
    );

    let server_config = ServerConfig::from_env();

    // Media type storage: Postgres when DATABASE_URL is set, in-memory otherwise
    let registry = match std::env::var("DATABASE_URL") {
        Ok(url) if !url.trim().is_empty() => {
            let db = Database::connect_with_config(&url, PoolConfig::from_env()).await?;
            db.migrate().await?;
            info!(subsystem = "api", "Connected to database, migrations applied");
            db.registry()
        }
        _ => {
            warn!(
                subsystem = "api",
                "DATABASE_URL not set, media types are kept in memory and lost on restart"
            );
            let (registry, _index) = in_memory_registry();
            registry
        }
    };

    // Suggestion pipeline
    let suggestion_config = SuggestionConfig::from_env();
    let backend = Arc::new(OpenAIVisionBackend::new(
        suggestion_config.inference.clone(),
    )?);
    let orchestrator = SuggestionOrchestrator::new(backend, &suggestion_config.inference);
    if !orchestrator.is_configured() {
        warn!(
            subsystem = "api",
            "INFERENCE_API_KEY not set, suggestion requests will be refused"
        );
    }
    let fetcher = MediaSourceFetcher::new(&suggestion_config.media_source)?;

    let state = AppState {
        registry,
        orchestrator,
        fetcher,
    };
    let app = router(state, &server_config);

    // Start server
    let addr: SocketAddr = format!("{}:{}", server_config.host, server_config.port).parse()?;
    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
