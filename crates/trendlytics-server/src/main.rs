use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use trendlytics_server::state::AppState;

/// `trendlytics health`: liveness probe for Docker HEALTHCHECK.
///
/// Calls `GET http://localhost:$TRENDLYTICS_PORT/health`.
/// Exits 0 if the server responds with HTTP 200, exits 1 otherwise.
fn run_health_check() -> ! {
    let port = std::env::var("TRENDLYTICS_PORT").unwrap_or_else(|_| "3000".to_string());
    let url = format!("http://localhost:{}/health", port);
    match ureq::get(&url).call() {
        Ok(resp) if resp.status() == 200 => std::process::exit(0),
        _ => std::process::exit(1),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if args.get(1).map(|s| s.as_str()) == Some("health") {
        run_health_check();
    }
    // Structured JSON logging. Level controlled via RUST_LOG env var.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("trendlytics=info".parse()?),
        )
        .json()
        .init();

    let cfg = trendlytics_core::config::Config::from_env().map_err(|e| anyhow::anyhow!(e))?;

    // Ensure data directory exists before opening DuckDB.
    std::fs::create_dir_all(&cfg.data_dir)?;
    let db_path = cfg.db_path();

    // Open DuckDB; this initialises the schema if the file is new.
    let db = trendlytics_duckdb::DuckDbBackend::open(&db_path, &cfg.duckdb_memory_limit)?;

    let state = Arc::new(AppState::new(Arc::new(db), cfg.clone()));

    let addr = format!("0.0.0.0:{}", cfg.port);
    let app = trendlytics_server::app::build_app(Arc::clone(&state));

    info!(port = cfg.port, "Trendlytics listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            tokio::signal::ctrl_c().await.ok();
        })
        .await?;

    info!("Trendlytics shut down");
    Ok(())
}
