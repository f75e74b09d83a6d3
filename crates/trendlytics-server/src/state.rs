use std::sync::Arc;

use trendlytics_core::{analytics::TrendStore, config::Config};

/// Shared application state injected into every Axum handler via
/// [`axum::extract::State`].
pub struct AppState {
    /// Read-only access to the trend tables. The binary passes the DuckDB
    /// backend; tests may pass any other [`TrendStore`].
    pub store: Arc<dyn TrendStore>,

    /// Parsed configuration, loaded once at startup from environment variables.
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(store: Arc<dyn TrendStore>, config: Config) -> Self {
        Self {
            store,
            config: Arc::new(config),
        }
    }
}
