/// DuckDB initialization SQL.
///
/// Executed once at database open time via `Connection::execute_batch`.
/// All statements use `IF NOT EXISTS` so they are safe to re-run on every
/// startup.
///
/// `memory_limit` comes from `Config.duckdb_memory_limit`
/// (env `TRENDLYTICS_DUCKDB_MEMORY`, default `"1GB"`). An explicit limit is
/// always set; the DuckDB default of 80% of system RAM is too much for a
/// server process.
///
/// The trend tables are written by an external ingestion job. This crate
/// only reads them (apart from the test fixture helpers on the backend).
pub fn init_sql(memory_limit: &str) -> String {
    format!(
        r#"SET memory_limit = '{memory_limit}';
SET threads = 2;

-- ===========================================
-- PRODUCTS (source of the current total)
-- ===========================================
CREATE TABLE IF NOT EXISTS products (
    id              VARCHAR PRIMARY KEY,
    name            VARCHAR NOT NULL,
    created_at      TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
);

-- ===========================================
-- PRODUCT TRENDS (one pre-aggregated snapshot per UTC day)
-- ===========================================
CREATE TABLE IF NOT EXISTS product_trends (
    snapshot_date   DATE PRIMARY KEY,
    total_so_far    BIGINT NOT NULL,               -- cumulative product count at end of day
    added           BIGINT NOT NULL DEFAULT 0,
    removed         BIGINT NOT NULL DEFAULT 0
);

-- ===========================================
-- VISITOR EVENTS (append-only log, one row per visit)
-- ===========================================
CREATE TABLE IF NOT EXISTS visitor_events (
    id              VARCHAR PRIMARY KEY,
    visited_at      TIMESTAMP NOT NULL,            -- UTC
    path            VARCHAR NOT NULL,
    referrer        VARCHAR,
    user_agent      VARCHAR
);
CREATE INDEX IF NOT EXISTS idx_visitor_events_visited_at
    ON visitor_events(visited_at);
"#
    )
}
