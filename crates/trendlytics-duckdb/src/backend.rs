use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use duckdb::Connection;
use tokio::sync::Mutex;
use tracing::info;

use crate::schema::init_sql;

/// Timestamp literal format bound into `CAST(? AS TIMESTAMP)`.
pub(crate) const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// A DuckDB backend for Trendlytics.
///
/// All access goes through one connection wrapped in `Arc<Mutex<_>>`, so the
/// struct is cheap to share across Axum handlers. Every query issued from
/// the request path is a read.
///
/// Memory and thread limits are enforced by [`init_sql`] at open time.
pub struct DuckDbBackend {
    pub(crate) conn: Arc<Mutex<Connection>>,
}

impl DuckDbBackend {
    /// Open (or create) a DuckDB database file at `path`.
    ///
    /// `memory_limit` is a DuckDB size string such as `"1GB"` or `"512MB"`.
    /// Runs the schema init SQL so all tables and indexes exist.
    pub fn open(path: &str, memory_limit: &str) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch(&init_sql(memory_limit))?;
        info!(
            "DuckDB opened at {} with memory_limit={}, threads=2",
            path, memory_limit
        );
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an **in-memory** DuckDB database.
    ///
    /// Intended for tests only. Data is discarded when the struct is dropped.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(&init_sql("1GB"))?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Execute `SELECT 1` as a lightweight liveness check.
    ///
    /// Called by the `/health` endpoint. Returns an error if the connection
    /// is unavailable (file locked, disk full, etc.).
    pub async fn ping(&self) -> Result<()> {
        let conn = self.conn.lock().await;
        conn.execute_batch("SELECT 1")?;
        Ok(())
    }

    /// Insert or replace a product row. Test fixture / local demo helper.
    pub async fn seed_product(&self, id: &str, name: &str) -> Result<()> {
        let conn = self.conn.lock().await;
        conn.execute(
            r#"INSERT INTO products (id, name, created_at)
               VALUES (?1, ?2, CURRENT_TIMESTAMP)
               ON CONFLICT (id) DO UPDATE SET name = EXCLUDED.name"#,
            duckdb::params![id, name],
        )?;
        Ok(())
    }

    /// Insert or replace the snapshot for `date`. Test fixture / local demo
    /// helper.
    pub async fn seed_trend(
        &self,
        date: NaiveDate,
        total_so_far: i64,
        added: i64,
        removed: i64,
    ) -> Result<()> {
        let conn = self.conn.lock().await;
        conn.execute(
            r#"INSERT INTO product_trends (snapshot_date, total_so_far, added, removed)
               VALUES (CAST(?1 AS DATE), ?2, ?3, ?4)
               ON CONFLICT (snapshot_date) DO UPDATE SET
                   total_so_far = EXCLUDED.total_so_far,
                   added = EXCLUDED.added,
                   removed = EXCLUDED.removed"#,
            duckdb::params![
                date.format("%Y-%m-%d").to_string(),
                total_so_far,
                added,
                removed
            ],
        )?;
        Ok(())
    }

    /// Append one visit. Test fixture / local demo helper.
    pub async fn seed_visitor_event(
        &self,
        id: &str,
        visited_at: DateTime<Utc>,
        path: &str,
    ) -> Result<()> {
        let conn = self.conn.lock().await;
        conn.execute(
            r#"INSERT INTO visitor_events (id, visited_at, path)
               VALUES (?1, CAST(?2 AS TIMESTAMP), ?3)"#,
            duckdb::params![id, visited_at.format(TIMESTAMP_FORMAT).to_string(), path],
        )?;
        Ok(())
    }
}
