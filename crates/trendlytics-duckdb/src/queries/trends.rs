use anyhow::{anyhow, Result};
use chrono::NaiveDate;

use trendlytics_core::{bucket::TimeRange, record::TrendRecord};

use crate::DuckDbBackend;

/// Snapshot rows whose `snapshot_date` falls inside `range`, ascending.
///
/// Each snapshot is timestamped at 00:00 UTC of its date, so comparing
/// dates against the range's UTC calendar dates is exact.
pub async fn fetch_trend_records_inner(
    db: &DuckDbBackend,
    range: &TimeRange,
) -> Result<Vec<TrendRecord>> {
    let conn = db.conn.lock().await;

    let start_str = range.start().date_naive().format("%Y-%m-%d").to_string();
    let end_str = range.end().date_naive().format("%Y-%m-%d").to_string();

    let mut stmt = conn.prepare(
        r#"
        SELECT
            CAST(snapshot_date AS VARCHAR) AS snapshot_date,
            total_so_far,
            added,
            removed
        FROM product_trends
        WHERE snapshot_date >= CAST(?1 AS DATE)
          AND snapshot_date <= CAST(?2 AS DATE)
        ORDER BY snapshot_date
        "#,
    )?;
    let rows = stmt.query_map(duckdb::params![start_str, end_str], |row| {
        let date: String = row.get(0)?;
        let total_so_far: i64 = row.get(1)?;
        let added: i64 = row.get(2)?;
        let removed: i64 = row.get(3)?;
        Ok((date, total_so_far, added, removed))
    })?;

    let mut records = Vec::new();
    for row in rows {
        let (date, total_so_far, added, removed) = row?;
        let date = NaiveDate::parse_from_str(&date, "%Y-%m-%d")
            .map_err(|e| anyhow!("invalid snapshot_date {date:?}: {e}"))?;
        records.push(TrendRecord {
            timestamp: date.and_hms_opt(0, 0, 0).unwrap_or_default().and_utc(),
            total_so_far,
            added,
            removed,
        });
    }

    tracing::debug!(
        start = %start_str,
        end = %end_str,
        rows = records.len(),
        "Fetched product trend snapshots"
    );
    Ok(records)
}

/// Current number of rows in `products`.
pub async fn fetch_current_total_inner(db: &DuckDbBackend) -> Result<i64> {
    let conn = db.conn.lock().await;
    let mut stmt = conn.prepare("SELECT COUNT(*) FROM products")?;
    let total: i64 = stmt.query_row([], |row| row.get(0))?;
    Ok(total)
}
