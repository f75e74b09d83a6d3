use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};

use trendlytics_core::{bucket::TimeRange, record::EventRecord};

use crate::{backend::TIMESTAMP_FORMAT, DuckDbBackend};

/// Visits whose `visited_at` falls inside `range` (both ends inclusive),
/// ascending.
pub async fn fetch_event_records_inner(
    db: &DuckDbBackend,
    range: &TimeRange,
) -> Result<Vec<EventRecord>> {
    let conn = db.conn.lock().await;

    let start_str = range.start().format(TIMESTAMP_FORMAT).to_string();
    let end_str = range.end().format(TIMESTAMP_FORMAT).to_string();

    // epoch_ms keeps millisecond precision without string round-trips.
    let mut stmt = conn.prepare(
        r#"
        SELECT epoch_ms(visited_at) AS visited_ms
        FROM visitor_events
        WHERE visited_at >= CAST(?1 AS TIMESTAMP)
          AND visited_at <= CAST(?2 AS TIMESTAMP)
        ORDER BY visited_at
        "#,
    )?;
    let rows = stmt.query_map(duckdb::params![start_str, end_str], |row| {
        row.get::<_, i64>(0)
    })?;

    let mut records = Vec::new();
    for row in rows {
        let ms = row?;
        let timestamp = DateTime::<Utc>::from_timestamp_millis(ms)
            .ok_or_else(|| anyhow!("visited_at out of range: {ms}"))?;
        records.push(EventRecord { timestamp });
    }

    tracing::debug!(
        start = %start_str,
        end = %end_str,
        rows = records.len(),
        "Fetched visitor events"
    );
    Ok(records)
}
