use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use trendlytics_core::{
    analytics::{get_product_trend, get_visitor_trend, TrendQuery, TrendStore},
    bucket::{plan_buckets, Granularity, TimeRange},
};
use trendlytics_duckdb::DuckDbBackend;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, s)
        .single()
        .expect("valid timestamp")
}

fn day_range(start: NaiveDate, end: NaiveDate) -> TimeRange {
    plan_buckets(Some(start), Some(end), Granularity::Day, end)
        .expect("plan")
        .range
}

#[tokio::test]
async fn test_trend_store_dyn_dispatch() {
    let db = Arc::new(DuckDbBackend::open_in_memory().expect("db"));
    db.seed_product("p1", "Desk").await.expect("seed");
    db.seed_product("p2", "Chair").await.expect("seed");
    db.seed_product("p3", "Lamp").await.expect("seed");
    // Re-seeding the same id updates in place.
    db.seed_product("p3", "Floor lamp").await.expect("seed");

    let store: Arc<dyn TrendStore> = db.clone();
    store.ping().await.expect("ping");
    assert_eq!(store.fetch_current_total().await.expect("total"), 3);
}

#[tokio::test]
async fn test_fetch_trend_records_respects_range() {
    let db = DuckDbBackend::open_in_memory().expect("db");
    db.seed_trend(date(2025, 8, 31), 5, 5, 0).await.expect("seed");
    db.seed_trend(date(2025, 9, 3), 12, 4, 1).await.expect("seed");
    db.seed_trend(date(2025, 9, 1), 9, 4, 0).await.expect("seed");
    db.seed_trend(date(2025, 9, 4), 13, 1, 0).await.expect("seed");

    let records = db
        .fetch_trend_records(&day_range(date(2025, 9, 1), date(2025, 9, 3)))
        .await
        .expect("records");

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].timestamp, at(2025, 9, 1, 0, 0, 0));
    assert_eq!(records[0].total_so_far, 9);
    assert_eq!(records[1].timestamp, at(2025, 9, 3, 0, 0, 0));
    assert_eq!(records[1].added, 4);
    assert_eq!(records[1].removed, 1);
}

#[tokio::test]
async fn test_fetch_event_records_includes_both_edges() {
    let db = DuckDbBackend::open_in_memory().expect("db");
    let last_ms = at(2025, 9, 4, 0, 0, 0) - Duration::milliseconds(1);
    db.seed_visitor_event("e1", at(2025, 8, 31, 23, 59, 59), "/")
        .await
        .expect("seed");
    db.seed_visitor_event("e2", last_ms, "/pricing")
        .await
        .expect("seed");
    db.seed_visitor_event("e3", at(2025, 9, 1, 0, 0, 0), "/")
        .await
        .expect("seed");
    db.seed_visitor_event("e4", at(2025, 9, 4, 0, 0, 0), "/")
        .await
        .expect("seed");

    let records = db
        .fetch_event_records(&day_range(date(2025, 9, 1), date(2025, 9, 3)))
        .await
        .expect("records");

    let timestamps: Vec<DateTime<Utc>> = records.iter().map(|r| r.timestamp).collect();
    assert_eq!(timestamps, vec![at(2025, 9, 1, 0, 0, 0), last_ms]);
}

#[tokio::test]
async fn test_product_trend_over_duckdb_weekly() {
    let db = DuckDbBackend::open_in_memory().expect("db");
    db.seed_product("p1", "Desk").await.expect("seed");
    db.seed_product("p2", "Chair").await.expect("seed");
    db.seed_trend(date(2025, 9, 2), 10, 10, 0).await.expect("seed");
    db.seed_trend(date(2025, 9, 6), 11, 2, 1).await.expect("seed");
    db.seed_trend(date(2025, 9, 16), 14, 3, 0).await.expect("seed");

    let query = TrendQuery {
        start_date: Some(date(2025, 9, 3)),
        end_date: Some(date(2025, 9, 17)),
        granularity: Granularity::Week,
    };
    let result = get_product_trend(&db, &query, date(2025, 9, 30))
        .await
        .expect("product trend");

    assert_eq!(result.current_total, 2);
    let rows: Vec<(NaiveDate, NaiveDate, i64, i64, i64)> = result
        .trend
        .iter()
        .map(|b| (b.start_date, b.end_date, b.total_at_end, b.added, b.removed))
        .collect();
    assert_eq!(
        rows,
        vec![
            (date(2025, 9, 1), date(2025, 9, 7), 11, 12, 1),
            (date(2025, 9, 8), date(2025, 9, 14), 11, 0, 0),
            (date(2025, 9, 15), date(2025, 9, 21), 14, 3, 0),
        ]
    );
}

#[tokio::test]
async fn test_visitor_trend_over_duckdb_monthly() {
    let db = DuckDbBackend::open_in_memory().expect("db");
    db.seed_visitor_event("e1", at(2025, 1, 31, 23, 0, 0), "/")
        .await
        .expect("seed");
    db.seed_visitor_event("e2", at(2025, 2, 1, 0, 0, 0), "/")
        .await
        .expect("seed");
    db.seed_visitor_event("e3", at(2025, 2, 28, 12, 0, 0), "/")
        .await
        .expect("seed");

    let query = TrendQuery {
        start_date: Some(date(2025, 2, 1)),
        end_date: Some(date(2025, 2, 28)),
        granularity: Granularity::Month,
    };
    let result = get_visitor_trend(&db, &query, date(2025, 9, 30))
        .await
        .expect("visitor trend");

    assert_eq!(result.total_visitors, 2);
    assert_eq!(result.visitors_by_bucket.len(), 1);
    assert_eq!(result.visitors_by_bucket[0].start_date, date(2025, 2, 1));
    assert_eq!(result.visitors_by_bucket[0].end_date, date(2025, 2, 28));
    assert_eq!(result.visitors_by_bucket[0].count, 2);
}
