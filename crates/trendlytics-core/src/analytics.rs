//! Trend operations and the storage abstraction they read from.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Serialize;

use crate::aggregate::{aggregate_count, aggregate_trend, BucketedCount, BucketedTrend};
use crate::bucket::{parse_date, plan_buckets, Granularity, TimeRange};
use crate::error::TrendError;
use crate::record::{EventRecord, TrendRecord};

/// Read-only access to the two stored time series.
///
/// Handed to the request layer as `Arc<dyn TrendStore>`, so tests can swap
/// in a double that returns fixed records.
#[async_trait]
pub trait TrendStore: Send + Sync + 'static {
    /// Snapshot rows whose date lies within `range`, ascending.
    async fn fetch_trend_records(&self, range: &TimeRange) -> anyhow::Result<Vec<TrendRecord>>;

    /// Visitor log rows whose timestamp lies within `range`, ascending.
    async fn fetch_event_records(&self, range: &TimeRange) -> anyhow::Result<Vec<EventRecord>>;

    /// Current number of products, independent of any range.
    async fn fetch_current_total(&self) -> anyhow::Result<i64>;

    /// Liveness probe for `/health`.
    async fn ping(&self) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Normalised request parameters shared by both trend operations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrendQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub granularity: Granularity,
}

impl TrendQuery {
    /// Build from raw query-string values. Malformed dates and unknown
    /// granularities count as absent.
    pub fn from_raw(
        start_date: Option<&str>,
        end_date: Option<&str>,
        granularity: Option<&str>,
    ) -> Self {
        Self {
            start_date: start_date.and_then(parse_date),
            end_date: end_date.and_then(parse_date),
            granularity: Granularity::parse(granularity),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductTrend {
    pub current_total: i64,
    pub granularity: Granularity,
    pub trend: Vec<BucketedTrend>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitorTrend {
    /// Number of fetched visits in the planned range.
    pub total_visitors: i64,
    pub granularity: Granularity,
    pub visitors_by_bucket: Vec<BucketedCount>,
}

/// Product count headline plus the bucketed, forward-filled trend.
pub async fn get_product_trend(
    store: &dyn TrendStore,
    query: &TrendQuery,
    today: NaiveDate,
) -> Result<ProductTrend, TrendError> {
    let plan = plan_buckets(query.start_date, query.end_date, query.granularity, today)?;

    let current_total = store
        .fetch_current_total()
        .await
        .map_err(TrendError::Store)?;
    let records = store
        .fetch_trend_records(&plan.range)
        .await
        .map_err(TrendError::Store)?;

    Ok(ProductTrend {
        current_total,
        granularity: plan.granularity,
        trend: aggregate_trend(&records, &plan.buckets),
    })
}

/// Visit counts per bucket.
pub async fn get_visitor_trend(
    store: &dyn TrendStore,
    query: &TrendQuery,
    today: NaiveDate,
) -> Result<VisitorTrend, TrendError> {
    let plan = plan_buckets(query.start_date, query.end_date, query.granularity, today)?;

    let records = store
        .fetch_event_records(&plan.range)
        .await
        .map_err(TrendError::Store)?;

    Ok(VisitorTrend {
        total_visitors: records.len() as i64,
        granularity: plan.granularity,
        visitors_by_bucket: aggregate_count(&records, &plan.buckets),
    })
}
