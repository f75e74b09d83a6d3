use async_trait::async_trait;

use trendlytics_core::{
    analytics::TrendStore,
    bucket::TimeRange,
    record::{EventRecord, TrendRecord},
};

use crate::DuckDbBackend;

#[async_trait]
impl TrendStore for DuckDbBackend {
    async fn fetch_trend_records(&self, range: &TimeRange) -> anyhow::Result<Vec<TrendRecord>> {
        crate::queries::trends::fetch_trend_records_inner(self, range).await
    }

    async fn fetch_event_records(&self, range: &TimeRange) -> anyhow::Result<Vec<EventRecord>> {
        crate::queries::visitors::fetch_event_records_inner(self, range).await
    }

    async fn fetch_current_total(&self) -> anyhow::Result<i64> {
        crate::queries::trends::fetch_current_total_inner(self).await
    }

    async fn ping(&self) -> anyhow::Result<()> {
        DuckDbBackend::ping(self).await
    }
}
