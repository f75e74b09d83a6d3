use axum::extract::{rejection::QueryRejection, Query};
use serde::Deserialize;

use trendlytics_core::analytics::TrendQuery;

/// Query string shared by the trend endpoints.
///
/// Every field is optional and kept raw; malformed values are treated as
/// absent by [`TrendQuery::from_raw`].
#[derive(Debug, Default, Deserialize)]
pub struct TrendParams {
    #[serde(rename = "startDate", alias = "start_date")]
    pub start_date: Option<String>,
    #[serde(rename = "endDate", alias = "end_date")]
    pub end_date: Option<String>,
    pub granularity: Option<String>,
}

impl TrendParams {
    pub(crate) fn to_query(&self) -> TrendQuery {
        TrendQuery::from_raw(
            self.start_date.as_deref(),
            self.end_date.as_deref(),
            self.granularity.as_deref(),
        )
    }
}

/// Resolve an extracted query string, falling back to all-defaults when the
/// string itself cannot be decoded (e.g. a repeated key).
pub(crate) fn lenient_query(params: Result<Query<TrendParams>, QueryRejection>) -> TrendQuery {
    match params {
        Ok(Query(params)) => params.to_query(),
        Err(rejection) => {
            tracing::debug!(error = %rejection, "Unreadable query string, using defaults");
            TrendQuery::default()
        }
    }
}
