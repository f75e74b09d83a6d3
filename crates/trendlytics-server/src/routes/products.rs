use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    response::IntoResponse,
    Json,
};

use trendlytics_core::{analytics, bucket};

use crate::{
    error::AppError,
    routes::query::{lenient_query, TrendParams},
    state::AppState,
};

/// `GET /api/products/trend` - current product count and its bucketed trend.
///
/// Response shape:
/// ```json
/// { "currentTotal": 42, "granularity": "day",
///   "trend": [{ "startDate": "2025-09-01", "endDate": "2025-09-01",
///               "totalAtEnd": 40, "added": 3, "removed": 1 }] }
/// ```
#[tracing::instrument(skip(state))]
pub async fn get_product_trend(
    State(state): State<Arc<AppState>>,
    params: Result<Query<TrendParams>, QueryRejection>,
) -> Result<impl IntoResponse, AppError> {
    let query = lenient_query(params);
    let today = bucket::today_utc();

    let result = analytics::get_product_trend(state.store.as_ref(), &query, today).await?;

    Ok(Json(result))
}
