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

/// `GET /api/visitors/trend` - visit counts per bucket.
#[tracing::instrument(skip(state))]
pub async fn get_visitor_trend(
    State(state): State<Arc<AppState>>,
    params: Result<Query<TrendParams>, QueryRejection>,
) -> Result<impl IntoResponse, AppError> {
    let query = lenient_query(params);
    let today = bucket::today_utc();

    let result = analytics::get_visitor_trend(state.store.as_ref(), &query, today).await?;

    Ok(Json(result))
}
