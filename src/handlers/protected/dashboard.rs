use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::client::models::TimeRange;
use crate::error::ApiError;
use crate::routes::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsQuery {
    pub time_range: Option<TimeRange>,
}

/// GET /dashboard/stats?timeRange=monthly - dashboard aggregates
pub async fn stats_get(
    State(state): State<AppState>,
    Query(query): Query<StatsQuery>,
) -> Result<Json<Value>, ApiError> {
    let stats = state
        .client
        .dashboard_stats(query.time_range.unwrap_or_default())
        .await?;

    Ok(Json(json!({ "success": true, "data": stats })))
}
