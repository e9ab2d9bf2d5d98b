use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::routes::AppState;

/// GET /products/overview/data - stock overview counts
pub async fn overview_get(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let overview = state.client.products_overview().await?;

    Ok(Json(json!({ "success": true, "data": overview })))
}
