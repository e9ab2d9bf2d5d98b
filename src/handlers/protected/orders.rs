use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::client::models::OrderUpdate;
use crate::error::ApiError;
use crate::routes::AppState;

/// GET /orders - list orders
pub async fn orders_get(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let orders = state.client.orders().await?;

    Ok(Json(json!({ "success": true, "data": orders })))
}

/// PATCH /orders/:id - partial order update (status, tracking number)
pub async fn order_patch(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(update): Json<OrderUpdate>,
) -> Result<Json<Value>, ApiError> {
    let order = state.client.update_order(id, &update).await?;

    Ok(Json(json!({ "success": true, "data": order })))
}
