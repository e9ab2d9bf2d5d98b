use std::collections::HashMap;
use std::net::SocketAddr;

use anyhow::{Context, Result};
use axum::{
    extract::{Path, Query},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, patch},
    Json, Router,
};
use serde_json::{json, Value};

use console_gateway::config::AppConfig;
use console_gateway::routes::AppState;

/// Bearer token the stub upstream expects on its order listing.
pub const UPSTREAM_TOKEN: &str = "test-token";

pub struct StubUpstream {
    pub base_url: String,
}

/// Spawn a canned upstream REST API on a free local port.
pub async fn spawn_upstream() -> Result<StubUpstream> {
    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let addr: SocketAddr = format!("127.0.0.1:{}", port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let base_url = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, upstream_app()).await.expect("stub upstream");
    });

    Ok(StubUpstream { base_url })
}

/// Gateway state pointed at the given upstream, signing with the stub token.
#[allow(dead_code)]
pub fn test_state(upstream_base: &str) -> AppState {
    let mut config = AppConfig::from_env();
    config.upstream.base_url = upstream_base.to_string();
    config.upstream.access_token = Some(UPSTREAM_TOKEN.to_string());
    AppState::from_config(config)
}

fn upstream_app() -> Router {
    Router::new()
        .route("/dashboard/stats", get(stats_get))
        .route("/orders", get(orders_get))
        .route("/orders/:id", patch(order_patch))
        .route("/products/overview/data", get(overview_get))
        // Misbehaving upstream: 200 with a non-JSON body
        .route("/broken-base/orders", get(|| async { "plain text" }))
}

async fn stats_get(Query(params): Query<HashMap<String, String>>) -> Response {
    // The yearly report is deterministically broken so error paths can be
    // exercised end to end.
    if params.get("timeRange").map(String::as_str) == Some("yearly") {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "report generation failed" })),
        )
            .into_response();
    }

    Json(json!({
        "totalRevenue": "12500.50",
        "totalOrders": 320,
        "totalProducts": 48,
        "pendingReturns": 5,
        "revenueChange": 4.2,
        "ordersChange": -1.5
    }))
    .into_response()
}

async fn orders_get(headers: HeaderMap) -> Response {
    let authorized = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map_or(false, |v| v == format!("Bearer {}", UPSTREAM_TOKEN));

    if !authorized {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "missing bearer token" })),
        )
            .into_response();
    }

    Json(json!([
        {
            "id": "0b9f6c2a-3c4d-4e5f-8a9b-1c2d3e4f5a6b",
            "orderNumber": "ORD-1001",
            "customerName": "Dana Fox",
            "total": "59.99",
            "status": "pending",
            "placedAt": "2026-08-01T10:00:00Z"
        },
        {
            "id": "1a2b3c4d-5e6f-4a8b-9c0d-e1f2a3b4c5d6",
            "orderNumber": "ORD-1002",
            "customerName": "Sam Reyes",
            "total": "120.00",
            "status": "shipped",
            "placedAt": "2026-08-02T14:30:00Z"
        }
    ]))
    .into_response()
}

async fn order_patch(Path(id): Path<String>, Json(update): Json<Value>) -> Response {
    let status = update.get("status").and_then(Value::as_str).unwrap_or("processing");

    Json(json!({
        "id": id,
        "orderNumber": "ORD-1001",
        "customerName": "Dana Fox",
        "total": "59.99",
        "status": status,
        "placedAt": "2026-08-01T10:00:00Z"
    }))
    .into_response()
}

async fn overview_get() -> Response {
    Json(json!({
        "totalProducts": 48,
        "inStock": 40,
        "lowStock": 5,
        "outOfStock": 3
    }))
    .into_response()
}
