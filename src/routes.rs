use std::sync::Arc;

use axum::{
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, patch},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::client::ApiClient;
use crate::config::AppConfig;
use crate::guard::RouteGuard;
use crate::handlers::{protected, public};
use crate::middleware::route_guard_middleware;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub client: ApiClient,
    pub guard: Arc<RouteGuard>,
}

impl AppState {
    pub fn from_config(config: AppConfig) -> Self {
        let client = ApiClient::new(&config.upstream);
        let guard = Arc::new(RouteGuard::new(&config.gateway));

        Self {
            config: Arc::new(config),
            client,
            guard,
        }
    }
}

pub fn app(state: AppState) -> Router {
    Router::new()
        // Console pages and data surfaces (guarded)
        .route("/", get(root))
        .merge(dashboard_routes())
        .merge(order_routes())
        .merge(product_routes())
        // Public auth surfaces
        .merge(auth_public_routes())
        // API namespace; exempt from the guard by classification
        .route("/api/health", get(health))
        // Explicit fallback so the guard also wraps unmatched paths
        .fallback(not_found)
        // Global middleware
        .layer(middleware::from_fn_with_state(state.clone(), route_guard_middleware))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn auth_public_routes() -> Router<AppState> {
    use public::auth;

    Router::new()
        .route("/auth/login", get(auth::login_get))
        .route("/auth/register", get(auth::register_get))
        .route("/auth/forgot", get(auth::forgot_get))
        .route("/auth/reset", get(auth::reset_get))
}

fn dashboard_routes() -> Router<AppState> {
    use protected::dashboard;

    Router::new().route("/dashboard/stats", get(dashboard::stats_get))
}

fn order_routes() -> Router<AppState> {
    use protected::orders;

    Router::new()
        .route("/orders", get(orders::orders_get))
        .route("/orders/:id", patch(orders::order_patch))
}

fn product_routes() -> Router<AppState> {
    use protected::products;

    Router::new().route("/products/overview/data", get(products::overview_get))
}

async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "Console Gateway",
            "version": version,
            "description": "Edge gateway for the merchant admin console",
            "surfaces": {
                "auth": "/auth/login, /auth/register, /auth/forgot, /auth/reset (public)",
                "dashboard": "/dashboard/stats?timeRange=<daily|weekly|monthly|yearly> (protected)",
                "orders": "/orders, PATCH /orders/:id (protected)",
                "products": "/products/overview/data (protected)",
                "health": "/api/health (public)",
            }
        }
    }))
}

async fn health() -> Json<Value> {
    Json(json!({
        "success": true,
        "data": {
            "status": "ok",
            "timestamp": chrono::Utc::now(),
        }
    }))
}

async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "success": false, "error": "not found" })),
    )
}
