use axum::{extract::Query, response::IntoResponse, Json};
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    pub redirect: Option<String>,
}

/// GET /auth/login - login surface; echoes where to resume after success
pub async fn login_get(Query(query): Query<LoginQuery>) -> impl IntoResponse {
    Json(json!({
        "success": true,
        "data": {
            "surface": "login",
            "resume": query.redirect.unwrap_or_else(|| "/".to_string()),
        }
    }))
}

/// GET /auth/register - registration surface
pub async fn register_get() -> impl IntoResponse {
    Json(json!({ "success": true, "data": { "surface": "register" } }))
}

/// GET /auth/forgot - password reset request surface
pub async fn forgot_get() -> impl IntoResponse {
    Json(json!({ "success": true, "data": { "surface": "forgot" } }))
}

/// GET /auth/reset - password reset completion surface
pub async fn reset_get() -> impl IntoResponse {
    Json(json!({ "success": true, "data": { "surface": "reset" } }))
}
