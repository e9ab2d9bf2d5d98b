use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use crate::guard::GuardOutcome;
use crate::routes::AppState;

/// Route-gating middleware that runs before any handler. Reads the credential
/// cookie and either forwards the request or answers with a 307 to the login
/// surface, carrying the intended destination.
pub async fn route_guard_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    let credential = extract_cookie(request.headers(), state.guard.cookie_name());

    match state.guard.decide(&path, credential.as_deref()) {
        GuardOutcome::Pass => next.run(request).await,
        GuardOutcome::Redirect(location) => {
            tracing::debug!(path = %path, "unauthenticated navigation, redirecting to login");
            Redirect::temporary(&location).into_response()
        }
    }
}

/// Extract a cookie value by name from the Cookie header.
fn extract_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    let raw = headers.get(header::COOKIE)?.to_str().ok()?;

    for pair in raw.split(';') {
        if let Some((key, value)) = pair.trim().split_once('=') {
            if key == name {
                return Some(value.to_string());
            }
        }
    }

    None
}
