use url::form_urlencoded;

use crate::config::GatewayConfig;

/// Classification of one requested path. Exactly one class applies; rules are
/// checked in order and the first match wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    /// Path with a file extension (served assets, favicons, bundles).
    Static,
    /// Path under the API namespace; the API enforces its own auth.
    ApiEndpoint,
    /// Path under an explicitly unprotected prefix (login, register, ...).
    Unprotected,
    /// Everything else; requires a credential.
    Protected,
}

/// Outcome of a gating decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardOutcome {
    /// Let the request through unmodified.
    Pass,
    /// Send the client to the login surface; carries the redirect location.
    Redirect(String),
}

/// Per-navigation access gate.
///
/// Pure decision logic: no I/O, no clock, no global state. The credential is
/// checked for presence only; this layer never inspects validity or expiry.
#[derive(Debug, Clone)]
pub struct RouteGuard {
    cookie_name: String,
    login_path: String,
    api_prefix: String,
    unprotected_prefixes: Vec<String>,
}

impl RouteGuard {
    pub fn new(config: &GatewayConfig) -> Self {
        Self {
            cookie_name: config.cookie_name.clone(),
            login_path: config.login_path.clone(),
            api_prefix: config.api_prefix.clone(),
            unprotected_prefixes: config.unprotected_prefixes.clone(),
        }
    }

    /// Name of the cookie the credential is read from.
    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    pub fn classify(&self, path: &str) -> RouteClass {
        if is_static_asset(path) {
            return RouteClass::Static;
        }
        if path.starts_with(&self.api_prefix) {
            return RouteClass::ApiEndpoint;
        }
        if self.unprotected_prefixes.iter().any(|p| path.starts_with(p.as_str())) {
            return RouteClass::Unprotected;
        }
        RouteClass::Protected
    }

    /// Decide what to do with a navigation to `path` given the credential
    /// found in the cookie jar (if any). An empty credential counts as absent.
    pub fn decide(&self, path: &str, credential: Option<&str>) -> GuardOutcome {
        match self.classify(path) {
            RouteClass::Static | RouteClass::ApiEndpoint | RouteClass::Unprotected => GuardOutcome::Pass,
            RouteClass::Protected => {
                if credential.map_or(false, |c| !c.is_empty()) {
                    GuardOutcome::Pass
                } else {
                    GuardOutcome::Redirect(self.login_redirect(path))
                }
            }
        }
    }

    /// Build the login location, preserving the intended destination so the
    /// login flow can return the user there after success.
    fn login_redirect(&self, path: &str) -> String {
        let query: String = form_urlencoded::Serializer::new(String::new())
            .append_pair("redirect", path)
            .finish();
        format!("{}?{}", self.login_path, query)
    }
}

/// Any path containing a dot is treated as a static asset, wherever the dot
/// sits. Coarse, but it is the gating rule the console relies on.
fn is_static_asset(path: &str) -> bool {
    path.contains('.')
}
