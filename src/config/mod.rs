use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub gateway: GatewayConfig,
    pub upstream: UpstreamConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

/// Route-gating settings consumed by the guard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    pub cookie_name: String,
    pub login_path: String,
    pub api_prefix: String,
    /// Ordered prefix list; first match wins.
    pub unprotected_prefixes: Vec<String>,
}

/// Upstream REST API settings consumed by the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    pub base_url: String,
    /// Bearer token attached to every outbound request when present.
    pub access_token: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Gateway overrides
        if let Ok(v) = env::var("GATEWAY_COOKIE_NAME") {
            self.gateway.cookie_name = v;
        }
        if let Ok(v) = env::var("GATEWAY_LOGIN_PATH") {
            self.gateway.login_path = v;
        }
        if let Ok(v) = env::var("GATEWAY_API_PREFIX") {
            self.gateway.api_prefix = v;
        }
        if let Ok(v) = env::var("GATEWAY_UNPROTECTED_PREFIXES") {
            self.gateway.unprotected_prefixes = v.split(',').map(|s| s.trim().to_string()).collect();
        }

        // Upstream overrides
        if let Ok(v) = env::var("UPSTREAM_BASE_URL") {
            self.upstream.base_url = v;
        }
        if let Ok(v) = env::var("UPSTREAM_ACCESS_TOKEN") {
            self.upstream.access_token = Some(v);
        }

        self
    }

    fn gateway_defaults() -> GatewayConfig {
        GatewayConfig {
            cookie_name: "authToken".to_string(),
            login_path: "/auth/login".to_string(),
            api_prefix: "/api".to_string(),
            unprotected_prefixes: vec![
                "/auth/login".to_string(),
                "/auth/register".to_string(),
                "/auth/forgot".to_string(),
                "/auth/reset".to_string(),
            ],
        }
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            gateway: Self::gateway_defaults(),
            upstream: UpstreamConfig {
                base_url: "http://localhost:8080".to_string(),
                access_token: None,
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            gateway: Self::gateway_defaults(),
            upstream: UpstreamConfig {
                base_url: "https://api-staging.example.com".to_string(),
                access_token: None,
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            gateway: Self::gateway_defaults(),
            upstream: UpstreamConfig {
                base_url: "https://api.example.com".to_string(),
                access_token: None,
            },
        }
    }
}
