pub mod models;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

use crate::config::UpstreamConfig;
use crate::error::FetchError;
use crate::resource::ResourceFetcher;

use models::{DashboardStats, Order, OrderUpdate, ProductsOverview, TimeRange};

/// Typed client for the upstream REST API.
///
/// Carries the access token it signs outbound requests with; both the token
/// and the base URL are injected at construction, never read from ambient
/// storage. No timeout is applied at this layer.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    access_token: Option<String>,
}

impl ApiClient {
    pub fn new(config: &UpstreamConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            access_token: config.access_token.clone(),
        }
    }

    /// Replace the cached access token used for request signing.
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    pub async fn dashboard_stats(&self, range: TimeRange) -> Result<DashboardStats, FetchError> {
        self.get_json("/dashboard/stats", &[("timeRange", range.as_str())]).await
    }

    pub async fn orders(&self) -> Result<Vec<Order>, FetchError> {
        self.get_json("/orders", &[]).await
    }

    pub async fn update_order(&self, id: Uuid, update: &OrderUpdate) -> Result<Order, FetchError> {
        self.patch_json(&format!("/orders/{}", id), update).await
    }

    pub async fn products_overview(&self) -> Result<ProductsOverview, FetchError> {
        self.get_json("/products/overview/data", &[]).await
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, FetchError> {
        let mut request = self.http.get(format!("{}{}", self.base_url, path));
        if !query.is_empty() {
            request = request.query(query);
        }
        self.execute(request).await
    }

    async fn patch_json<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, FetchError> {
        let request = self.http.patch(format!("{}{}", self.base_url, path)).json(body);
        self.execute(request).await
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        mut request: reqwest::RequestBuilder,
    ) -> Result<T, FetchError> {
        if let Some(token) = &self.access_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status { code: status.as_u16() });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| FetchError::Decode(e.to_string()))
    }
}

// Feed adapters binding one endpoint each, so console surfaces can mount a
// resource straight over the client.

pub struct StatsFeed {
    pub client: ApiClient,
}

#[async_trait]
impl ResourceFetcher<TimeRange> for StatsFeed {
    type Output = DashboardStats;

    async fn fetch(&self, range: TimeRange) -> Result<DashboardStats, FetchError> {
        self.client.dashboard_stats(range).await
    }
}

pub struct OrdersFeed {
    pub client: ApiClient,
}

#[async_trait]
impl ResourceFetcher<()> for OrdersFeed {
    type Output = Vec<Order>;

    async fn fetch(&self, _arg: ()) -> Result<Vec<Order>, FetchError> {
        self.client.orders().await
    }
}

pub struct ProductsOverviewFeed {
    pub client: ApiClient,
}

#[async_trait]
impl ResourceFetcher<()> for ProductsOverviewFeed {
    type Output = ProductsOverview;

    async fn fetch(&self, _arg: ()) -> Result<ProductsOverview, FetchError> {
        self.client.products_overview().await
    }
}
