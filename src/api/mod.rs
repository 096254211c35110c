//! Thin typed clients over the REST surface of the campaign backend.

pub mod endpoints;

use serde_json::{Map, Value};

use crate::http::fetcher::{ApiRequest, AuthToken, FetchOutcome, Fetcher};
use crate::http::mutation::{normalize_failure, MutationConfig, MutationError, RemoteMutation};
use crate::http::transport::{HttpTransport, Method};

/// Authenticated client bound to one backend base URL.
#[derive(Debug, Clone)]
pub struct ApiClient<T> {
    fetcher: Fetcher<T>,
    base_url: String,
    auth: Option<AuthToken>,
}

impl<T: HttpTransport> ApiClient<T> {
    pub fn new(transport: T, base_url: impl Into<String>) -> Self {
        Self {
            fetcher: Fetcher::new(transport),
            base_url: base_url.into(),
            auth: None,
        }
    }

    pub fn with_auth(mut self, auth: Option<AuthToken>) -> Self {
        self.auth = auth;
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get(&self, path: &str) -> Result<Value, MutationError> {
        let outcome = self
            .fetcher
            .request(ApiRequest::new(Method::Get, self.url(path)).auth(self.auth.clone()))
            .await;
        match outcome {
            FetchOutcome::Success { data, .. } => Ok(data),
            failure => Err(normalize_failure(failure)),
        }
    }

    async fn mutate(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Value, MutationError> {
        RemoteMutation::new(
            &self.fetcher,
            MutationConfig::new(method, self.url(path)).auth(self.auth.clone()),
        )
        .run(body)
        .await
    }

    // ---- Workspaces ----

    pub async fn create_workspace(&self, payload: Value) -> Result<Value, MutationError> {
        self.mutate(Method::Post, endpoints::WORKSPACES, Some(payload))
            .await
    }

    pub async fn request_access_token(&self, payload: Value) -> Result<Value, MutationError> {
        self.mutate(Method::Post, endpoints::ACCESS_TOKEN, Some(payload))
            .await
    }

    pub async fn current_workspace(&self) -> Result<Value, MutationError> {
        self.get(endpoints::CURRENT_WORKSPACE).await
    }

    // ---- Campaigns ----

    pub async fn list_campaigns(&self) -> Result<Value, MutationError> {
        self.get(endpoints::CAMPAIGNS).await
    }

    pub async fn get_campaign(&self, id: u64) -> Result<Value, MutationError> {
        self.get(&endpoints::campaign(id)).await
    }

    pub async fn create_campaign(&self, payload: Value) -> Result<Value, MutationError> {
        self.mutate(Method::Post, endpoints::CAMPAIGNS, Some(payload))
            .await
    }

    pub async fn update_campaign(&self, id: u64, payload: Value) -> Result<Value, MutationError> {
        self.mutate(Method::Put, &endpoints::campaign(id), Some(payload))
            .await
    }

    pub async fn delete_campaign(&self, id: u64) -> Result<Value, MutationError> {
        self.mutate(Method::Delete, &endpoints::campaign(id), None)
            .await
    }

    pub async fn update_tokenomics(&self, id: u64, payload: Value) -> Result<Value, MutationError> {
        self.mutate(Method::Put, &endpoints::campaign_tokenomics(id), Some(payload))
            .await
    }

    pub async fn update_technical(&self, id: u64, payload: Value) -> Result<Value, MutationError> {
        self.mutate(Method::Put, &endpoints::campaign_technical(id), Some(payload))
            .await
    }

    pub async fn update_market(&self, id: u64, payload: Value) -> Result<Value, MutationError> {
        self.mutate(Method::Put, &endpoints::campaign_market(id), Some(payload))
            .await
    }

    pub async fn toggle_publish(&self, id: u64) -> Result<Value, MutationError> {
        self.get(&endpoints::toggle_publish(id)).await
    }

    // ---- Campaign settings ----

    /// Fetches the wire-named settings snapshot for one campaign.
    pub async fn fetch_settings(&self, id: u64) -> Result<Map<String, Value>, MutationError> {
        let data = self.get(&endpoints::campaign_settings(id)).await?;
        match data {
            Value::Object(map) => Ok(map),
            other => {
                log::warn!("[API] settings payload is not an object: {other}");
                Err(MutationError::message("malformed settings payload"))
            }
        }
    }

    /// Sends one field update, wire-named, as the backend expects it.
    pub async fn update_setting(
        &self,
        id: u64,
        wire_field: &str,
        value: Value,
    ) -> Result<Value, MutationError> {
        self.mutate(
            Method::Put,
            &endpoints::campaign_settings(id),
            Some(serde_json::json!({"fieldName": wire_field, "value": value})),
        )
        .await
    }

    // ---- Platform connections ----

    pub async fn connect_platform(
        &self,
        platform: &str,
        campaign_id: u64,
    ) -> Result<Value, MutationError> {
        self.mutate(
            Method::Post,
            endpoints::PLATFORM_CONNECT,
            Some(serde_json::json!({"platform": platform, "campaignId": campaign_id})),
        )
        .await
    }

    pub async fn platform_callback(
        &self,
        platform: &str,
        payload: Value,
    ) -> Result<Value, MutationError> {
        self.mutate(
            Method::Post,
            &endpoints::platform_callback(platform),
            Some(payload),
        )
        .await
    }

    pub async fn platform_statuses(&self, campaign_id: u64) -> Result<Value, MutationError> {
        self.get(&endpoints::platform_statuses(campaign_id)).await
    }

    pub async fn disconnect_platform(&self, connection_id: u64) -> Result<Value, MutationError> {
        self.mutate(
            Method::Post,
            &endpoints::platform_disconnect(connection_id),
            None,
        )
        .await
    }
}
