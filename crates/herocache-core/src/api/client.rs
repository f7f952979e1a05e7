//! API client for the heroes REST API.
//!
//! `ApiClient` executes `ApiRequest`s built by the `RequestBuilder` and maps
//! every outcome onto the crate error taxonomy.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::endpoint::{Endpoint, LoginTransport};
use super::request::{ApiRequest, RequestBuilder};
use super::wire::{ApiHero, ApiLocation, ApiTransformation};
use crate::error::{Error, Result};

/// HTTP request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Remote data source for heroes and their children.
///
/// Each call resolves exactly once with the whole payload or an error.
#[async_trait]
pub trait HeroApi: Send + Sync {
    /// Heroes whose name matches `name`; an empty name lists all heroes.
    async fn load_heroes(&self, name: &str) -> Result<Vec<ApiHero>>;

    async fn load_locations(&self, hero_id: &str) -> Result<Vec<ApiLocation>>;

    async fn load_transformations(&self, hero_id: &str) -> Result<Vec<ApiTransformation>>;

    /// Exchange credentials for an opaque session token.
    async fn login(&self, username: &str, password: &str) -> Result<String>;
}

/// API client over reqwest.
/// Clones share the connection pool and the request builder.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    builder: Arc<RequestBuilder>,
    login_transport: LoginTransport,
}

impl ApiClient {
    /// Create a client with the default timeout
    pub fn new(builder: RequestBuilder) -> anyhow::Result<Self> {
        Self::with_timeout(builder, Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS))
    }

    pub fn with_timeout(builder: RequestBuilder, timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            builder: Arc::new(builder),
            login_transport: LoginTransport::default(),
        })
    }

    pub fn with_login_transport(mut self, transport: LoginTransport) -> Self {
        self.login_transport = transport;
        self
    }

    /// Send a request and return its non-empty body.
    async fn send(&self, request: ApiRequest) -> Result<Vec<u8>> {
        let (method, url, headers, body) = request.into_parts();
        debug!(%method, %url, "Sending request");

        let response = self
            .client
            .request(method, url.clone())
            .headers(headers)
            .body(body)
            .send()
            .await
            .map_err(|e| {
                warn!(%url, error = %e, "Request failed without a response");
                Error::transport(e)
            })?;

        let status = response.status();
        debug!(%url, status = status.as_u16(), "Received response");
        if !status.is_success() {
            warn!(%url, status = status.as_u16(), "API returned an error status");
            return Err(Error::from_status(status));
        }

        let bytes = response.bytes().await.map_err(|e| {
            warn!(%url, error = %e, "Failed to read response body");
            Error::transport(e)
        })?;

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Err(Error::NoDataReceived);
        }
        Ok(bytes.to_vec())
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        params: BTreeMap<String, String>,
    ) -> Result<T> {
        let request = self
            .builder
            .build(endpoint, &params, endpoint.requires_token())?;
        let body = self.send(request).await?;

        serde_json::from_slice(&body).map_err(|e| {
            warn!(path = endpoint.path(), error = %e, "Failed to decode response");
            Error::DataParsingFailed
        })
    }
}

fn single_param(key: &str, value: &str) -> BTreeMap<String, String> {
    BTreeMap::from([(key.to_string(), value.to_string())])
}

#[async_trait]
impl HeroApi for ApiClient {
    async fn load_heroes(&self, name: &str) -> Result<Vec<ApiHero>> {
        let heroes: Vec<ApiHero> = self
            .fetch(Endpoint::Heroes, single_param("name", name))
            .await?;
        debug!(count = heroes.len(), "Heroes fetched");
        Ok(heroes)
    }

    async fn load_locations(&self, hero_id: &str) -> Result<Vec<ApiLocation>> {
        let locations: Vec<ApiLocation> = self
            .fetch(Endpoint::Locations, single_param("id", hero_id))
            .await?;
        debug!(hero_id, count = locations.len(), "Locations fetched");
        Ok(locations)
    }

    async fn load_transformations(&self, hero_id: &str) -> Result<Vec<ApiTransformation>> {
        let transformations: Vec<ApiTransformation> = self
            .fetch(Endpoint::Transformations, single_param("id", hero_id))
            .await?;
        debug!(hero_id, count = transformations.len(), "Transformations fetched");
        Ok(transformations)
    }

    async fn login(&self, username: &str, password: &str) -> Result<String> {
        let request = self
            .builder
            .build_login(username, password, self.login_transport)?;
        let body = self.send(request).await?;

        let token = String::from_utf8(body).map_err(|_| Error::DataParsingFailed)?;
        let token = token.trim();
        if token.is_empty() {
            return Err(Error::NoDataReceived);
        }
        Ok(token.to_string())
    }
}
