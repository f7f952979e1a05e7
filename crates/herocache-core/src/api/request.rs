//! Outbound request construction.

use std::collections::BTreeMap;
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::header::{self, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, Url};
use tracing::warn;

use super::endpoint::{Endpoint, LoginTransport};
use crate::auth::TokenStore;
use crate::error::{Error, Result};

/// A fully-formed request, ready to send. Built fresh for every call.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    url: Url,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl ApiRequest {
    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Header value as text, if present and printable
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    fn with_header(mut self, name: HeaderName, value: &str) -> Result<Self> {
        let value = HeaderValue::from_str(value).map_err(|_| Error::RequestConstructionFailed)?;
        self.headers.insert(name, value);
        Ok(self)
    }

    pub(crate) fn into_parts(self) -> (Method, Url, HeaderMap, Vec<u8>) {
        (self.method, self.url, self.headers, self.body)
    }
}

/// Builds requests against a fixed host, reading the session token on demand.
pub struct RequestBuilder {
    base_url: String,
    tokens: Arc<dyn TokenStore>,
}

impl RequestBuilder {
    pub fn new(base_url: impl Into<String>, tokens: Arc<dyn TokenStore>) -> Self {
        Self {
            base_url: base_url.into(),
            tokens,
        }
    }

    fn url(&self, endpoint: Endpoint) -> Result<Url> {
        let base = Url::parse(&self.base_url).map_err(|e| {
            warn!(base_url = %self.base_url, error = %e, "Invalid API base URL");
            Error::RequestConstructionFailed
        })?;
        if base.cannot_be_a_base() {
            warn!(base_url = %self.base_url, "API base URL cannot be a base");
            return Err(Error::RequestConstructionFailed);
        }
        base.join(endpoint.path())
            .map_err(|_| Error::RequestConstructionFailed)
    }

    /// Build a request for `endpoint` with `params` serialized as a JSON body.
    ///
    /// Fails with `SessionTokenMissing` when `requires_token` is set and no
    /// token is stored; nothing is sent in that case.
    pub fn build(
        &self,
        endpoint: Endpoint,
        params: &BTreeMap<String, String>,
        requires_token: bool,
    ) -> Result<ApiRequest> {
        let url = self.url(endpoint)?;

        let token = if requires_token {
            let token = self
                .tokens
                .token()
                .filter(|t| !t.trim().is_empty())
                .ok_or(Error::SessionTokenMissing)?;
            Some(token)
        } else {
            None
        };

        let body = serde_json::to_vec(params).map_err(|e| {
            warn!(error = %e, "Failed to serialize request parameters");
            Error::DataParsingFailed
        })?;

        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));

        let request = ApiRequest {
            method: endpoint.method(),
            url,
            headers,
            body,
        };

        match token {
            Some(token) => request.with_header(header::AUTHORIZATION, &format!("Bearer {}", token)),
            None => Ok(request),
        }
    }

    /// Build the login request for the given transport.
    pub fn build_login(
        &self,
        username: &str,
        password: &str,
        transport: LoginTransport,
    ) -> Result<ApiRequest> {
        match transport {
            LoginTransport::Basic => {
                let encoded = STANDARD.encode(format!("{}:{}", username, password));
                self.build(Endpoint::Login, &BTreeMap::new(), false)?
                    .with_header(header::AUTHORIZATION, &format!("Basic {}", encoded))
            }
            LoginTransport::Body => {
                let params = BTreeMap::from([
                    ("username".to_string(), username.to_string()),
                    ("password".to_string(), password.to_string()),
                ]);
                self.build(Endpoint::Login, &params, false)
            }
        }
    }
}
