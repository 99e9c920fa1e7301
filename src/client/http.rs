// Copyright (c) 2025 ADBC Drivers Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! HTTP gateway for the Databricks REST API.
//!
//! This module provides a thin authenticated client with:
//! - Connection pooling
//! - Bearer token injection from the [`CredentialStore`]
//! - Uniform status checking and JSON decoding
//! - Configurable timeouts
//!
//! Retries are left to callers.

use crate::auth::CredentialStore;
use crate::error::{Error, Result};
use crate::types::sea::SUBMIT_WAIT_TIMEOUT;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION};
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

/// Headroom required between the submit wait hint and the read timeout.
pub const MIN_READ_TIMEOUT_MARGIN: Duration = Duration::from_secs(5);

/// Configuration for the HTTP client.
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Connection timeout duration.
    pub connect_timeout: Duration,
    /// Whole-request timeout. Must exceed the statement submit wait hint.
    pub read_timeout: Duration,
    /// Maximum number of idle connections per host.
    pub max_connections_per_host: usize,
    /// User agent string.
    pub user_agent: String,
}

impl HttpClientConfig {
    /// Reject a read timeout that would cut a submit short while the server
    /// is still holding it for the wait hint.
    pub fn validate(&self) -> Result<()> {
        let minimum = SUBMIT_WAIT_TIMEOUT + MIN_READ_TIMEOUT_MARGIN;
        if self.read_timeout < minimum {
            return Err(Error::Configuration(format!(
                "HTTP read timeout {:?} must be at least {:?} (submit wait {:?} plus {:?})",
                self.read_timeout, minimum, SUBMIT_WAIT_TIMEOUT, MIN_READ_TIMEOUT_MARGIN
            )));
        }
        Ok(())
    }
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(30),
            read_timeout: Duration::from_secs(60),
            max_connections_per_host: 100,
            user_agent: format!("databricks-mcp/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// One call against the REST API, relative to the workspace host.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    body: Option<Value>,
    headers: HeaderMap,
    check_status: bool,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            headers: HeaderMap::new(),
            check_status: true,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    /// Append a query parameter.
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Set a JSON body.
    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Add a caller header. An `Authorization` header set here is ignored.
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Opt out of failing on non-2xx statuses.
    pub fn check_status(mut self, check: bool) -> Self {
        self.check_status = check;
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

/// Authenticated HTTP client for Databricks REST endpoints.
#[derive(Debug)]
pub struct DatabricksHttpClient {
    client: Client,
    config: HttpClientConfig,
    host: Option<String>,
    credentials: CredentialStore,
}

impl DatabricksHttpClient {
    /// Creates a new HTTP client. A missing host is only reported when a
    /// request is made.
    pub fn new(
        config: HttpClientConfig,
        host: Option<&str>,
        credentials: CredentialStore,
    ) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.read_timeout)
            .pool_max_idle_per_host(config.max_connections_per_host)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| Error::Transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            config,
            host: host.map(normalize_host),
            credentials,
        })
    }

    /// Returns the client configuration.
    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    /// Returns the normalized workspace host.
    pub fn host(&self) -> Result<&str> {
        self.host
            .as_deref()
            .ok_or_else(|| Error::Configuration("DATABRICKS_HOST is not configured".to_string()))
    }

    /// Build the absolute URL for a relative API path.
    pub fn url(&self, path: &str) -> Result<String> {
        let host = self.host()?;
        if path.starts_with('/') {
            Ok(format!("{}{}", host, path))
        } else {
            Ok(format!("{}/{}", host, path))
        }
    }

    /// Issue a request and decode the JSON response.
    pub async fn call(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<Value>,
    ) -> Result<Value> {
        let mut request = ApiRequest::new(method, path);
        for (key, value) in query {
            request = request.query(*key, *value);
        }
        if let Some(body) = body {
            request = request.json(body);
        }
        self.send(request).await
    }

    /// Issue a request and decode the response into `T`.
    pub async fn call_json<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T> {
        let path = request.path.clone();
        let value = self.send(request).await?;
        serde_json::from_value(value)
            .map_err(|e| Error::Decode(format!("unexpected response shape from {}: {}", path, e)))
    }

    /// Execute an [`ApiRequest`].
    pub async fn send(&self, request: ApiRequest) -> Result<Value> {
        let url = self.url(&request.path)?;
        let auth = self.credentials.resolve().await?;

        let mut headers = request.headers.clone();
        headers.remove(AUTHORIZATION);

        let mut builder = self
            .client
            .request(request.method.clone(), &url)
            .headers(headers)
            .header(AUTHORIZATION, auth.authorization);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(ref body) = request.body {
            builder = builder.json(body);
        }

        debug!("Executing {} {}", request.method, url);

        let response = builder
            .send()
            .await
            .map_err(|e| Error::Transport(format!("{} {} failed: {}", request.method, url, e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::Transport(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            if request.check_status {
                warn!("{} {} answered HTTP {}", request.method, url, status.as_u16());
                return Err(Error::Http {
                    status: status.as_u16(),
                    body,
                });
            }
            // Unchecked error bodies are handed back as-is when not JSON.
            return Ok(serde_json::from_str(&body).unwrap_or(Value::String(body)));
        }

        decode_body(&body)
    }
}

/// Decode a 2xx body. An empty body is an empty object.
fn decode_body(body: &str) -> Result<Value> {
    if body.trim().is_empty() {
        return Ok(Value::Object(Default::default()));
    }
    serde_json::from_str(body)
        .map_err(|e| Error::Decode(format!("{} - body: {}", e, truncate(body, 512))))
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Trim whitespace and trailing slashes; default the scheme to https.
fn normalize_host(host: &str) -> String {
    let host = host.trim().trim_end_matches('/');
    if host.contains("://") {
        host.to_string()
    } else {
        format!("https://{}", host)
    }
}
