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

//! OAuth2 client-credentials authentication.
//!
//! Access tokens are cached together with their expiry. A token is reused
//! while `now < expires_at`; afterwards the next caller performs exactly one
//! refresh while holding the cache lock, so concurrent callers never issue
//! parallel token requests and never observe a half-written cache.

use crate::auth::AuthProvider;
use crate::error::{Error, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Seconds subtracted from the advertised token lifetime so a token never
/// expires in the middle of a request.
pub const TOKEN_EXPIRY_MARGIN_SECS: i64 = 10;

/// Fixed timeout for token endpoint calls.
pub const TOKEN_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Source of the current time for expiry checks.
pub trait Clock: Send + Sync + std::fmt::Debug {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// An access token and the instant it stops being trusted.
#[derive(Clone, PartialEq, Eq)]
pub struct CachedToken {
    pub access_token: String,
    /// `None` when the endpoint gave no usable lifetime; such a token is
    /// kept until the process restarts.
    pub expires_at: Option<DateTime<Utc>>,
}

impl std::fmt::Debug for CachedToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedToken")
            .field("access_token", &"***")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

impl CachedToken {
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            Some(expires_at) => now < expires_at,
            None => true,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    expires_in: Option<Value>,
}

/// Expiry instant for a token issued at `now` with the given lifetime,
/// less the safety margin. `None` when the instant is not representable.
fn expiry_after(now: DateTime<Utc>, expires_in_secs: f64) -> Option<DateTime<Utc>> {
    let lifetime = (expires_in_secs - TOKEN_EXPIRY_MARGIN_SECS as f64).max(0.0);
    let lifetime = Duration::try_from_secs_f64(lifetime).ok()?;
    let lifetime = chrono::Duration::from_std(lifetime).ok()?;
    now.checked_add_signed(lifetime)
}

/// Lifetime in seconds; accepts a number or a numeric string. Zero and
/// unparseable values count as "no lifetime given".
fn parse_expires_in(value: &Value) -> Option<f64> {
    let secs = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    (secs.is_finite() && secs > 0.0).then_some(secs)
}

/// OAuth2 client-credentials provider with an expiry-aware token cache.
pub struct OAuthCredentials {
    client_id: String,
    client_secret: String,
    token_url: String,
    scope: Option<String>,
    http: Client,
    clock: Arc<dyn Clock>,
    cache: Mutex<Option<CachedToken>>,
}

impl std::fmt::Debug for OAuthCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthCredentials")
            .field("token_url", &self.token_url)
            .field("scope", &self.scope)
            .field("clock", &self.clock)
            .finish()
    }
}

/// Builder for [`OAuthCredentials`].
#[derive(Debug)]
pub struct OAuthCredentialsBuilder {
    client_id: String,
    client_secret: String,
    token_url: String,
    scope: Option<String>,
    clock: Arc<dyn Clock>,
}

impl OAuthCredentialsBuilder {
    pub fn scope(mut self, scope: Option<String>) -> Self {
        self.scope = scope;
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn build(self) -> Result<OAuthCredentials> {
        let http = Client::builder()
            .timeout(TOKEN_REQUEST_TIMEOUT)
            .build()
            .map_err(|e| Error::Transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(OAuthCredentials {
            client_id: self.client_id,
            client_secret: self.client_secret,
            token_url: self.token_url,
            scope: self.scope,
            http,
            clock: self.clock,
            cache: Mutex::new(None),
        })
    }
}

impl OAuthCredentials {
    pub fn builder(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        token_url: impl Into<String>,
    ) -> OAuthCredentialsBuilder {
        OAuthCredentialsBuilder {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            token_url: token_url.into(),
            scope: None,
            clock: Arc::new(SystemClock),
        }
    }

    /// Snapshot of the cached token, if any.
    pub async fn cached_token(&self) -> Option<CachedToken> {
        self.cache.lock().await.clone()
    }

    fn auth_error(&self, status: Option<u16>, body: impl Into<String>) -> Error {
        Error::Authentication {
            endpoint: self.token_url.clone(),
            status,
            body: body.into(),
        }
    }

    /// Perform one client-credentials token request.
    async fn request_token(&self) -> Result<CachedToken> {
        let mut form: Vec<(&str, &str)> = vec![("grant_type", "client_credentials")];
        if let Some(ref scope) = self.scope {
            form.push(("scope", scope.as_str()));
        }
        form.push(("client_id", self.client_id.as_str()));
        form.push(("client_secret", self.client_secret.as_str()));

        debug!("Requesting OAuth token from {}", self.token_url);

        let response = self
            .http
            .post(&self.token_url)
            .form(&form)
            .send()
            .await
            .map_err(|e| self.auth_error(None, e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| self.auth_error(Some(status.as_u16()), e.to_string()))?;

        if !status.is_success() {
            warn!("Token endpoint {} answered HTTP {}", self.token_url, status);
            return Err(self.auth_error(Some(status.as_u16()), body));
        }

        let parsed: TokenResponse = serde_json::from_str(&body).map_err(|_| {
            self.auth_error(
                Some(status.as_u16()),
                format!("token endpoint did not return JSON: {}", body),
            )
        })?;

        let access_token = parsed
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                self.auth_error(
                    Some(status.as_u16()),
                    format!("token endpoint did not return access_token: {}", body),
                )
            })?;

        let now = self.clock.now();
        let expires_at = parsed
            .expires_in
            .as_ref()
            .and_then(parse_expires_in)
            .and_then(|secs| expiry_after(now, secs));

        match expires_at {
            Some(at) => debug!("Obtained OAuth token, valid until {}", at),
            None => debug!("Obtained OAuth token without expiry"),
        }

        Ok(CachedToken {
            access_token,
            expires_at,
        })
    }
}

#[async_trait]
impl AuthProvider for OAuthCredentials {
    async fn get_auth_header(&self) -> Result<String> {
        // Held across the refresh: one token request in flight at a time.
        let mut cache = self.cache.lock().await;

        if let Some(ref token) = *cache {
            if token.is_valid_at(self.clock.now()) {
                return Ok(format!("Bearer {}", token.access_token));
            }
            debug!("Cached OAuth token expired, refreshing");
        }

        let token = self.request_token().await?;
        let header = format!("Bearer {}", token.access_token);
        *cache = Some(token);
        Ok(header)
    }
}
