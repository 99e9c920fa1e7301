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

//! Authentication for Databricks REST calls.
//!
//! Two mutually exclusive flows are supported:
//! - [`PersonalAccessToken`]: a static bearer token, never refreshed.
//! - [`OAuthCredentials`]: OAuth2 client-credentials grant with an
//!   expiry-aware token cache.
//!
//! [`CredentialStore`] selects one flow from [`DatabricksConfig`] at startup
//! and resolves the `Authorization` header on demand.

pub mod oauth;
pub mod pat;

use crate::config::{DatabricksConfig, ENV_OAUTH_TOKEN_URL};
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

pub use oauth::{CachedToken, Clock, OAuthCredentials, SystemClock, TOKEN_EXPIRY_MARGIN_SECS};
pub use pat::PersonalAccessToken;

/// Source of the `Authorization` header value.
#[async_trait]
pub trait AuthProvider: Send + Sync + std::fmt::Debug {
    /// Returns the full header value, e.g. `Bearer dapi...`.
    async fn get_auth_header(&self) -> Result<String>;
}

/// The credential variant active for this process.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    PersonalToken {
        token: String,
    },
    ClientCredentials {
        client_id: String,
        client_secret: String,
        token_url: String,
        scope: Option<String>,
    },
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Credentials::PersonalToken { .. } => f
                .debug_struct("PersonalToken")
                .field("token", &"***")
                .finish(),
            Credentials::ClientCredentials {
                token_url, scope, ..
            } => f
                .debug_struct("ClientCredentials")
                .field("client_id", &"***")
                .field("client_secret", &"***")
                .field("token_url", token_url)
                .field("scope", scope)
                .finish(),
        }
    }
}

impl Credentials {
    /// Select the credential flow.
    ///
    /// A personal access token wins. Otherwise both client id and secret
    /// select the client-credentials flow, which also needs a token URL.
    pub fn from_config(config: &DatabricksConfig) -> Result<Self> {
        if let Some(ref token) = config.pat_token {
            return Ok(Credentials::PersonalToken {
                token: token.clone(),
            });
        }

        if let (Some(client_id), Some(client_secret)) = (&config.client_id, &config.client_secret) {
            let token_url = config.oauth_token_url.clone().ok_or_else(|| {
                Error::Configuration(format!(
                    "{} must be set for client-credentials auth",
                    ENV_OAUTH_TOKEN_URL
                ))
            })?;
            return Ok(Credentials::ClientCredentials {
                client_id: client_id.clone(),
                client_secret: client_secret.clone(),
                token_url,
                scope: config.oauth_scope.clone(),
            });
        }

        Err(Error::Configuration(
            "no usable credentials: provide DATABRICKS_TOKEN (PAT) or DATABRICKS_CLIENT_ID and \
             DATABRICKS_CLIENT_SECRET along with DATABRICKS_OAUTH_TOKEN_URL"
                .to_string(),
        ))
    }

    /// Short label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Credentials::PersonalToken { .. } => "personal-access-token",
            Credentials::ClientCredentials { .. } => "oauth-client-credentials",
        }
    }
}

/// Headers produced by [`CredentialStore::resolve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthHeaders {
    pub authorization: String,
}

/// Holds the process credentials and hands out a usable bearer header.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    kind: &'static str,
    provider: Arc<dyn AuthProvider>,
}

impl CredentialStore {
    /// Build the store for the configured flow using the system clock.
    pub fn from_config(config: &DatabricksConfig) -> Result<Self> {
        Self::with_clock(Credentials::from_config(config)?, Arc::new(SystemClock))
    }

    /// Build the store for explicit credentials and clock.
    pub fn with_clock(credentials: Credentials, clock: Arc<dyn Clock>) -> Result<Self> {
        let kind = credentials.kind();
        let provider: Arc<dyn AuthProvider> = match credentials {
            Credentials::PersonalToken { token } => Arc::new(PersonalAccessToken::new(token)),
            Credentials::ClientCredentials {
                client_id,
                client_secret,
                token_url,
                scope,
            } => Arc::new(
                OAuthCredentials::builder(client_id, client_secret, token_url)
                    .scope(scope)
                    .clock(clock)
                    .build()?,
            ),
        };
        debug!("Using {} authentication", kind);
        Ok(Self { kind, provider })
    }

    /// Wrap an existing provider.
    pub fn from_provider(provider: Arc<dyn AuthProvider>) -> Self {
        Self {
            kind: "custom",
            provider,
        }
    }

    /// Which flow is active.
    pub fn kind(&self) -> &'static str {
        self.kind
    }

    /// Resolve the authorization header, refreshing the OAuth token if needed.
    pub async fn resolve(&self) -> Result<AuthHeaders> {
        Ok(AuthHeaders {
            authorization: self.provider.get_auth_header().await?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> DatabricksConfig {
        DatabricksConfig::default()
    }

    #[test]
    fn test_pat_selected_first() {
        let mut cfg = config();
        cfg.pat_token = Some("dapi".to_string());
        cfg.client_id = Some("id".to_string());
        cfg.client_secret = Some("secret".to_string());

        let creds = Credentials::from_config(&cfg).unwrap();
        assert_eq!(
            creds,
            Credentials::PersonalToken {
                token: "dapi".to_string()
            }
        );
    }

    #[test]
    fn test_client_credentials_require_token_url() {
        let mut cfg = config();
        cfg.client_id = Some("id".to_string());
        cfg.client_secret = Some("secret".to_string());

        let err = Credentials::from_config(&cfg).unwrap_err();
        assert!(matches!(err, Error::Configuration(ref m) if m.contains(ENV_OAUTH_TOKEN_URL)));

        cfg.oauth_token_url = Some("https://login.example.com/token".to_string());
        cfg.oauth_scope = Some("all-apis".to_string());
        let creds = Credentials::from_config(&cfg).unwrap();
        assert_eq!(creds.kind(), "oauth-client-credentials");
    }

    #[test]
    fn test_client_id_without_secret_is_not_usable() {
        let mut cfg = config();
        cfg.client_id = Some("id".to_string());
        cfg.oauth_token_url = Some("https://login.example.com/token".to_string());

        let err = Credentials::from_config(&cfg).unwrap_err();
        assert!(matches!(err, Error::Configuration(ref m) if m.contains("no usable credentials")));
    }

    #[test]
    fn test_no_credentials() {
        assert!(matches!(
            Credentials::from_config(&config()),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn test_credentials_debug_redacts() {
        let creds = Credentials::ClientCredentials {
            client_id: "id-123".to_string(),
            client_secret: "secret-456".to_string(),
            token_url: "https://login.example.com/token".to_string(),
            scope: None,
        };
        let rendered = format!("{:?}", creds);
        assert!(!rendered.contains("id-123"));
        assert!(!rendered.contains("secret-456"));
    }

    #[tokio::test]
    async fn test_resolve_pat_is_static() {
        let store = CredentialStore::with_clock(
            Credentials::PersonalToken {
                token: "dapi".to_string(),
            },
            Arc::new(SystemClock),
        )
        .unwrap();

        let first = store.resolve().await.unwrap();
        let second = store.resolve().await.unwrap();
        assert_eq!(first.authorization, "Bearer dapi");
        assert_eq!(first, second);
        assert_eq!(store.kind(), "personal-access-token");
    }
}
