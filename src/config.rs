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

//! Process configuration read from the environment.
//!
//! | Variable | Description |
//! |----------|-------------|
//! | `DATABRICKS_HOST` | Workspace URL |
//! | `DATABRICKS_ACCOUNT_ID` | Account id (informational) |
//! | `DATABRICKS_TOKEN` / `DATABRICKS_PAT` | Personal access token |
//! | `DATABRICKS_CLIENT_ID` | OAuth client id |
//! | `DATABRICKS_CLIENT_SECRET` | OAuth client secret |
//! | `DATABRICKS_OAUTH_TOKEN_URL` | OAuth token endpoint |
//! | `DATABRICKS_OAUTH_SCOPE` | Optional OAuth scope |
//! | `DATABRICKS_SQL_WAREHOUSE_ID` | Warehouse used by `run_query` |
//! | `DATABRICKS_SQL_ROW_LIMIT` | Optional row cap for queries |
//! | `DATABRICKS_SQL_POLL_TIMEOUT_SECS` | Statement deadline (default 600) |
//! | `DATABRICKS_HTTP_TIMEOUT_SECS` | Per-request read timeout (default 60, minimum 55) |
//! | `DATABRICKS_MCP_LOG_LEVEL` | Log level, `OFF` disables logging |
//! | `DATABRICKS_MCP_LOG_FILE` | Log file path (stderr when unset) |

use crate::client::HttpClientConfig;
use crate::error::{Error, Result};
use crate::logging::LogConfig;
use crate::statement::StatementConfig;
use std::time::Duration;

pub const ENV_HOST: &str = "DATABRICKS_HOST";
pub const ENV_ACCOUNT_ID: &str = "DATABRICKS_ACCOUNT_ID";
pub const ENV_TOKEN: &str = "DATABRICKS_TOKEN";
pub const ENV_TOKEN_LEGACY: &str = "DATABRICKS_PAT";
pub const ENV_CLIENT_ID: &str = "DATABRICKS_CLIENT_ID";
pub const ENV_CLIENT_SECRET: &str = "DATABRICKS_CLIENT_SECRET";
pub const ENV_OAUTH_TOKEN_URL: &str = "DATABRICKS_OAUTH_TOKEN_URL";
pub const ENV_OAUTH_SCOPE: &str = "DATABRICKS_OAUTH_SCOPE";
pub const ENV_WAREHOUSE_ID: &str = "DATABRICKS_SQL_WAREHOUSE_ID";
pub const ENV_ROW_LIMIT: &str = "DATABRICKS_SQL_ROW_LIMIT";
pub const ENV_POLL_TIMEOUT_SECS: &str = "DATABRICKS_SQL_POLL_TIMEOUT_SECS";
pub const ENV_HTTP_TIMEOUT_SECS: &str = "DATABRICKS_HTTP_TIMEOUT_SECS";
pub const ENV_LOG_LEVEL: &str = "DATABRICKS_MCP_LOG_LEVEL";
pub const ENV_LOG_FILE: &str = "DATABRICKS_MCP_LOG_FILE";

/// Raw configuration for one process.
///
/// Credential fields are kept verbatim here; choosing between the PAT and
/// client-credentials flows happens in [`crate::auth::Credentials::from_config`].
#[derive(Clone, Default)]
pub struct DatabricksConfig {
    pub host: Option<String>,
    pub account_id: Option<String>,
    pub pat_token: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub oauth_token_url: Option<String>,
    pub oauth_scope: Option<String>,
    pub warehouse_id: Option<String>,
    pub http: HttpClientConfig,
    pub statement: StatementConfig,
    pub log: LogConfig,
}

impl std::fmt::Debug for DatabricksConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabricksConfig")
            .field("host", &self.host)
            .field("account_id", &self.account_id)
            .field("pat_token", &self.pat_token.as_ref().map(|_| "***"))
            .field("client_id", &self.client_id.as_ref().map(|_| "***"))
            .field("client_secret", &self.client_secret.as_ref().map(|_| "***"))
            .field("oauth_token_url", &self.oauth_token_url)
            .field("oauth_scope", &self.oauth_scope)
            .field("warehouse_id", &self.warehouse_id)
            .field("http", &self.http)
            .field("statement", &self.statement)
            .finish()
    }
}

impl DatabricksConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary lookup function.
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let mut config = Self {
            host: get(ENV_HOST),
            account_id: get(ENV_ACCOUNT_ID),
            pat_token: get(ENV_TOKEN).or_else(|| get(ENV_TOKEN_LEGACY)),
            client_id: get(ENV_CLIENT_ID),
            client_secret: get(ENV_CLIENT_SECRET),
            oauth_token_url: get(ENV_OAUTH_TOKEN_URL),
            oauth_scope: get(ENV_OAUTH_SCOPE),
            warehouse_id: get(ENV_WAREHOUSE_ID),
            ..Self::default()
        };

        if let Some(v) = get(ENV_ROW_LIMIT) {
            config.statement.row_limit = Some(parse_number(ENV_ROW_LIMIT, &v)?);
        }
        if let Some(v) = get(ENV_POLL_TIMEOUT_SECS) {
            config.statement.poll_timeout = Duration::from_secs(parse_number(ENV_POLL_TIMEOUT_SECS, &v)?);
        }
        if let Some(v) = get(ENV_HTTP_TIMEOUT_SECS) {
            config.http.read_timeout = Duration::from_secs(parse_number(ENV_HTTP_TIMEOUT_SECS, &v)?);
        }
        config.http.validate()?;

        config.log = LogConfig {
            level: get(ENV_LOG_LEVEL),
            file: get(ENV_LOG_FILE),
        };

        Ok(config)
    }

    /// Returns the configured warehouse ID or a configuration error.
    pub fn require_warehouse_id(&self) -> Result<&str> {
        self.warehouse_id.as_deref().ok_or_else(|| {
            Error::Configuration(format!("{} is not configured", ENV_WAREHOUSE_ID))
        })
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::Configuration(format!("{} must be a number, got '{}'", key, value)))
}
