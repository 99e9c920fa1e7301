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

//! Process-wide wiring of credentials, clients and tools.

use crate::auth::CredentialStore;
use crate::client::{
    CatalogClient, DatabricksHttpClient, SeaClient, StatementClient, UnityCatalogClient,
};
use crate::config::DatabricksConfig;
use crate::error::Result;
use crate::logging::init_logging;
use crate::metadata::MetadataAggregator;
use crate::statement::StatementExecutor;
use crate::tools::DatabricksTools;
use std::sync::Arc;
use tracing::{debug, warn};

/// Owns everything a tool call needs. Build once, share by reference.
#[derive(Debug, Clone)]
pub struct ToolContext {
    config: DatabricksConfig,
    http_client: Arc<DatabricksHttpClient>,
    tools: DatabricksTools,
}

impl ToolContext {
    /// Read the environment, initialize logging and build the context.
    pub fn from_env() -> Result<Self> {
        Self::from_config(DatabricksConfig::from_env()?)
    }

    pub fn from_config(config: DatabricksConfig) -> Result<Self> {
        init_logging(&config.log);
        let credentials = CredentialStore::from_config(&config)?;
        Self::with_credentials(config, credentials)
    }

    /// Build the context around an existing credential store.
    pub fn with_credentials(config: DatabricksConfig, credentials: CredentialStore) -> Result<Self> {
        config.http.validate()?;
        if config.host.is_none() {
            warn!("DATABRICKS_HOST is not set; every remote call will fail");
        }
        debug!(
            "Creating tool context for {:?} with {} authentication",
            config.host,
            credentials.kind()
        );

        let http_client = Arc::new(DatabricksHttpClient::new(
            config.http.clone(),
            config.host.as_deref(),
            credentials,
        )?);

        let statements: Arc<dyn StatementClient> = Arc::new(SeaClient::new(http_client.clone()));
        let catalog: Arc<dyn CatalogClient> =
            Arc::new(UnityCatalogClient::new(http_client.clone()));

        let tools = DatabricksTools::new(
            MetadataAggregator::new(catalog),
            StatementExecutor::new(statements, config.statement.clone()),
            config.warehouse_id.clone(),
        );

        Ok(Self {
            config,
            http_client,
            tools,
        })
    }

    pub fn config(&self) -> &DatabricksConfig {
        &self.config
    }

    pub fn http_client(&self) -> &Arc<DatabricksHttpClient> {
        &self.http_client
    }

    pub fn tools(&self) -> &DatabricksTools {
        &self.tools
    }
}
