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

//! Agent-facing tool callables.
//!
//! Every entry point catches its errors: the text tools answer with a
//! Markdown error block and `run_query` answers with a failed
//! [`QueryOutcome`]. Nothing here returns `Err`.

use crate::error::{Error, Result};
use crate::metadata::render::{
    render_error, render_schema_list, render_table_details, render_table_list,
};
use crate::metadata::MetadataAggregator;
use crate::statement::{ResultSet, Row, StatementExecutor};
use crate::types::sea::StatementState;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Structured result of `run_query`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryOutcome {
    pub state: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<Row>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl QueryOutcome {
    fn succeeded(result: ResultSet) -> Self {
        Self {
            state: StatementState::Succeeded.to_string(),
            data: Some(result.into_rows()),
            error: None,
        }
    }

    fn failed(err: &Error) -> Self {
        let state = match err {
            Error::Query { state, .. } => *state,
            _ => StatementState::Failed,
        };
        Self {
            state: state.to_string(),
            data: None,
            error: Some(err.to_string()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// The four catalog and warehouse tools.
#[derive(Debug, Clone)]
pub struct DatabricksTools {
    metadata: MetadataAggregator,
    executor: StatementExecutor,
    warehouse_id: Option<String>,
}

impl DatabricksTools {
    pub fn new(
        metadata: MetadataAggregator,
        executor: StatementExecutor,
        warehouse_id: Option<String>,
    ) -> Self {
        Self {
            metadata,
            executor,
            warehouse_id,
        }
    }

    /// Schemas of a catalog as Markdown.
    pub async fn list_schemas(&self, catalog: &str) -> String {
        info!("fetching list of schemas in catalog: {}", catalog);
        match self.metadata.describe_schema(catalog).await {
            Ok(schemas) => render_schema_list(catalog, &schemas),
            Err(e) => tool_error("Could not retrieve list of schemas", e),
        }
    }

    /// Table names of a schema as Markdown.
    pub async fn list_tables(&self, catalog: &str, schema: &str) -> String {
        info!("fetching list of tables in schema: {}.{}", catalog, schema);
        match self.metadata.list_tables(catalog, schema).await {
            Ok(tables) => render_table_list(catalog, schema, &tables),
            Err(e) => tool_error("Could not retrieve list of tables", e),
        }
    }

    /// Columns, constraints and lineage of each named table as Markdown.
    ///
    /// Per-table failures are rendered inline; this never returns the
    /// tool error block.
    pub async fn describe_tables<S: AsRef<str>>(&self, names: &[S]) -> String {
        info!("fetching metadata for {} tables", names.len());
        let described = self.metadata.describe_tables(names).await;
        render_table_details(&described)
    }

    /// Run SQL on the configured warehouse.
    pub async fn run_query(&self, sql: &str) -> QueryOutcome {
        self.run_query_with_cancel(sql, CancellationToken::new())
            .await
    }

    pub async fn run_query_with_cancel(&self, sql: &str, cancel: CancellationToken) -> QueryOutcome {
        match self.execute(sql, cancel).await {
            Ok(result) => {
                info!("statement returned {} rows", result.len());
                QueryOutcome::succeeded(result)
            }
            Err(e) => {
                error!("statement failed: {}", e);
                QueryOutcome::failed(&e)
            }
        }
    }

    async fn execute(&self, sql: &str, cancel: CancellationToken) -> Result<ResultSet> {
        let warehouse_id = self.warehouse_id.as_deref().ok_or_else(|| {
            Error::Configuration(format!(
                "{} is not configured",
                crate::config::ENV_WAREHOUSE_ID
            ))
        })?;
        self.executor
            .execute_with_cancel(sql, warehouse_id, cancel)
            .await
    }
}

fn tool_error(title: &str, err: Error) -> String {
    error!("{}: {}", title, err);
    render_error(title, err)
}
