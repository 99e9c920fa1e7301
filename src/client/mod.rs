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

//! Client implementations for communicating with a Databricks workspace.
//!
//! This module provides:
//! - `StatementClient` trait: statement submission, polling and cancellation
//! - `CatalogClient` trait: Unity Catalog listings, table lookup and lineage
//! - `DatabricksHttpClient`: authenticated HTTP gateway shared by both
//! - `SeaClient` / `UnityCatalogClient`: REST implementations of the traits

pub mod http;
pub mod sea;
pub mod unity;

use crate::error::Result;
use crate::types::catalog::{SchemaInfo, TableInfo, TableLineageResponse};
use crate::types::sea::{ExecuteParams, ResultData, StatementExecutionResponse};
use async_trait::async_trait;

pub use http::{ApiRequest, DatabricksHttpClient, HttpClientConfig};
pub use sea::SeaClient;
pub use unity::UnityCatalogClient;

/// Remote side of the statement execution state machine.
#[async_trait]
pub trait StatementClient: Send + Sync + std::fmt::Debug {
    /// Submit a SQL statement to a warehouse.
    async fn execute_statement(
        &self,
        warehouse_id: &str,
        sql: &str,
        params: &ExecuteParams,
    ) -> Result<StatementExecutionResponse>;

    /// Poll statement status.
    async fn get_statement_status(&self, statement_id: &str) -> Result<StatementExecutionResponse>;

    /// Fetch an additional inline result chunk.
    async fn get_result_chunk(&self, statement_id: &str, chunk_index: i64) -> Result<ResultData>;

    /// Cancel a running statement.
    async fn cancel_statement(&self, statement_id: &str) -> Result<()>;
}

/// Remote side of the metadata aggregator.
#[async_trait]
pub trait CatalogClient: Send + Sync + std::fmt::Debug {
    /// All schemas of a catalog (every page).
    async fn list_schemas(&self, catalog: &str) -> Result<Vec<SchemaInfo>>;

    /// All tables of a schema (every page).
    async fn list_tables(&self, catalog: &str, schema: &str) -> Result<Vec<TableInfo>>;

    /// One table by its three-level name.
    async fn get_table(&self, full_name: &str) -> Result<TableInfo>;

    /// Raw upstream/downstream edges of a table.
    async fn get_table_lineage(&self, full_name: &str) -> Result<TableLineageResponse>;
}
