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

//! SEA (Statement Execution API) request/response types.
//!
//! These types map directly to the JSON structures used by the Databricks
//! SQL Statement Execution API with `JSON_ARRAY` / `INLINE` results.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::time::Duration;

/// Server-side wait hint sent with every submission. HTTP read timeouts
/// must stay above it.
pub const SUBMIT_WAIT_TIMEOUT: Duration = Duration::from_secs(50);
/// Row-oriented JSON output.
pub const FORMAT_JSON_ARRAY: &str = "JSON_ARRAY";
/// Results travel inside the response body.
pub const DISPOSITION_INLINE: &str = "INLINE";
/// Keep the statement running when the wait hint elapses.
pub const ON_WAIT_TIMEOUT_CONTINUE: &str = "CONTINUE";

/// Response from statement execution or status polling.
#[derive(Debug, Clone, Deserialize)]
pub struct StatementExecutionResponse {
    pub statement_id: String,
    pub status: StatementStatus,
    #[serde(default)]
    pub manifest: Option<ResultManifest>,
    #[serde(default)]
    pub result: Option<ResultData>,
}

/// Status of a statement execution.
#[derive(Debug, Clone, Deserialize)]
pub struct StatementStatus {
    pub state: StatementState,
    #[serde(default)]
    pub error: Option<ServiceError>,
}

/// Possible states of a statement during execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatementState {
    Pending,
    Running,
    Succeeded,
    Failed,
    Canceled,
    Closed,
}

impl StatementState {
    /// No further transition happens from a terminal state.
    pub fn is_terminal(self) -> bool {
        !matches!(self, StatementState::Pending | StatementState::Running)
    }

    /// Wire name, e.g. `SUCCEEDED`.
    pub fn as_str(self) -> &'static str {
        match self {
            StatementState::Pending => "PENDING",
            StatementState::Running => "RUNNING",
            StatementState::Succeeded => "SUCCEEDED",
            StatementState::Failed => "FAILED",
            StatementState::Canceled => "CANCELED",
            StatementState::Closed => "CLOSED",
        }
    }

    /// Position in the lifecycle; used to keep handles monotonic.
    pub(crate) fn rank(self) -> u8 {
        match self {
            StatementState::Pending => 0,
            StatementState::Running => 1,
            _ => 2,
        }
    }
}

impl fmt::Display for StatementState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error information from the service.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceError {
    #[serde(default)]
    pub error_code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Manifest describing the result set structure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResultManifest {
    #[serde(default)]
    pub schema: Option<ResultSchema>,
    /// Set when `row_limit` cut the result short.
    #[serde(default)]
    pub truncated: bool,
}

impl ResultManifest {
    /// Column names in declared order.
    pub fn column_names(&self) -> Vec<String> {
        let mut columns: Vec<&ColumnInfo> = self
            .schema
            .as_ref()
            .map(|s| s.columns.iter().collect())
            .unwrap_or_default();
        columns.sort_by_key(|c| c.position.unwrap_or(i32::MAX));
        columns.into_iter().map(|c| c.name.clone()).collect()
    }
}

/// Schema of the result set.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResultSchema {
    #[serde(default)]
    pub columns: Vec<ColumnInfo>,
}

/// Information about a single column in the result.
#[derive(Debug, Clone, Deserialize)]
pub struct ColumnInfo {
    pub name: String,
    #[serde(default)]
    pub position: Option<i32>,
}

/// Result data from the initial response or a chunk fetch.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResultData {
    #[serde(default)]
    pub next_chunk_index: Option<i64>,
    /// Rows as positional JSON values (strings or null for `JSON_ARRAY`).
    #[serde(default)]
    pub data_array: Option<Vec<Vec<Value>>>,
}

/// Request body for statement execution.
#[derive(Debug, Clone, Serialize)]
pub struct ExecuteStatementRequest {
    pub warehouse_id: String,
    pub statement: String,
    pub disposition: String,
    pub format: String,
    pub wait_timeout: String,
    pub on_wait_timeout: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row_limit: Option<i64>,
}

impl ExecuteStatementRequest {
    /// Build the request body from SQL text and execution parameters.
    pub fn new(sql: &str, warehouse_id: &str, params: &ExecuteParams) -> Self {
        Self {
            warehouse_id: warehouse_id.to_string(),
            statement: sql.to_string(),
            disposition: DISPOSITION_INLINE.to_string(),
            format: FORMAT_JSON_ARRAY.to_string(),
            wait_timeout: format!("{}s", SUBMIT_WAIT_TIMEOUT.as_secs()),
            on_wait_timeout: ON_WAIT_TIMEOUT_CONTINUE.to_string(),
            row_limit: params.row_limit,
        }
    }
}

/// Parameters for statement execution (passed to client methods).
#[derive(Debug, Clone, Default)]
pub struct ExecuteParams {
    pub row_limit: Option<i64>,
}
