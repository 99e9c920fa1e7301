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

//! SQL statement execution against a warehouse.
//!
//! A statement is submitted once, then polled until it reaches a terminal
//! state or the configured deadline passes. Successful results are
//! materialized into a [`ResultSet`] of JSON rows keyed by column name.

use crate::client::StatementClient;
use crate::error::{Error, Result};
use crate::types::sea::{
    ExecuteParams, ResultData, ResultManifest, StatementExecutionResponse, StatementState,
};
use serde::Serialize;
use serde_json::{Map, Value};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep_until, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// One result row: column name to JSON value.
pub type Row = Map<String, Value>;

/// Polling and submission settings.
#[derive(Debug, Clone)]
pub struct StatementConfig {
    /// First delay between status polls.
    pub poll_interval: Duration,
    /// Upper bound for the doubling poll delay.
    pub max_poll_interval: Duration,
    /// Overall budget for submit, polling and result fetches.
    pub poll_timeout: Duration,
    /// Server-side row cap sent with every submission.
    pub row_limit: Option<i64>,
}

impl Default for StatementConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(500),
            max_poll_interval: Duration::from_secs(5),
            poll_timeout: Duration::from_secs(600), // 10 minutes default
            row_limit: None,
        }
    }
}

/// Client-side view of a submitted statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementHandle {
    statement_id: String,
    state: StatementState,
}

impl StatementHandle {
    pub fn new(statement_id: impl Into<String>, state: StatementState) -> Self {
        Self {
            statement_id: statement_id.into(),
            state,
        }
    }

    pub fn statement_id(&self) -> &str {
        &self.statement_id
    }

    pub fn state(&self) -> StatementState {
        self.state
    }

    /// Apply a polled state. Returns `false` and keeps the current state when
    /// the observation would move the handle backwards or out of a terminal
    /// state.
    pub fn advance(&mut self, observed: StatementState) -> bool {
        if self.state.is_terminal() || observed.rank() < self.state.rank() {
            return false;
        }
        self.state = observed;
        true
    }
}

/// Materialized rows of a successful statement.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResultSet {
    pub column_names: Vec<String>,
    pub rows: Vec<Row>,
    /// The server dropped rows beyond the configured row limit.
    pub truncated: bool,
}

impl ResultSet {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn into_rows(self) -> Vec<Row> {
        self.rows
    }

    /// Append positional rows. Short rows are padded with `null` and
    /// surplus values are dropped.
    fn extend_from(&mut self, data_array: Vec<Vec<Value>>) {
        for values in data_array {
            let mut values = values.into_iter();
            let row: Row = self
                .column_names
                .iter()
                .map(|name| (name.clone(), values.next().unwrap_or(Value::Null)))
                .collect();
            self.rows.push(row);
        }
    }
}

/// Deadline and cancel signal shared by every step of one execution.
#[derive(Debug)]
struct Budget {
    start: Instant,
    deadline: Instant,
    cancel: CancellationToken,
}

impl Budget {
    fn new(timeout: Duration, cancel: CancellationToken) -> Self {
        let start = Instant::now();
        Self {
            start,
            deadline: start + timeout,
            cancel,
        }
    }
}

/// Drives statements through submit, poll and fetch.
#[derive(Debug, Clone)]
pub struct StatementExecutor {
    client: Arc<dyn StatementClient>,
    config: StatementConfig,
}

impl StatementExecutor {
    pub fn new(client: Arc<dyn StatementClient>, config: StatementConfig) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &StatementConfig {
        &self.config
    }

    /// Execute `sql` on the given warehouse and wait for its rows.
    pub async fn execute(&self, sql: &str, warehouse_id: &str) -> Result<ResultSet> {
        self.execute_with_cancel(sql, warehouse_id, CancellationToken::new())
            .await
    }

    /// Like [`execute`](Self::execute), but gives up as soon as `cancel` fires.
    pub async fn execute_with_cancel(
        &self,
        sql: &str,
        warehouse_id: &str,
        cancel: CancellationToken,
    ) -> Result<ResultSet> {
        let budget = Budget::new(self.config.poll_timeout, cancel);
        let params = ExecuteParams {
            row_limit: self.config.row_limit,
        };

        let response = self
            .bounded(
                None,
                &budget,
                self.client.execute_statement(warehouse_id, sql, &params),
            )
            .await?;
        let (handle, response) = self.wait_for_completion(response, &budget).await?;
        self.finish(&handle, response, &budget).await
    }

    /// Poll until terminal, honouring the deadline and the cancel token.
    async fn wait_for_completion(
        &self,
        response: StatementExecutionResponse,
        budget: &Budget,
    ) -> Result<(StatementHandle, StatementExecutionResponse)> {
        let mut handle = StatementHandle::new(&response.statement_id, response.status.state);
        let mut current_response = response;
        let mut interval = self.config.poll_interval;

        while !handle.state().is_terminal() {
            let now = Instant::now();
            if now >= budget.deadline {
                return Err(self.timed_out(Some(handle.statement_id()), budget).await);
            }

            let wake = (now + interval).min(budget.deadline);
            self.bounded(Some(handle.statement_id()), budget, async {
                sleep_until(wake).await;
                Ok(())
            })
            .await?;

            debug!("Polling statement status: {}", handle.statement_id());
            let polled = self
                .bounded(
                    Some(handle.statement_id()),
                    budget,
                    self.client.get_statement_status(handle.statement_id()),
                )
                .await?;
            if handle.advance(polled.status.state) {
                current_response = polled;
            } else {
                debug!(
                    "Ignoring state {} for statement {} in state {}",
                    polled.status.state,
                    handle.statement_id(),
                    handle.state()
                );
            }

            interval = (interval * 2).min(self.config.max_poll_interval);
        }

        Ok((handle, current_response))
    }

    /// Run one step against the deadline and the cancel token. The statement
    /// is cancelled server-side when either wins and its id is known.
    async fn bounded<T, F>(
        &self,
        statement_id: Option<&str>,
        budget: &Budget,
        step: F,
    ) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        tokio::select! {
            biased;
            result = step => result,
            _ = budget.cancel.cancelled() => {
                let id = statement_id.unwrap_or_default();
                info!("Statement {} cancelled by caller", id);
                if let Some(id) = statement_id {
                    self.cancel_quietly(id).await;
                }
                Err(Error::Cancelled(id.to_string()))
            }
            _ = sleep_until(budget.deadline) => Err(self.timed_out(statement_id, budget).await),
        }
    }

    async fn timed_out(&self, statement_id: Option<&str>, budget: &Budget) -> Error {
        let elapsed = budget.start.elapsed();
        match statement_id {
            Some(id) => {
                warn!("Statement {} not finished after {:?}, cancelling", id, elapsed);
                self.cancel_quietly(id).await;
            }
            None => warn!("Statement submission did not return within {:?}", elapsed),
        }
        Error::Timeout {
            statement_id: statement_id.unwrap_or_default().to_string(),
            elapsed,
        }
    }

    async fn finish(
        &self,
        handle: &StatementHandle,
        response: StatementExecutionResponse,
        budget: &Budget,
    ) -> Result<ResultSet> {
        let state = handle.state();
        let service_error = response.status.error;
        match state {
            StatementState::Succeeded => {
                self.materialize(
                    handle.statement_id(),
                    response.manifest,
                    response.result,
                    budget,
                )
                .await
            }
            StatementState::Closed if response.result.is_some() => {
                self.materialize(
                    handle.statement_id(),
                    response.manifest,
                    response.result,
                    budget,
                )
                .await
            }
            StatementState::Closed => Err(Error::Query {
                state,
                code: "CLOSED".to_string(),
                message: "Statement was closed before results were fetched".to_string(),
            }),
            StatementState::Canceled => Err(Error::Query {
                state,
                code: "CANCELED".to_string(),
                message: service_error
                    .and_then(|e| e.message)
                    .unwrap_or_else(|| "Statement was canceled".to_string()),
            }),
            _ => {
                let (code, message) = service_error
                    .map(|e| (e.error_code, e.message))
                    .unwrap_or_default();
                Err(Error::Query {
                    state,
                    code: code.unwrap_or_else(|| "UNKNOWN".to_string()),
                    message: message.unwrap_or_else(|| "Unknown error".to_string()),
                })
            }
        }
    }

    /// Zip rows with the manifest columns, following extra inline chunks.
    async fn materialize(
        &self,
        statement_id: &str,
        manifest: Option<ResultManifest>,
        result: Option<ResultData>,
        budget: &Budget,
    ) -> Result<ResultSet> {
        let manifest = manifest.unwrap_or_default();
        let mut result_set = ResultSet {
            column_names: manifest.column_names(),
            rows: Vec::new(),
            truncated: manifest.truncated,
        };

        let mut next_chunk = None;
        if let Some(data) = result {
            next_chunk = data.next_chunk_index;
            result_set.extend_from(data.data_array.unwrap_or_default());
        }

        while let Some(chunk_index) = next_chunk {
            debug!("Fetching chunk {} of statement {}", chunk_index, statement_id);
            let chunk = self
                .bounded(
                    Some(statement_id),
                    budget,
                    self.client.get_result_chunk(statement_id, chunk_index),
                )
                .await?;
            next_chunk = chunk.next_chunk_index.filter(|next| *next > chunk_index);
            result_set.extend_from(chunk.data_array.unwrap_or_default());
        }

        if result_set.truncated {
            warn!(
                "Statement {} result truncated to {} rows by the row limit",
                statement_id,
                result_set.len()
            );
        }
        debug!(
            "Statement {} produced {} rows",
            statement_id,
            result_set.len()
        );
        Ok(result_set)
    }

    async fn cancel_quietly(&self, statement_id: &str) {
        if let Err(e) = self.client.cancel_statement(statement_id).await {
            warn!("Failed to cancel statement {}: {}", statement_id, e);
        }
    }
}
