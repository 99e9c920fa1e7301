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

//! SEA (Statement Execution API) client implementation.
//!
//! This module implements the `StatementClient` trait using the Databricks
//! SQL Statement Execution API (REST-based).

use crate::client::{ApiRequest, DatabricksHttpClient, StatementClient};
use crate::error::Result;
use crate::types::sea::{
    ExecuteParams, ExecuteStatementRequest, ResultData, StatementExecutionResponse,
};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

const SQL_API_BASE: &str = "/api/2.0/sql";

/// SEA client for the Databricks SQL Statement Execution API.
#[derive(Debug, Clone)]
pub struct SeaClient {
    http_client: Arc<DatabricksHttpClient>,
}

impl SeaClient {
    /// Create a new SEA client.
    pub fn new(http_client: Arc<DatabricksHttpClient>) -> Self {
        Self { http_client }
    }

    fn statements_path() -> String {
        format!("{}/statements", SQL_API_BASE)
    }

    fn statement_path(statement_id: &str) -> String {
        format!("{}/statements/{}", SQL_API_BASE, statement_id)
    }
}

#[async_trait]
impl StatementClient for SeaClient {
    async fn execute_statement(
        &self,
        warehouse_id: &str,
        sql: &str,
        params: &ExecuteParams,
    ) -> Result<StatementExecutionResponse> {
        let request_body = ExecuteStatementRequest::new(sql, warehouse_id, params);

        debug!("Executing statement on warehouse {}: {}", warehouse_id, sql);

        let response: StatementExecutionResponse = self
            .http_client
            .call_json(ApiRequest::post(Self::statements_path()).json(serde_json::to_value(
                &request_body,
            )?))
            .await?;

        debug!(
            "Execute response: statement_id={}, status={:?}",
            response.statement_id, response.status.state
        );

        Ok(response)
    }

    async fn get_statement_status(&self, statement_id: &str) -> Result<StatementExecutionResponse> {
        let response: StatementExecutionResponse = self
            .http_client
            .call_json(ApiRequest::get(Self::statement_path(statement_id)))
            .await?;

        debug!(
            "Status response: statement_id={}, status={:?}",
            response.statement_id, response.status.state
        );

        Ok(response)
    }

    async fn get_result_chunk(&self, statement_id: &str, chunk_index: i64) -> Result<ResultData> {
        // The chunk_index is a path parameter, not a query parameter
        let path = format!(
            "{}/result/chunks/{}",
            Self::statement_path(statement_id),
            chunk_index
        );

        debug!("Getting result chunk {} of {}", chunk_index, statement_id);

        self.http_client.call_json(ApiRequest::get(path)).await
    }

    async fn cancel_statement(&self, statement_id: &str) -> Result<()> {
        let path = format!("{}/cancel", Self::statement_path(statement_id));

        debug!("Canceling statement {}", statement_id);

        self.http_client.send(ApiRequest::post(path)).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{CredentialStore, PersonalAccessToken};
    use crate::client::HttpClientConfig;
    use crate::types::sea::StatementState;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn create_test_client(host: &str) -> SeaClient {
        let credentials =
            CredentialStore::from_provider(Arc::new(PersonalAccessToken::new("test-token")));
        let http_client = Arc::new(
            DatabricksHttpClient::new(HttpClientConfig::default(), Some(host), credentials)
                .unwrap(),
        );
        SeaClient::new(http_client)
    }

    #[test]
    fn test_paths() {
        assert_eq!(SeaClient::statements_path(), "/api/2.0/sql/statements");
        assert_eq!(
            SeaClient::statement_path("stmt-1"),
            "/api/2.0/sql/statements/stmt-1"
        );
    }

    #[tokio::test]
    async fn test_execute_statement_posts_request_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/2.0/sql/statements"))
            .and(body_partial_json(json!({
                "statement": "SELECT 1",
                "warehouse_id": "wh1",
                "wait_timeout": "50s",
                "format": "JSON_ARRAY"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "statement_id": "stmt-1",
                "status": {"state": "PENDING"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = create_test_client(&server.uri());
        let response = client
            .execute_statement("wh1", "SELECT 1", &ExecuteParams::default())
            .await
            .unwrap();
        assert_eq!(response.statement_id, "stmt-1");
        assert_eq!(response.status.state, StatementState::Pending);
    }

    #[tokio::test]
    async fn test_get_result_chunk() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/2.0/sql/statements/stmt-1/result/chunks/1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "chunk_index": 1,
                "row_offset": 2,
                "row_count": 1,
                "data_array": [["3", "c"]]
            })))
            .mount(&server)
            .await;

        let client = create_test_client(&server.uri());
        let chunk = client.get_result_chunk("stmt-1", 1).await.unwrap();
        assert_eq!(chunk.data_array.unwrap(), vec![vec![json!("3"), json!("c")]]);
        assert!(chunk.next_chunk_index.is_none());
    }

    #[tokio::test]
    async fn test_cancel_statement() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/2.0/sql/statements/stmt-1/cancel"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let client = create_test_client(&server.uri());
        client.cancel_statement("stmt-1").await.unwrap();
    }
}
