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

//! Unity Catalog REST client.
//!
//! Implements [`CatalogClient`] on top of the Unity Catalog (`/api/2.1`) and
//! lineage-tracking (`/api/2.0`) endpoints. List calls follow
//! `next_page_token` until the server stops returning one.

use crate::client::{ApiRequest, CatalogClient, DatabricksHttpClient};
use crate::error::{Error, Result};
use crate::types::catalog::{
    ListSchemasResponse, ListTablesResponse, SchemaInfo, TableInfo, TableLineageResponse,
};
use async_trait::async_trait;
use reqwest::Url;
use std::sync::Arc;
use tracing::debug;

const UNITY_CATALOG_BASE: &str = "/api/2.1/unity-catalog";
const TABLE_LINEAGE_PATH: &str = "/api/2.0/lineage-tracking/table-lineage/";

/// Unity Catalog client.
#[derive(Debug, Clone)]
pub struct UnityCatalogClient {
    http_client: Arc<DatabricksHttpClient>,
}

impl UnityCatalogClient {
    pub fn new(http_client: Arc<DatabricksHttpClient>) -> Self {
        Self { http_client }
    }

    /// Path of one table, with the full name as a single encoded segment.
    fn table_path(&self, full_name: &str) -> Result<String> {
        let base = self
            .http_client
            .url(&format!("{}/tables", UNITY_CATALOG_BASE))?;
        let mut url = Url::parse(&base)
            .map_err(|e| Error::Configuration(format!("invalid workspace URL {}: {}", base, e)))?;
        url.path_segments_mut()
            .map_err(|_| Error::Configuration(format!("invalid workspace URL {}", base)))?
            .push(full_name);
        Ok(url.path().to_string())
    }
}

#[async_trait]
impl CatalogClient for UnityCatalogClient {
    async fn list_schemas(&self, catalog: &str) -> Result<Vec<SchemaInfo>> {
        let mut schemas = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = ApiRequest::get(format!("{}/schemas", UNITY_CATALOG_BASE))
                .query("catalog_name", catalog);
            if let Some(token) = page_token.take() {
                request = request.query("page_token", token);
            }

            let page: ListSchemasResponse = self.http_client.call_json(request).await?;
            schemas.extend(page.schemas);

            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        debug!("Listed {} schemas in {}", schemas.len(), catalog);
        Ok(schemas)
    }

    async fn list_tables(&self, catalog: &str, schema: &str) -> Result<Vec<TableInfo>> {
        let mut tables = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = ApiRequest::get(format!("{}/tables", UNITY_CATALOG_BASE))
                .query("catalog_name", catalog)
                .query("schema_name", schema);
            if let Some(token) = page_token.take() {
                request = request.query("page_token", token);
            }

            let page: ListTablesResponse = self.http_client.call_json(request).await?;
            tables.extend(page.tables);

            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        debug!("Listed {} tables in {}.{}", tables.len(), catalog, schema);
        Ok(tables)
    }

    async fn get_table(&self, full_name: &str) -> Result<TableInfo> {
        debug!("Getting table {}", full_name);
        self.http_client
            .call_json(ApiRequest::get(self.table_path(full_name)?))
            .await
    }

    async fn get_table_lineage(&self, full_name: &str) -> Result<TableLineageResponse> {
        debug!("Getting lineage of {}", full_name);
        let request = ApiRequest::get(TABLE_LINEAGE_PATH)
            .query("table_name", full_name)
            .query("include_entity_lineage", "true");
        self.http_client.call_json(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{CredentialStore, PersonalAccessToken};
    use crate::client::HttpClientConfig;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param, query_param_is_missing};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn create_test_client(host: &str) -> UnityCatalogClient {
        let credentials =
            CredentialStore::from_provider(Arc::new(PersonalAccessToken::new("test-token")));
        let http_client = Arc::new(
            DatabricksHttpClient::new(HttpClientConfig::default(), Some(host), credentials)
                .unwrap(),
        );
        UnityCatalogClient::new(http_client)
    }

    #[test]
    fn test_table_path_encodes_full_name() {
        let client = create_test_client("https://test.databricks.com");
        assert_eq!(
            client.table_path("main.sales.orders").unwrap(),
            "/api/2.1/unity-catalog/tables/main.sales.orders"
        );
        assert_eq!(
            client.table_path("main.my schema.t/1").unwrap(),
            "/api/2.1/unity-catalog/tables/main.my%20schema.t%2F1"
        );
    }

    #[tokio::test]
    async fn test_list_tables_follows_page_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/2.1/unity-catalog/tables"))
            .and(query_param("catalog_name", "main"))
            .and(query_param("schema_name", "sales"))
            .and(query_param_is_missing("page_token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "tables": [{"name": "orders"}],
                "next_page_token": "page-2"
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/2.1/unity-catalog/tables"))
            .and(query_param("page_token", "page-2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "tables": [{"name": "customers"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = create_test_client(&server.uri());
        let tables = client.list_tables("main", "sales").await.unwrap();
        let names: Vec<_> = tables.iter().filter_map(|t| t.name.as_deref()).collect();
        assert_eq!(names, vec!["orders", "customers"]);
    }

    #[tokio::test]
    async fn test_list_schemas_empty_catalog() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/2.1/unity-catalog/schemas"))
            .and(query_param("catalog_name", "empty"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&server)
            .await;

        let client = create_test_client(&server.uri());
        assert!(client.list_schemas("empty").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_get_table_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/2.1/unity-catalog/tables/main.sales.missing"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "error_code": "TABLE_DOES_NOT_EXIST",
                "message": "Table 'main.sales.missing' does not exist."
            })))
            .mount(&server)
            .await;

        let client = create_test_client(&server.uri());
        let err = client.get_table("main.sales.missing").await.unwrap_err();
        assert!(err.is_not_found());
        assert!(matches!(err, Error::Http { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_get_table_lineage_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/2.0/lineage-tracking/table-lineage/"))
            .and(query_param("table_name", "main.sales.orders"))
            .and(query_param("include_entity_lineage", "true"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "upstreams": [{"tableInfo": {"name": "raw", "catalog_name": "main", "schema_name": "bronze"}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = create_test_client(&server.uri());
        let lineage = client.get_table_lineage("main.sales.orders").await.unwrap();
        assert_eq!(lineage.upstreams.unwrap().len(), 1);
        assert!(lineage.downstreams.is_none());
    }
}
