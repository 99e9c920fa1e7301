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

//! Integration tests for the tool surface against a real workspace.
//!
//! ## Setup Requirements
//!
//! These tests read the same environment as production:
//! - `DATABRICKS_HOST`: The workspace URL (e.g., "https://example.databricks.com")
//! - `DATABRICKS_TOKEN`, or `DATABRICKS_CLIENT_ID` / `DATABRICKS_CLIENT_SECRET` /
//!   `DATABRICKS_OAUTH_TOKEN_URL`
//! - `DATABRICKS_SQL_WAREHOUSE_ID`: Needed by the query test
//!
//! Optionally, you can specify a test catalog and schema:
//! - `DATABRICKS_TEST_CATALOG`: The catalog to use for tests (default: "main")
//! - `DATABRICKS_TEST_SCHEMA`: The schema to use for tests (default: "default")
//!
//! ## Running Tests
//!
//! These tests are marked with `#[ignore]` to prevent them from running in CI
//! without proper credentials. To run them locally:
//!
//! ```bash
//! export DATABRICKS_HOST="https://your-workspace.databricks.com"
//! export DATABRICKS_TOKEN="your-pat-token"
//! export DATABRICKS_SQL_WAREHOUSE_ID="your-warehouse-id"
//!
//! cargo test --test metadata_tests -- --ignored --nocapture
//! ```

use databricks_mcp::ToolContext;
use std::env;

/// Helper struct for test configuration.
struct TestConfig {
    catalog: String,
    schema: String,
}

impl TestConfig {
    fn from_env() -> Self {
        Self {
            catalog: env::var("DATABRICKS_TEST_CATALOG").unwrap_or_else(|_| "main".to_string()),
            schema: env::var("DATABRICKS_TEST_SCHEMA").unwrap_or_else(|_| "default".to_string()),
        }
    }
}

fn create_test_context() -> ToolContext {
    ToolContext::from_env().expect("Failed to build tool context from the environment")
}

#[tokio::test]
#[ignore]
async fn test_list_schemas() {
    let config = TestConfig::from_env();
    let output = create_test_context()
        .tools()
        .list_schemas(&config.catalog)
        .await;
    println!("{}", output);

    assert!(
        output.starts_with(&format!("# List of schemas in `{}`", config.catalog)),
        "unexpected output: {}",
        output
    );
    assert!(output.contains(&format!("`{}`", config.schema)));
}

#[tokio::test]
#[ignore]
async fn test_list_and_describe_tables() {
    let config = TestConfig::from_env();
    let context = create_test_context();

    let tables = context
        .tools()
        .list_tables(&config.catalog, &config.schema)
        .await;
    println!("{}", tables);
    assert!(!tables.starts_with("**Error**"), "listing failed: {}", tables);

    // Describe the first listed table, if the schema has any.
    let Some(names) = tables.lines().last().filter(|l| !l.is_empty() && !l.starts_with('*')) else {
        return;
    };
    let first = names.split(", ").next().unwrap_or_default();
    let full_name = format!("{}.{}.{}", config.catalog, config.schema, first);

    let described = context.tools().describe_tables(&[full_name.as_str()]).await;
    println!("{}", described);
    assert!(described.starts_with("# Table Information"));
    assert!(described.contains(&format!("**Name:** `{}`", full_name)));
}

#[tokio::test]
#[ignore]
async fn test_run_query() {
    let outcome = create_test_context()
        .tools()
        .run_query("SELECT 1 AS one, 'a' AS letter")
        .await;
    println!("{:?}", outcome);

    assert_eq!(outcome.state, "SUCCEEDED");
    let data = outcome.data.expect("Should have data");
    assert_eq!(data.len(), 1);
    assert!(data[0].contains_key("one"));
    assert!(data[0].contains_key("letter"));
}
