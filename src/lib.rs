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

//! Databricks catalog and SQL warehouse tools for LLM agents.
//!
//! This crate turns Unity Catalog metadata and SQL warehouse results into
//! text an agent can read.
//!
//! ## Overview
//!
//! - [`ToolContext`] - Built once from the environment; owns every client
//! - [`DatabricksTools`] - The four tool callables
//! - [`StatementExecutor`] - Submit, poll and materialize SQL statements
//! - [`MetadataAggregator`] - Schema/table listings, descriptions and lineage
//! - [`CredentialStore`] - Personal access token or OAuth client credentials
//!
//! ## Example
//!
//! ```ignore
//! use databricks_mcp::ToolContext;
//!
//! let context = ToolContext::from_env()?;
//! let tools = context.tools();
//!
//! println!("{}", tools.list_tables("main", "sales").await);
//! println!("{}", tools.describe_tables(&["main.sales.orders"]).await);
//!
//! let outcome = tools.run_query("SELECT id, name FROM main.sales.customers").await;
//! println!("{}", serde_json::to_string(&outcome)?);
//! ```
//!
//! ## Configuration
//!
//! See [`config`] for the environment variables read by
//! [`DatabricksConfig::from_env`].

pub mod auth;
pub mod client;
pub mod config;
pub mod context;
pub mod error;
pub mod logging;
pub mod metadata;
pub mod statement;
pub mod tools;
pub mod types;

// Re-export main types
pub use auth::{CredentialStore, Credentials};
pub use config::DatabricksConfig;
pub use context::ToolContext;
pub use error::{Error, Result};
pub use metadata::MetadataAggregator;
pub use statement::{ResultSet, StatementConfig, StatementExecutor};
pub use tools::{DatabricksTools, QueryOutcome};
