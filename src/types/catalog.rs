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

//! Unity Catalog and lineage-tracking response types.
//!
//! Every field the renderer can live without is optional here; validation
//! into domain records happens in [`crate::metadata::types`].

use serde::{Deserialize, Serialize};

/// Response of `GET /api/2.1/unity-catalog/schemas`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListSchemasResponse {
    #[serde(default)]
    pub schemas: Vec<SchemaInfo>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// One schema entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaInfo {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub catalog_name: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
}

/// Response of `GET /api/2.1/unity-catalog/tables`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListTablesResponse {
    #[serde(default)]
    pub tables: Vec<TableInfo>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// Table metadata as returned by list and get-by-name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TableInfo {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub catalog_name: Option<String>,
    #[serde(default)]
    pub schema_name: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub table_type: Option<String>,
    #[serde(default)]
    pub data_source_format: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub columns: Option<Vec<ColumnInfo>>,
    #[serde(default)]
    pub table_constraints: Option<Vec<TableConstraint>>,
}

/// Column metadata.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ColumnInfo {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub type_text: Option<String>,
    #[serde(default)]
    pub type_name: Option<String>,
    #[serde(default)]
    pub nullable: Option<bool>,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub position: Option<i32>,
}

/// Exactly one of the three fields is expected to be set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TableConstraint {
    #[serde(default)]
    pub primary_key_constraint: Option<PrimaryKeyConstraint>,
    #[serde(default)]
    pub foreign_key_constraint: Option<ForeignKeyConstraint>,
    #[serde(default)]
    pub named_table_constraint: Option<NamedTableConstraint>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PrimaryKeyConstraint {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub child_columns: Vec<String>,
    #[serde(default)]
    pub timeseries_columns: Option<Vec<String>>,
    #[serde(default)]
    pub rely: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ForeignKeyConstraint {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub child_columns: Vec<String>,
    #[serde(default)]
    pub parent_table: Option<String>,
    #[serde(default)]
    pub parent_columns: Vec<String>,
    #[serde(default)]
    pub rely: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NamedTableConstraint {
    #[serde(default)]
    pub name: Option<String>,
}

/// Response of `GET /api/2.0/lineage-tracking/table-lineage`.
///
/// Tables without lineage come back as `{}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TableLineageResponse {
    #[serde(default)]
    pub upstreams: Option<Vec<LineageEntry>>,
    #[serde(default)]
    pub downstreams: Option<Vec<LineageEntry>>,
}

/// One lineage edge. Non-table entities (notebooks, jobs, files) have no
/// `tableInfo`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LineageEntry {
    #[serde(rename = "tableInfo", default, skip_serializing_if = "Option::is_none")]
    pub table_info: Option<LineageTableInfo>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LineageTableInfo {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub catalog_name: Option<String>,
    #[serde(default)]
    pub schema_name: Option<String>,
    #[serde(default)]
    pub table_type: Option<String>,
}
