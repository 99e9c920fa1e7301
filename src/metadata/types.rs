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

//! Domain records for catalog metadata.
//!
//! These are the validated forms of the Unity Catalog wire types in
//! [`crate::types::catalog`]. Conversion drops or rejects entries that
//! cannot be rendered; everything else that is optional stays optional.

use crate::error::{Error, Result};
use crate::types::catalog::{
    ColumnInfo, LineageEntry, LineageTableInfo, SchemaInfo, TableConstraint, TableInfo,
    TableLineageResponse,
};
use serde::Serialize;
use tracing::debug;

/// A schema inside a catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaDescriptor {
    pub name: String,
    pub full_name: String,
    pub comment: Option<String>,
}

impl SchemaDescriptor {
    /// Returns `None` for entries without a name.
    pub fn from_info(info: SchemaInfo, catalog: &str) -> Option<Self> {
        let name = info.name?;
        let full_name = info
            .full_name
            .unwrap_or_else(|| format!("{}.{}", catalog, name));
        Some(Self {
            name,
            full_name,
            comment: info.comment.filter(|c| !c.is_empty()),
        })
    }
}

/// A table as it appears in a schema listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableSummary {
    pub name: String,
    pub catalog_name: String,
    pub schema_name: String,
    pub table_type: Option<String>,
}

impl TableSummary {
    /// Returns `None` for entries without a name. Missing parents default to
    /// the listing's catalog and schema.
    pub fn from_info(info: TableInfo, catalog: &str, schema: &str) -> Option<Self> {
        Some(Self {
            name: info.name?,
            catalog_name: info.catalog_name.unwrap_or_else(|| catalog.to_string()),
            schema_name: info.schema_name.unwrap_or_else(|| schema.to_string()),
            table_type: info.table_type,
        })
    }

    pub fn full_name(&self) -> String {
        format!("{}.{}.{}", self.catalog_name, self.schema_name, self.name)
    }
}

/// One column of a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnDescriptor {
    pub name: String,
    pub type_text: String,
    pub nullable: bool,
    pub comment: Option<String>,
}

impl TryFrom<ColumnInfo> for ColumnDescriptor {
    type Error = Error;

    fn try_from(info: ColumnInfo) -> Result<Self> {
        let name = info
            .name
            .ok_or_else(|| Error::Decode("column without a name".to_string()))?;
        Ok(Self {
            type_text: info
                .type_text
                .or(info.type_name)
                .unwrap_or_else(|| "UNKNOWN".to_string()),
            // An absent flag is rendered as not nullable.
            nullable: info.nullable.unwrap_or(false),
            comment: info.comment,
            name,
        })
    }
}

/// A table constraint. Exactly one kind per constraint.
///
/// Fields the service left out stay `None`; the renderer decides whether
/// the constraint can still be shown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConstraintDescriptor {
    PrimaryKey {
        name: Option<String>,
        columns: Vec<String>,
        timeseries_columns: Vec<String>,
        rely: Option<bool>,
    },
    ForeignKey {
        name: Option<String>,
        columns: Vec<String>,
        parent_table: Option<String>,
        parent_columns: Vec<String>,
        rely: Option<bool>,
    },
    Named {
        name: Option<String>,
    },
}

impl ConstraintDescriptor {
    /// Returns `None` when none of the three constraint kinds is set.
    pub fn from_wire(constraint: TableConstraint) -> Option<Self> {
        if let Some(pk) = constraint.primary_key_constraint {
            return Some(ConstraintDescriptor::PrimaryKey {
                name: pk.name,
                columns: pk.child_columns,
                timeseries_columns: pk.timeseries_columns.unwrap_or_default(),
                rely: pk.rely,
            });
        }
        if let Some(fk) = constraint.foreign_key_constraint {
            return Some(ConstraintDescriptor::ForeignKey {
                name: fk.name,
                columns: fk.child_columns,
                parent_table: fk.parent_table,
                parent_columns: fk.parent_columns,
                rely: fk.rely,
            });
        }
        constraint
            .named_table_constraint
            .map(|named| ConstraintDescriptor::Named { name: named.name })
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            ConstraintDescriptor::PrimaryKey { name, .. }
            | ConstraintDescriptor::ForeignKey { name, .. }
            | ConstraintDescriptor::Named { name } => name.as_deref(),
        }
    }

    /// Wire label used in rendered output.
    pub fn kind(&self) -> &'static str {
        match self {
            ConstraintDescriptor::PrimaryKey { .. } => "PRIMARY_KEY",
            ConstraintDescriptor::ForeignKey { .. } => "FOREIGN_KEY",
            ConstraintDescriptor::Named { .. } => "NAMED_CONSTRAINT",
        }
    }
}

/// Full metadata of one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableDescriptor {
    pub full_name: String,
    pub table_type: Option<String>,
    pub data_format: Option<String>,
    pub comment: Option<String>,
    pub columns: Vec<ColumnDescriptor>,
    pub constraints: Vec<ConstraintDescriptor>,
}

impl TryFrom<TableInfo> for TableDescriptor {
    type Error = Error;

    fn try_from(info: TableInfo) -> Result<Self> {
        let full_name = match (info.full_name, &info.catalog_name, &info.schema_name, &info.name) {
            (Some(full_name), _, _, _) => full_name,
            (None, Some(catalog), Some(schema), Some(name)) => {
                format!("{}.{}.{}", catalog, schema, name)
            }
            _ => {
                return Err(Error::Decode(
                    "table metadata carries no resolvable name".to_string(),
                ))
            }
        };

        let columns = info
            .columns
            .unwrap_or_default()
            .into_iter()
            .map(ColumnDescriptor::try_from)
            .collect::<Result<Vec<_>>>()
            .map_err(|e| Error::Decode(format!("table {}: {}", full_name, e)))?;

        let mut constraints = Vec::new();
        for constraint in info.table_constraints.unwrap_or_default() {
            match ConstraintDescriptor::from_wire(constraint) {
                Some(c) => constraints.push(c),
                None => debug!("Skipping empty constraint on {}", full_name),
            }
        }

        Ok(Self {
            full_name,
            table_type: info.table_type,
            data_format: info.data_source_format,
            comment: info.comment.filter(|c| !c.is_empty()),
            columns,
            constraints,
        })
    }
}

/// A fully qualified table reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct TableRef {
    pub catalog: String,
    pub schema: String,
    pub table: String,
}

impl TableRef {
    /// `catalog.schema.table`
    pub fn fqn(&self) -> String {
        format!("{}.{}.{}", self.catalog, self.schema, self.table)
    }

    fn from_lineage(info: &LineageTableInfo) -> Option<Self> {
        let part = |v: &Option<String>| v.as_ref().filter(|s| !s.is_empty()).cloned();
        Some(Self {
            catalog: part(&info.catalog_name)?,
            schema: part(&info.schema_name)?,
            table: part(&info.name)?,
        })
    }
}

/// Upstream and downstream tables of one table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LineageEdges {
    pub upstreams: Vec<TableRef>,
    pub downstreams: Vec<TableRef>,
}

impl LineageEdges {
    pub fn is_empty(&self) -> bool {
        self.upstreams.is_empty() && self.downstreams.is_empty()
    }
}

fn table_refs(entries: Option<Vec<LineageEntry>>) -> Vec<TableRef> {
    entries
        .unwrap_or_default()
        .iter()
        .filter_map(|entry| entry.table_info.as_ref().and_then(TableRef::from_lineage))
        .collect()
}

impl From<TableLineageResponse> for LineageEdges {
    /// Edges without a table identity (notebooks, jobs, partial names) are dropped.
    fn from(response: TableLineageResponse) -> Self {
        Self {
            upstreams: table_refs(response.upstreams),
            downstreams: table_refs(response.downstreams),
        }
    }
}

/// One item of a `describe_tables` batch. Each half fails independently.
#[derive(Debug)]
pub struct DescribedTable {
    pub requested_name: String,
    pub table: Result<TableDescriptor>,
    pub lineage: Result<LineageEdges>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_table_descriptor_from_info() {
        let info: TableInfo = serde_json::from_value(json!({
            "catalog_name": "main",
            "schema_name": "sales",
            "name": "orders",
            "table_type": "MANAGED",
            "columns": [
                {"name": "id", "type_name": "LONG", "nullable": false},
                {"name": "note", "type_text": "string", "nullable": true, "comment": "free text"}
            ],
            "table_constraints": [
                {"primary_key_constraint": {"name": "pk", "child_columns": ["id"]}},
                {}
            ]
        }))
        .unwrap();

        let table = TableDescriptor::try_from(info).unwrap();
        assert_eq!(table.full_name, "main.sales.orders");
        assert_eq!(table.data_format, None);
        assert_eq!(table.columns[0].type_text, "LONG");
        assert!(table.columns[1].nullable);
        assert_eq!(table.constraints.len(), 1);
        assert_eq!(table.constraints[0].kind(), "PRIMARY_KEY");
        assert_eq!(table.constraints[0].name(), Some("pk"));
    }

    #[test]
    fn test_table_without_name_is_rejected() {
        let info: TableInfo = serde_json::from_value(json!({"catalog_name": "main"})).unwrap();
        assert!(matches!(
            TableDescriptor::try_from(info),
            Err(Error::Decode(_))
        ));
    }

    #[test]
    fn test_lineage_drops_incomplete_edges() {
        let response: TableLineageResponse = serde_json::from_value(json!({
            "upstreams": [
                {"tableInfo": {"catalog_name": "main", "schema_name": "bronze", "name": "raw"}},
                {"tableInfo": {"catalog_name": "main", "name": "no_schema"}},
                {"tableInfo": {"catalog_name": "", "schema_name": "s", "name": "t"}},
                {"notebookInfos": []}
            ],
            "downstreams": [
                {"tableInfo": {"catalog_name": "main", "schema_name": "gold", "name": "daily"}}
            ]
        }))
        .unwrap();

        let edges = LineageEdges::from(response);
        let up: Vec<_> = edges.upstreams.iter().map(TableRef::fqn).collect();
        let down: Vec<_> = edges.downstreams.iter().map(TableRef::fqn).collect();
        assert_eq!(up, vec!["main.bronze.raw"]);
        assert_eq!(down, vec!["main.gold.daily"]);
    }

    #[test]
    fn test_empty_lineage() {
        let edges = LineageEdges::from(TableLineageResponse::default());
        assert!(edges.is_empty());
    }

    #[test]
    fn test_summaries_default_parent_names() {
        let info: TableInfo = serde_json::from_value(json!({"name": "orders"})).unwrap();
        let summary = TableSummary::from_info(info, "main", "sales").unwrap();
        assert_eq!(summary.full_name(), "main.sales.orders");

        let info: TableInfo = serde_json::from_value(json!({})).unwrap();
        assert!(TableSummary::from_info(info, "main", "sales").is_none());

        let schema: SchemaInfo =
            serde_json::from_value(json!({"name": "sales", "comment": ""})).unwrap();
        let schema = SchemaDescriptor::from_info(schema, "main").unwrap();
        assert_eq!(schema.full_name, "main.sales");
        assert_eq!(schema.comment, None);
    }

    #[test]
    fn test_constraint_serializes_with_kind_tag() {
        let constraint = ConstraintDescriptor::Named {
            name: Some("chk".to_string()),
        };
        assert_eq!(
            serde_json::to_value(&constraint).unwrap(),
            json!({"kind": "NAMED", "name": "chk"})
        );
    }
}
