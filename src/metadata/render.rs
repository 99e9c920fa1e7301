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

//! Markdown rendering of catalog metadata.
//!
//! All functions here are pure and total: the same input always yields the
//! same text, and missing optional fields render as placeholders. A table
//! section that cannot be rendered falls back to a JSON dump of its data.

use crate::metadata::types::{
    ColumnDescriptor, ConstraintDescriptor, DescribedTable, LineageEdges, SchemaDescriptor,
    TableDescriptor, TableRef, TableSummary,
};
use std::fmt::Display;
use tracing::{error, warn};

const NO_TABLES: &str = "**No tables found**";
const NO_SCHEMAS: &str = "**No schemas found**";

/// Error block returned by the text tools.
pub fn render_error(title: &str, err: impl Display) -> String {
    format!(
        "**Error**: {}\n**Details:**\n```\n{}\n```\n",
        title, err
    )
}

/// Schema listing: header, count and one bullet per schema.
pub fn render_schema_list(catalog: &str, schemas: &[SchemaDescriptor]) -> String {
    if schemas.is_empty() {
        return NO_SCHEMAS.to_string();
    }

    let mut lines = vec![
        format!("# List of schemas in `{}`", catalog),
        String::new(),
        format!("*Number of Schemas*: {}", schemas.len()),
        String::new(),
        "## Schemas:".to_string(),
        String::new(),
    ];
    for schema in schemas {
        lines.push(format!(
            "- `{}`: {}",
            schema.name,
            schema.comment.as_deref().unwrap_or("No description")
        ));
    }
    lines.push(String::new());
    lines.join("\n")
}

/// Summary mode: header, count and the comma-joined table names.
pub fn render_table_list(catalog: &str, schema: &str, tables: &[TableSummary]) -> String {
    if tables.is_empty() {
        return NO_TABLES.to_string();
    }

    let names: Vec<&str> = tables.iter().map(|t| t.name.as_str()).collect();
    [
        format!("# List of tables in `{}.{}`", catalog, schema),
        String::new(),
        format!("*Number of Tables*: {}", tables.len()),
        String::new(),
        "## Table names:".to_string(),
        String::new(),
        names.join(", "),
        String::new(),
    ]
    .join("\n")
}

/// Detailed mode: one section per described table, separated by `---`.
pub fn render_table_details(items: &[DescribedTable]) -> String {
    if items.is_empty() {
        return NO_TABLES.to_string();
    }

    let mut doc = vec!["# Table Information".to_string(), String::new()];
    for (idx, item) in items.iter().enumerate() {
        doc.push(render_item(item));
        if idx + 1 < items.len() {
            doc.push("---".to_string());
            doc.push(String::new());
        }
    }
    doc.join("\n")
}

fn render_item(item: &DescribedTable) -> String {
    let table = match item.table {
        Ok(ref table) => table,
        Err(ref e) => {
            return [
                "## Table Info".to_string(),
                format!("**Name:** `{}`", item.requested_name),
                format!("**Error:** {}", e),
                String::new(),
            ]
            .join("\n")
        }
    };

    match render_table(table, &item.lineage) {
        Ok(section) => section,
        Err(reason) => {
            let msg = format!("Error parsing table info `{}`: {}", table.full_name, reason);
            error!("{}", msg);
            warn!("Falling back to raw table and lineage information");
            let lineage = match item.lineage {
                Ok(ref edges) => to_json(edges),
                Err(ref e) => e.to_string(),
            };
            [
                msg,
                String::new(),
                "Table Info:".to_string(),
                to_json(table),
                String::new(),
                "Lineage Info:".to_string(),
                lineage,
                String::new(),
            ]
            .join("\n")
        }
    }
}

fn render_table(
    table: &TableDescriptor,
    lineage: &crate::error::Result<LineageEdges>,
) -> Result<String, String> {
    let mut lines = vec![
        "## Table Info".to_string(),
        format!("**Name:** `{}`", table.full_name),
        format!(
            "**Type:** `{}`",
            table.table_type.as_deref().unwrap_or("UNKNOWN")
        ),
        format!(
            "**Data Format:** `{}`",
            table.data_format.as_deref().unwrap_or("UNKNOWN")
        ),
        format!(
            "**Description:** {}",
            table.comment.as_deref().unwrap_or("No description")
        ),
        String::new(),
        "### Schema".to_string(),
        render_columns(&table.columns),
        String::new(),
        "### Constraints".to_string(),
        render_constraints(&table.constraints)?,
        String::new(),
        "### Lineage".to_string(),
    ];
    lines.push(match lineage {
        Ok(edges) => render_lineage(edges),
        Err(e) => format!("**Error:** {}", e),
    });
    lines.push(String::new());
    Ok(lines.join("\n"))
}

fn render_columns(columns: &[ColumnDescriptor]) -> String {
    if columns.is_empty() {
        return "No columns defined.".to_string();
    }

    let mut rows = vec![
        "| Column | Type | Nullable | Comment |".to_string(),
        "|--------|------|----------|---------|".to_string(),
    ];
    for column in columns {
        rows.push(format!(
            "| {} | {} | {} | {} |",
            cell(&column.name),
            cell(&column.type_text),
            if column.nullable { "TRUE" } else { "FALSE" },
            cell(column.comment.as_deref().unwrap_or(""))
        ));
    }
    rows.join("\n")
}

fn render_constraints(constraints: &[ConstraintDescriptor]) -> Result<String, String> {
    if constraints.is_empty() {
        return Ok("No constraints".to_string());
    }

    let mut rows = vec![
        "| Constraint Name | Type | Columns | Details | Rely |".to_string(),
        "|---|---|---|---|---|".to_string(),
    ];
    for constraint in constraints {
        let name = constraint
            .name()
            .ok_or_else(|| format!("{} constraint has no name", constraint.kind()))?;
        let row = match constraint {
            ConstraintDescriptor::PrimaryKey {
                columns,
                timeseries_columns,
                rely,
                ..
            } => {
                let details = if timeseries_columns.is_empty() {
                    "N/A".to_string()
                } else {
                    format!("timeseries_columns={}", timeseries_columns.join(", "))
                };
                format!(
                    "| {} | {} | {} | {} | {} |",
                    cell(name),
                    constraint.kind(),
                    key_columns(name, columns)?,
                    details,
                    rely_label(*rely)
                )
            }
            ConstraintDescriptor::ForeignKey {
                columns,
                parent_table,
                parent_columns,
                rely,
                ..
            } => format!(
                "| {} | {} | {} | references {}({}) | {} |",
                cell(name),
                constraint.kind(),
                key_columns(name, columns)?,
                parent_table
                    .as_deref()
                    .ok_or_else(|| format!("constraint `{}` has no parent table", name))?,
                parent_columns.join(", "),
                rely_label(*rely)
            ),
            ConstraintDescriptor::Named { .. } => {
                format!("| {} | {} | N/A | N/A | N/A |", cell(name), constraint.kind())
            }
        };
        rows.push(row);
    }
    Ok(rows.join("\n"))
}

fn render_lineage(edges: &LineageEdges) -> String {
    if edges.is_empty() {
        return "No lineage information".to_string();
    }

    let mut sections = Vec::new();
    if !edges.upstreams.is_empty() {
        sections.push(format!("**Upstream Tables:** {}", list(&edges.upstreams)));
    }
    if !edges.downstreams.is_empty() {
        sections.push(format!("**Downstream Tables:** {}", list(&edges.downstreams)));
    }
    sections.join("\n")
}

fn list(refs: &[TableRef]) -> String {
    refs.iter()
        .map(|r| format!("`{}`", r.fqn()))
        .collect::<Vec<_>>()
        .join(", ")
}

/// A key constraint must name at least one column.
fn key_columns(name: &str, columns: &[String]) -> Result<String, String> {
    if columns.is_empty() {
        return Err(format!("constraint `{}` has no columns", name));
    }
    Ok(columns.join(", "))
}

fn rely_label(rely: Option<bool>) -> &'static str {
    match rely {
        Some(true) => "TRUE",
        Some(false) => "FALSE",
        None => "UNKNOWN",
    }
}

/// Keep table cells on one line and away from the column separator.
fn cell(text: &str) -> String {
    text.replace('|', "\\|").replace(['\r', '\n'], " ")
}

fn to_json<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| format!("<unserializable: {}>", e))
}
