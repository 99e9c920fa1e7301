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

//! Metadata aggregation over Unity Catalog.
//!
//! [`MetadataAggregator`] fetches schema and table listings and, for table
//! descriptions, merges table metadata with lineage. Failures inside a
//! batch stay attached to the item that caused them.
//!
//! ## Example
//!
//! ```ignore
//! use databricks_mcp::metadata::MetadataAggregator;
//!
//! let aggregator = MetadataAggregator::new(catalog_client);
//! let tables = aggregator.list_tables("main", "sales").await?;
//! let described = aggregator.describe_tables(&["main.sales.orders"]).await;
//! ```

use crate::client::CatalogClient;
use crate::error::{Error, Result};
use crate::metadata::types::{
    DescribedTable, LineageEdges, SchemaDescriptor, TableDescriptor, TableSummary,
};
use std::sync::Arc;
use tracing::{debug, warn};

/// Fetches and validates catalog metadata.
#[derive(Debug, Clone)]
pub struct MetadataAggregator {
    client: Arc<dyn CatalogClient>,
}

impl MetadataAggregator {
    pub fn new(client: Arc<dyn CatalogClient>) -> Self {
        Self { client }
    }

    /// List the schemas of a catalog. Nameless entries are skipped.
    pub async fn describe_schema(&self, catalog: &str) -> Result<Vec<SchemaDescriptor>> {
        let schemas = self.client.list_schemas(catalog).await?;
        let total = schemas.len();

        let schemas: Vec<_> = schemas
            .into_iter()
            .filter_map(|info| SchemaDescriptor::from_info(info, catalog))
            .collect();
        if schemas.len() < total {
            warn!(
                "Skipped {} unnamed schema entries in {}",
                total - schemas.len(),
                catalog
            );
        }

        debug!("Found {} schemas in {}", schemas.len(), catalog);
        Ok(schemas)
    }

    /// List the tables of a schema. Nameless entries are skipped.
    pub async fn list_tables(&self, catalog: &str, schema: &str) -> Result<Vec<TableSummary>> {
        let tables = self.client.list_tables(catalog, schema).await?;
        let total = tables.len();

        let tables: Vec<_> = tables
            .into_iter()
            .filter_map(|info| TableSummary::from_info(info, catalog, schema))
            .collect();
        if tables.len() < total {
            warn!(
                "Skipped {} unnamed table entries in {}.{}",
                total - tables.len(),
                catalog,
                schema
            );
        }

        debug!("Found {} tables in {}.{}", tables.len(), catalog, schema);
        Ok(tables)
    }

    /// Describe each table with its lineage.
    ///
    /// The output has one item per input name, in input order. Table and
    /// lineage lookups are independent; each failure is recorded as a
    /// [`Error::PartialFetch`] on its item.
    pub async fn describe_tables<S: AsRef<str>>(&self, names: &[S]) -> Vec<DescribedTable> {
        let mut described = Vec::with_capacity(names.len());

        for name in names {
            let name = name.as_ref();
            debug!("Describing table {}", name);

            let (table, lineage) = tokio::join!(
                self.client.get_table(name),
                self.client.get_table_lineage(name)
            );

            let table = table
                .and_then(TableDescriptor::try_from)
                .map_err(|e| Error::partial(format!("table metadata for {}", name), e));
            let lineage = lineage
                .map(LineageEdges::from)
                .map_err(|e| Error::partial(format!("lineage for {}", name), e));

            if let Err(ref e) = table {
                warn!("{}", e);
            }
            if let Err(ref e) = lineage {
                warn!("{}", e);
            }

            described.push(DescribedTable {
                requested_name: name.to_string(),
                table,
                lineage,
            });
        }

        described
    }
}
