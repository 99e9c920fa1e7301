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

//! Catalog metadata: aggregation and Markdown rendering.
//!
//! ## Module Structure
//!
//! - `types`: Validated schema, table, constraint and lineage records
//! - `service`: [`MetadataAggregator`] over a [`crate::client::CatalogClient`]
//! - `render`: Pure Markdown renderers for the tool output

pub mod render;
pub mod service;
pub mod types;

// Re-export commonly used types
pub use service::MetadataAggregator;
pub use types::{
    ColumnDescriptor, ConstraintDescriptor, DescribedTable, LineageEdges, SchemaDescriptor,
    TableDescriptor, TableRef, TableSummary,
};
