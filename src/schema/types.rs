// src/schema/types.rs

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A single field definition as extracted from a table reference page.
///
/// All values are raw text from the source document, trimmed but not
/// type-validated. Declaration order is meaningful and preserved.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Eq)]
pub struct FieldRecord {
    pub name: String,
    pub data_element: String,
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default)]
    pub length: String,
    #[serde(default)]
    pub decimals: String,
}

/// Parsed page content for one table, prior to canonicalization.
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct TableInfo {
    pub table_name: String,
    pub description: String,
    pub fields: Vec<FieldRecord>,
}

/// The canonical, persisted shape for one table.
///
/// Invariant: `fields` is non-empty for every persisted instance; callers
/// must discard zero-field schemas instead of storing them.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Eq)]
pub struct CanonicalSchema {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub fields: Vec<FieldRecord>,
}

/// Accumulated run output: table identifier → canonical schema,
/// insertion order = processing order.
pub type ResultSet = IndexMap<String, CanonicalSchema>;
