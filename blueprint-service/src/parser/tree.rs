//! YAML front end
//!
//! Loads document text into the generic YAML tree the import merger works
//! on, and decodes the combined tree into the typed document model once it
//! has passed schema validation.

use blueprint_core::error::{BlueprintError, Result};
use blueprint_core::types::Document;
use serde_yaml::Value;
use std::fs;
use std::path::Path;

/// Parse document text into a generic YAML tree
///
/// # Errors
///
/// Returns a `BlueprintError` if the text is not legal YAML or parses to
/// an empty document.
pub fn parse_tree(content: &str) -> Result<Value> {
    let tree: Value = serde_yaml::from_str(content)?;
    if tree.is_null() {
        return Err(BlueprintError::EmptyDocument);
    }
    Ok(tree)
}

/// Read and parse a file into a generic YAML tree
///
/// # Errors
///
/// Returns a `BlueprintError` if the file cannot be read or its content
/// does not parse.
pub fn read_tree(path: &Path) -> Result<Value> {
    let content = fs::read_to_string(path)
        .map_err(|e| BlueprintError::import_open(path.display().to_string(), &e))?;
    parse_tree(&content)
}

/// Decode the combined, schema-validated tree into the typed document model
///
/// # Errors
///
/// Returns a `BlueprintError` if the tree does not fit the document model;
/// the schema validator runs first, so this only surfaces shapes the
/// schema cannot express.
pub fn decode_document(tree: Value) -> Result<Document> {
    serde_yaml::from_value(tree).map_err(|e| {
        BlueprintError::schema_violation(format!("combined document does not decode: {e}"), "")
    })
}
