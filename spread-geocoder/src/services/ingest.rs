//! Location file ingestion
//!
//! Parses an uploaded JSON document into normalized [`LocationRecord`]s.
//! Any structural problem aborts the whole batch before a remote call is made.

use serde_json::Value;
use thiserror::Error;

use crate::models::LocationRecord;

/// Ingestion errors (fatal to the batch)
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Error decoding JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Expected a JSON list of locations, found {0}")]
    NotAList(&'static str),

    #[error("Location at index {index} is not an object (found {found})")]
    NotAnObject { index: usize, found: &'static str },
}

/// Parse raw file bytes into normalized records
pub fn parse_locations(bytes: &[u8]) -> Result<Vec<LocationRecord>, IngestError> {
    let document: Value = serde_json::from_slice(bytes)?;
    normalize_locations(&document)
}

/// Normalize an already-parsed document
///
/// The document must be an array whose every element is an object.
pub fn normalize_locations(document: &Value) -> Result<Vec<LocationRecord>, IngestError> {
    let items = document
        .as_array()
        .ok_or_else(|| IngestError::NotAList(kind_of(document)))?;

    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            item.as_object()
                .map(LocationRecord::from_json_object)
                .ok_or(IngestError::NotAnObject {
                    index,
                    found: kind_of(item),
                })
        })
        .collect()
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}
