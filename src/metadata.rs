//! Structural metadata extraction from model documents
//!
//! A traversal-oriented scan, not a grammar check: it pulls out the model's
//! own `@id` and the DTMIs it references through `extends` chains and
//! component `schema` fields, recursing through nested objects and arrays.
//! Unrecognized fields are tolerated; the external DTDL validator is the
//! authority on grammar.

use serde_json::Value;

use crate::dtmi::Dtmi;
use crate::error::{ResolverError, Result};

/// A model's own id plus the DTMIs it references, in document order.
#[derive(Debug, Clone)]
pub struct ModelMetadata {
    pub id: String,
    pub dependencies: Vec<String>,
}

/// Extract id and dependency references from raw model text.
pub fn extract(definition: &str) -> Result<ModelMetadata> {
    let value: Value = serde_json::from_str(definition)?;
    let id = root_id(&value).ok_or(ResolverError::MissingRootId)?;
    let mut dependencies = Vec::new();
    collect_dependencies(&value, &mut dependencies);
    Ok(ModelMetadata { id, dependencies })
}

/// The root `@id` of raw model text. Restricted extractor used by the index
/// builder and the CLI.
pub fn get_root_id(definition: &str) -> Result<String> {
    let value: Value = serde_json::from_str(definition)?;
    root_id(&value).ok_or(ResolverError::MissingRootId)
}

fn root_id(value: &Value) -> Option<String> {
    value
        .get("@id")
        .and_then(Value::as_str)
        .map(ToString::to_string)
}

fn collect_dependencies(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::Object(obj) => {
            if let Some(extends) = obj.get("extends") {
                push_refs(extends, out);
            }
            if is_component(obj) {
                if let Some(schema) = obj.get("schema") {
                    push_refs(schema, out);
                }
            }
            for nested in obj.values() {
                collect_dependencies(nested, out);
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_dependencies(item, out);
            }
        }
        _ => {}
    }
}

fn is_component(obj: &serde_json::Map<String, Value>) -> bool {
    match obj.get("@type") {
        Some(Value::String(ty)) => ty == "Component",
        Some(Value::Array(types)) => types.iter().any(|t| t.as_str() == Some("Component")),
        _ => false,
    }
}

/// Collect DTMI-valued references, first appearance wins.
fn push_refs(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::String(s) => {
            if Dtmi::is_valid(s) && !out.iter().any(|existing| existing == s) {
                out.push(s.clone());
            }
        }
        Value::Array(items) => {
            for item in items {
                push_refs(item, out);
            }
        }
        _ => {}
    }
}
