//! # Manifest Documents
//!
//! A manifest is held as a plain JSON object. This module loads one from
//! disk and performs the one-time merge of project defaults from a
//! `package.json` before the rule engine sees it.
//!
//! ## Project Defaults
//!
//! Two things are taken from the package document:
//!
//! 1. Its `webextension` object, if any, is the base the manifest is
//!    layered over. Keys present in the manifest win. Base keys come
//!    first, and a manifest key that overrides one keeps the base position.
//! 2. Any of the [`INHERITABLE_FIELDS`] whose manifest value is the string
//!    `"inherit"` is replaced by the package's corresponding field. When
//!    the package has no such field the key is dropped.

use std::path::Path;

use serde_json::{Map, Value};

use crate::error::{WxmError, WxmResult};

/// A parsed manifest: string keys to heterogeneous JSON values, in source
/// order.
pub type Document = Map<String, Value>;

/// Manifest value that requests a field from the package document.
pub const INHERIT_MARKER: &str = "inherit";

/// `(manifest key, package key)` pairs eligible for inheritance.
pub const INHERITABLE_FIELDS: &[(&str, &str)] = &[
    ("name", "name"),
    ("version", "version"),
    ("author", "author"),
    ("description", "description"),
    ("homepage_url", "homepage"),
];

/// Load a manifest from a JSON file.
///
/// # Errors
///
/// Returns `WxmError::DocumentLoad` if the file cannot be read or is not
/// valid JSON, and `WxmError::DocumentShape` if the top level is not an
/// object.
pub fn load_document(path: &Path) -> WxmResult<Document> {
    let content = std::fs::read_to_string(path).map_err(|e| WxmError::DocumentLoad {
        path: path.display().to_string(),
        reason: format!("cannot read file: {e}"),
    })?;
    parse_document(&content, &path.display().to_string())
}

/// Parse manifest text. `origin` labels the source in error messages.
///
/// # Errors
///
/// Same as [`load_document`], minus the read failure.
pub fn parse_document(content: &str, origin: &str) -> WxmResult<Document> {
    let value: Value = serde_json::from_str(content).map_err(|e| WxmError::DocumentLoad {
        path: origin.to_string(),
        reason: format!("invalid JSON: {e}"),
    })?;
    match value {
        Value::Object(map) => Ok(map),
        other => Err(WxmError::DocumentShape(format!(
            "{origin}: expected a JSON object at the top level, found {}",
            json_kind(&other)
        ))),
    }
}

/// Load a `package.json`-style defaults document.
///
/// Unlike the manifest, any JSON value is accepted; non-object packages
/// simply contribute nothing during the merge.
///
/// # Errors
///
/// Returns `WxmError::DocumentLoad` if the file cannot be read or parsed.
pub fn load_package(path: &Path) -> WxmResult<Value> {
    let content = std::fs::read_to_string(path).map_err(|e| WxmError::DocumentLoad {
        path: path.display().to_string(),
        reason: format!("cannot read file: {e}"),
    })?;
    serde_json::from_str(&content).map_err(|e| WxmError::DocumentLoad {
        path: path.display().to_string(),
        reason: format!("invalid JSON: {e}"),
    })
}

/// Merge project defaults from `package` into `manifest`.
///
/// See the module docs for the exact rules. Runs once, before the rule
/// engine is constructed.
pub fn merge_package_defaults(manifest: Document, package: &Value) -> Document {
    let mut merged = match package.get("webextension") {
        Some(Value::Object(base)) => base.clone(),
        _ => Map::new(),
    };
    for (key, value) in manifest {
        merged.insert(key, value);
    }

    for (field, package_field) in INHERITABLE_FIELDS {
        let inherits = matches!(merged.get(*field), Some(Value::String(s)) if s == INHERIT_MARKER);
        if !inherits {
            continue;
        }
        match package.get(*package_field) {
            Some(value) if !value.is_null() => {
                tracing::debug!(field, "inherited field from package document");
                merged.insert((*field).to_string(), value.clone());
            }
            _ => {
                tracing::warn!(field, "package document has no value to inherit; dropping key");
                merged.shift_remove(*field);
            }
        }
    }

    merged
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
