//! # Guided Repair
//!
//! Mutations that move a manifest toward compliance. Every operation
//! re-runs the full validation pass before returning, so diagnostics and
//! validity always describe the post-mutation document. The return value
//! is the new validity.
//!
//! Deletions are idempotent: on a compliant manifest they change nothing.

use serde_json::{json, Map, Value};

use crate::engine::{ManifestFormatter, Sweep};
use crate::table::{APPLICATIONS_KEY, MANIFEST_VERSION_KEY};

/// Value used for `manifest_version` when none is supplied.
///
/// An integer, not the string `"2"`, since browsers read the field as a number.
pub const DEFAULT_MANIFEST_VERSION: u64 = 2;

/// Built-in default for a required key, if it has one.
pub fn default_value(key: &str) -> Option<Value> {
    match key {
        MANIFEST_VERSION_KEY => Some(json!(DEFAULT_MANIFEST_VERSION)),
        _ => None,
    }
}

/// Normalize a value for `applications` into `{ "gecko": { "id": .. } }`.
///
/// A bare string is taken as the id. An object holding `id` is taken as
/// the `gecko` entry. Anything else is assumed to be pre-shaped.
pub fn wrap_extension_id(value: Value) -> Value {
    match value {
        Value::String(id) => json!({ "gecko": { "id": id } }),
        Value::Object(gecko) if gecko.contains_key("id") => json!({ "gecko": gecko }),
        other => other,
    }
}

impl ManifestFormatter {
    /// Set a required key.
    ///
    /// With `None`, the key's built-in default is applied; keys without a
    /// default are left untouched. A value for `applications` goes through
    /// [`wrap_extension_id`]. Anything else is assigned verbatim.
    pub fn fill_required(&mut self, key: &str, value: Option<Value>) -> bool {
        let value = match value {
            Some(value) if key == APPLICATIONS_KEY => Some(wrap_extension_id(value)),
            Some(value) => Some(value),
            None => default_value(key),
        };
        match value {
            Some(value) => {
                tracing::info!(key, "filled required key");
                self.document.insert(key.to_string(), value);
            }
            None => tracing::debug!(key, "no value and no default; key left unset"),
        }
        self.validate()
    }

    /// Merge several entries into the manifest at once, verbatim.
    pub fn fill_required_many(&mut self, entries: Map<String, Value>) -> bool {
        for (key, value) in entries {
            tracing::info!(key = %key, "filled required key");
            self.document.insert(key, value);
        }
        self.validate()
    }

    /// Remove every top-level key the target does not support.
    pub fn delete_unsupported_keys(&mut self) -> bool {
        for key in self.unsupported_keys() {
            self.document.shift_remove(&key);
            tracing::info!(key = %key, "removed unsupported key");
            self.diagnostics.removed(format!(
                "\"{key}\" is not supported by {}",
                self.rules.target()
            ));
        }
        self.validate()
    }

    /// Remove every unsupported nested property and array value, in a
    /// single traversal.
    pub fn delete_unsupported_properties(&mut self) -> bool {
        self.sweep_constraints(Sweep::Remove);
        self.validate()
    }
}
