//! # Diagnostics
//!
//! Findings accumulated by a validation pass. Errors decide validity;
//! recommendations are advisory; removals are the audit trail left by
//! repair operations.

use std::fmt;

/// What kind of rule a violation broke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViolationKind {
    /// One or more required keys are absent.
    MissingRequired,
    /// One or more top-level keys are not allowed for the target.
    UnsupportedKey,
    /// A nested object property is not allowed.
    UnsupportedProperty,
    /// An array element is outside the allowed values.
    UnsupportedValue,
    /// A permission string is not a valid host pattern.
    InvalidHostPattern,
    /// The extension identifier is missing or malformed.
    InvalidExtensionId,
}

/// A single validity-affecting finding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// The rule that was broken.
    pub kind: ViolationKind,
    /// Human-readable description.
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// All findings held by a formatter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    pub(crate) errors: Vec<Violation>,
    pub(crate) recommendations: Vec<String>,
    pub(crate) missing_required: Vec<String>,
    pub(crate) removed_keys: Vec<String>,
}

impl Diagnostics {
    /// Validity-affecting findings of the last pass.
    pub fn errors(&self) -> &[Violation] {
        &self.errors
    }

    /// Advisory findings of the last pass.
    pub fn recommendations(&self) -> &[String] {
        &self.recommendations
    }

    /// Required keys found missing by the last pass.
    pub fn missing_required(&self) -> &[String] {
        &self.missing_required
    }

    /// Everything repair has deleted so far.
    pub fn removed_keys(&self) -> &[String] {
        &self.removed_keys
    }

    /// Drop per-pass findings. The removal log survives.
    pub(crate) fn begin_pass(&mut self) {
        self.errors.clear();
        self.recommendations.clear();
        self.missing_required.clear();
    }

    pub(crate) fn error(&mut self, kind: ViolationKind, message: String) {
        self.errors.push(Violation { kind, message });
    }

    pub(crate) fn recommend(&mut self, message: String) {
        self.recommendations.push(message);
    }

    pub(crate) fn removed(&mut self, entry: String) {
        self.removed_keys.push(entry);
    }
}
