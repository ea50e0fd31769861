//! # Manifest Validation
//!
//! [`ManifestFormatter`] owns a manifest and the resolved rules of one
//! target, and evaluates the former against the latter.
//!
//! A full pass ([`ManifestFormatter::validate`]) runs five checks in a
//! fixed order. None of them stops the others; each one appends to the
//! diagnostics:
//!
//! 1. required keys are present
//! 2. recommended keys are present (advisory)
//! 3. no top-level key falls outside the target's valid keys
//! 4. constrained keys hold no unsupported properties or values
//! 5. the Firefox extension id, when the target knows `applications`
//!
//! The document is valid iff the pass produced no errors. Findings are
//! rebuilt from scratch on every pass, so validating twice without a
//! mutation in between gives identical results.
//!
//! Check 4 and [`ManifestFormatter::delete_unsupported_properties`] share
//! one traversal (`sweep_constraints`) and differ only
//! in what they do with an offending entry.

use serde_json::Value;
use wxm_core::{Document, Target, WxmResult};

use crate::diagnostics::{Diagnostics, Violation, ViolationKind};
use crate::extension_id::is_valid_extension_id;
use crate::host_pattern::is_valid_host_pattern;
use crate::resolve::{resolve, ResolvedRuleSet};
use crate::table::{
    RecommendedValue, APPLICATIONS_KEY, OPTIONAL_PERMISSIONS_KEY, PERMISSIONS_KEY,
};

/// What the constraint traversal does with an offending entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Sweep {
    /// Record an error, leave the document alone.
    Report,
    /// Delete the entry and log the removal.
    Remove,
}

/// A manifest bound to the rules of one target.
#[derive(Debug, Clone)]
pub struct ManifestFormatter {
    pub(crate) document: Document,
    pub(crate) rules: ResolvedRuleSet,
    pub(crate) diagnostics: Diagnostics,
    pub(crate) is_valid: bool,
}

impl ManifestFormatter {
    /// Resolve the built-in rules for `target` and run a first pass.
    ///
    /// # Errors
    ///
    /// Returns `WxmError::Configuration` if the rules for `target` cannot
    /// be resolved.
    pub fn new(document: Document, target: Target) -> WxmResult<Self> {
        Ok(Self::with_rules(document, resolve(target)?))
    }

    /// Bind `document` to already-resolved rules and run a first pass.
    pub fn with_rules(document: Document, rules: ResolvedRuleSet) -> Self {
        let mut formatter = Self {
            document,
            rules,
            diagnostics: Diagnostics::default(),
            is_valid: false,
        };
        formatter.validate();
        formatter
    }

    /// The target the rules belong to.
    pub fn target(&self) -> Target {
        self.rules.target()
    }

    /// The resolved rules.
    pub fn rules(&self) -> &ResolvedRuleSet {
        &self.rules
    }

    /// The current manifest.
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Consume the formatter and return the manifest.
    pub fn into_document(self) -> Document {
        self.document
    }

    /// All diagnostics.
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Result of the most recent full pass.
    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    /// Errors of the most recent full pass.
    pub fn errors(&self) -> &[Violation] {
        self.diagnostics.errors()
    }

    /// Recommendations of the most recent full pass.
    pub fn recommendations(&self) -> &[String] {
        self.diagnostics.recommendations()
    }

    /// Required keys missing at the most recent full pass.
    pub fn missing_required(&self) -> &[String] {
        self.diagnostics.missing_required()
    }

    /// Audit trail of repair deletions.
    pub fn removed_keys(&self) -> &[String] {
        self.diagnostics.removed_keys()
    }

    /// Run every check from a clean slate and record validity.
    pub fn validate(&mut self) -> bool {
        self.diagnostics.begin_pass();

        self.check_required_keys();
        self.check_recommended_keys();
        self.check_unsupported_keys();
        self.check_unsupported_properties();
        self.check_extension_id();

        self.is_valid = self.diagnostics.errors.is_empty();
        tracing::debug!(
            target_browser = %self.rules.target(),
            errors = self.diagnostics.errors.len(),
            recommendations = self.diagnostics.recommendations.len(),
            valid = self.is_valid,
            "validation pass complete"
        );
        self.is_valid
    }

    /// Every `required` key must be present. Absence is the only failure;
    /// the value itself is not inspected.
    pub fn check_required_keys(&mut self) -> bool {
        let missing: Vec<String> = self
            .rules
            .required_keys()
            .into_iter()
            .filter(|key| !self.document.contains_key(*key))
            .map(str::to_string)
            .collect();

        let ok = missing.is_empty();
        if !ok {
            self.diagnostics.error(
                ViolationKind::MissingRequired,
                format!(
                    "{}'s extension must have keys: {}",
                    self.rules.target(),
                    missing.join(", ")
                ),
            );
        }
        self.diagnostics.missing_required = missing;
        ok
    }

    /// Advise on each absent `recommend` key. Never fails.
    pub fn check_recommended_keys(&mut self) -> bool {
        for key in self.rules.recommended_keys() {
            if !self.document.contains_key(key) {
                self.diagnostics.recommend(format!("set {key} is good"));
            }
        }
        true
    }

    /// No top-level key may fall outside the target's valid keys.
    pub fn check_unsupported_keys(&mut self) -> bool {
        let unsupported = self.unsupported_keys();
        if unsupported.is_empty() {
            return true;
        }
        self.diagnostics.error(
            ViolationKind::UnsupportedKey,
            format!(
                "{}'s extension does not yet support keys: {}",
                self.rules.target(),
                unsupported.join(", ")
            ),
        );
        false
    }

    /// Constrained keys may hold no unsupported properties or values.
    pub fn check_unsupported_properties(&mut self) -> bool {
        self.sweep_constraints(Sweep::Report)
    }

    /// Check a permission string against the host-pattern grammar,
    /// recording an error when it does not match.
    pub fn check_host_pattern(&mut self, value: &str) -> bool {
        check_host_pattern(&mut self.diagnostics, value)
    }

    /// `applications.gecko.id` must be a valid, non-GUID extension id.
    ///
    /// Skipped for targets without `applications` and for manifests that
    /// omit it (the required-key check covers that case).
    pub fn check_extension_id(&mut self) -> bool {
        if !self.rules.is_valid_key(APPLICATIONS_KEY) {
            return true;
        }
        let Some(applications) = self.document.get(APPLICATIONS_KEY) else {
            return true;
        };
        let id = applications.get("gecko").and_then(|gecko| gecko.get("id"));
        match id {
            Some(Value::String(id)) if is_valid_extension_id(id) => true,
            other => {
                let shown = other.map_or_else(|| "(missing)".to_string(), display_value);
                self.diagnostics.error(
                    ViolationKind::InvalidExtensionId,
                    format!("Invalid id: {shown}"),
                );
                false
            }
        }
    }

    /// Top-level keys not valid for the target, in document order.
    pub fn unsupported_keys(&self) -> Vec<String> {
        self.document
            .keys()
            .filter(|key| !self.rules.is_valid_key(key))
            .cloned()
            .collect()
    }

    /// Walk every constrained rule whose key holds a truthy value and
    /// apply `sweep` to each unsupported property or value. Returns true
    /// if nothing offending was found.
    pub(crate) fn sweep_constraints(&mut self, sweep: Sweep) -> bool {
        let Self {
            document,
            rules,
            diagnostics,
            ..
        } = self;
        let mut clean = true;

        for rule in rules.constrained_rules() {
            let key = rule.key.as_str();
            let Some(value) = document.get_mut(key) else {
                continue;
            };
            if !is_truthy(value) {
                continue;
            }
            let constraint = &rule.constraint;

            if let (Some(props), Value::Object(map)) =
                (&constraint.unsupported_properties, &mut *value)
            {
                for prop in props {
                    if !map.contains_key(prop) {
                        continue;
                    }
                    clean = false;
                    match sweep {
                        Sweep::Report => diagnostics.error(
                            ViolationKind::UnsupportedProperty,
                            format!("{key} doesn't yet support keyword '{prop}'"),
                        ),
                        Sweep::Remove => {
                            map.shift_remove(prop);
                            tracing::info!(key, property = %prop, "removed unsupported property");
                            diagnostics
                                .removed(format!("\"{key}\" doesn't support keyword: \"{prop}\""));
                        }
                    }
                }
            }

            if let (Some(allowed), Value::Array(items)) =
                (&constraint.allowed_values, &mut *value)
            {
                let host_patterns_allowed = is_permission_key(key);
                let verdicts: Vec<bool> = items
                    .iter()
                    .map(|item| match item {
                        Value::String(s) if allowed.contains(s) => true,
                        Value::String(s) if host_patterns_allowed => {
                            check_host_pattern(diagnostics, s)
                        }
                        other if host_patterns_allowed => {
                            check_host_pattern(diagnostics, &display_value(other))
                        }
                        _ => false,
                    })
                    .collect();
                if !verdicts.iter().all(|ok| *ok) {
                    clean = false;
                    match sweep {
                        Sweep::Report => {
                            for (item, ok) in items.iter().zip(&verdicts) {
                                if !*ok {
                                    diagnostics.error(
                                        ViolationKind::UnsupportedValue,
                                        format!(
                                            "{key} doesn't yet support keyword '{}'",
                                            display_value(item)
                                        ),
                                    );
                                }
                            }
                        }
                        Sweep::Remove => {
                            let old = std::mem::take(items);
                            for (item, ok) in old.into_iter().zip(verdicts) {
                                if ok {
                                    items.push(item);
                                } else {
                                    let shown = display_value(&item);
                                    tracing::info!(
                                        key,
                                        value = %shown,
                                        "removed unsupported value"
                                    );
                                    diagnostics.removed(format!(
                                        "\"{key}\" doesn't support keyword: \"{shown}\""
                                    ));
                                }
                            }
                        }
                    }
                }
            }

            if sweep == Sweep::Report {
                if let Some(recommended) = &constraint.recommended_value {
                    recommend_value(diagnostics, key, recommended, value);
                }
            }
        }

        clean
    }
}

fn check_host_pattern(diagnostics: &mut Diagnostics, value: &str) -> bool {
    let ok = is_valid_host_pattern(value);
    if !ok {
        diagnostics.error(
            ViolationKind::InvalidHostPattern,
            format!("{value} is invalid on permissions host pattern"),
        );
    }
    ok
}

fn recommend_value(
    diagnostics: &mut Diagnostics,
    key: &str,
    recommended: &RecommendedValue,
    current: &Value,
) {
    match recommended {
        RecommendedValue::Fields(fields) => {
            for (field, wanted) in fields {
                let actual = current.get(field);
                if actual != Some(wanted) {
                    diagnostics.recommend(format!(
                        "{} is better than {} on {field} of {key}",
                        display_value(wanted),
                        actual.map_or_else(|| "(unset)".to_string(), display_value)
                    ));
                }
            }
        }
        RecommendedValue::Value(wanted) => {
            if wanted != current {
                diagnostics.recommend(format!(
                    "{} is better than {} on {key}",
                    display_value(wanted),
                    display_value(current)
                ));
            }
        }
    }
}

fn is_permission_key(key: &str) -> bool {
    key == PERMISSIONS_KEY || key == OPTIONAL_PERMISSIONS_KEY
}

/// JSON-level truthiness: `null`, `false`, `0` and `""` are falsy,
/// everything else (including empty arrays and objects) is truthy.
pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Strings render bare, everything else as compact JSON.
pub(crate) fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
