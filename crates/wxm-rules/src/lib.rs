//! # wxm-rules: Manifest Validation & Repair
//!
//! Validates a WebExtension manifest against the rules of one browser
//! target and repairs what can be repaired.
//!
//! ## Rules (`table`, `resolve`)
//!
//! Each target has a small table of named groups: `required`,
//! `recommend`, and any number of others that only widen the set of
//! allowed keys. Entries may carry a [`Constraint`] restricting nested
//! properties, array values, or recommending a preferred value. Groups can
//! `inherit` from the base target. [`resolve`] flattens a table into a
//! [`ResolvedRuleSet`] once, before any document is looked at.
//!
//! ## Validation (`engine`)
//!
//! [`ManifestFormatter`] binds a document to a resolved rule set and
//! accumulates [`Diagnostics`]: errors (which decide validity),
//! recommendations (advisory), and the removal log.
//!
//! ## Repair (`repair`)
//!
//! `fill_required`, `delete_unsupported_keys` and
//! `delete_unsupported_properties` mutate the document and re-validate.
//!
//! ## Crate Policy
//!
//! - Depends only on `wxm-core` internally.
//! - No I/O. Documents arrive already parsed.
//! - Validation findings are diagnostics, never `Err`.
//! - No `.unwrap()` outside tests. The one `expect` form allowed compiles a
//!   literal regex inside a `OnceLock` static, where failure is a bug in
//!   the literal.

pub mod diagnostics;
pub mod engine;
pub mod extension_id;
pub mod host_pattern;
pub mod repair;
pub mod resolve;
pub mod table;

pub use diagnostics::{Diagnostics, Violation, ViolationKind};
pub use engine::ManifestFormatter;
pub use extension_id::{is_guid, is_valid_extension_id};
pub use host_pattern::{is_valid_host_pattern, ALL_URLS};
pub use repair::{default_value, wrap_extension_id, DEFAULT_MANIFEST_VERSION};
pub use resolve::{resolve, resolve_with, ConstrainedRule, ResolvedRuleSet, RuleGroup};
pub use table::{
    Constraint, GroupRules, RawGroup, RecommendedValue, RuleEntry, RuleTable, APPLICATIONS_KEY,
    MANIFEST_VERSION_KEY, OPTIONAL_PERMISSIONS_KEY, PERMISSIONS_KEY, RECOMMEND_GROUP,
    REQUIRED_GROUP,
};
