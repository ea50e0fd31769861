//! # Rule Tables
//!
//! Declarative, per-browser description of which manifest keys are
//! required, recommended, or merely allowed, and which keys carry further
//! constraints on their nested properties or values.
//!
//! A target's table is a list of named groups. Two names are significant
//! to the engine: `required` and `recommend`. Every other group name
//! (`optional`, `permissions`, a browser-specific bucket, ...) only
//! contributes valid keys and constraints.
//!
//! A group may be the [`GroupRules::Inherit`] marker instead of a list of
//! entries, meaning "use the base target's group of the same name". The
//! base target of the built-in table is Chrome. Resolution happens once, in
//! [`crate::resolve`].

use std::collections::{BTreeMap, BTreeSet};
use std::sync::OnceLock;

use serde_json::{json, Map, Value};
use wxm_core::Target;

/// Group whose keys must be present.
pub const REQUIRED_GROUP: &str = "required";
/// Group whose keys should be present (advisory).
pub const RECOMMEND_GROUP: &str = "recommend";
/// Top-level permissions key and the group that defines its constraint.
pub const PERMISSIONS_KEY: &str = "permissions";
/// Optional permissions share the constraint of [`PERMISSIONS_KEY`].
pub const OPTIONAL_PERMISSIONS_KEY: &str = "optional_permissions";
/// Firefox extension identifier container.
pub const APPLICATIONS_KEY: &str = "applications";
/// Manifest schema version key.
pub const MANIFEST_VERSION_KEY: &str = "manifest_version";

/// Per-key sub-rules.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Constraint {
    /// Nested object properties that must not appear under the key.
    pub unsupported_properties: Option<BTreeSet<String>>,
    /// Closed set of permitted array elements.
    pub allowed_values: Option<BTreeSet<String>>,
    /// Advisory preferred value.
    pub recommended_value: Option<RecommendedValue>,
}

/// Preferred value for a key: either the whole value, or per-property
/// values when the key holds an object.
#[derive(Debug, Clone, PartialEq)]
pub enum RecommendedValue {
    /// Compared against the key's value with plain equality.
    Value(Value),
    /// Compared property by property against the key's object value.
    Fields(Map<String, Value>),
}

impl Constraint {
    /// An empty constraint.
    pub fn new() -> Self {
        Self::default()
    }

    /// Forbid the given nested properties.
    pub fn unsupported_properties<I, S>(mut self, props: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.unsupported_properties = Some(props.into_iter().map(Into::into).collect());
        self
    }

    /// Restrict array elements to the given values.
    pub fn allowed_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_values = Some(values.into_iter().map(Into::into).collect());
        self
    }

    /// Recommend a value. Objects are compared field by field.
    pub fn recommended_value(mut self, value: Value) -> Self {
        self.recommended_value = Some(match value {
            Value::Object(fields) => RecommendedValue::Fields(fields),
            other => RecommendedValue::Value(other),
        });
        self
    }

    /// True if the constraint restricts nothing.
    pub fn is_empty(&self) -> bool {
        self.unsupported_properties.is_none()
            && self.allowed_values.is_none()
            && self.recommended_value.is_none()
    }
}

/// One entry of a rule group.
#[derive(Debug, Clone, PartialEq)]
pub enum RuleEntry {
    /// A bare key name.
    Key(String),
    /// A key with sub-rules.
    Constrained {
        /// Top-level manifest key.
        key: String,
        /// Rules applied to the key's value.
        constraint: Constraint,
    },
}

impl RuleEntry {
    /// The top-level manifest key this entry names.
    pub fn key(&self) -> &str {
        match self {
            Self::Key(key) | Self::Constrained { key, .. } => key,
        }
    }

    /// The attached constraint, if any.
    pub fn constraint(&self) -> Option<&Constraint> {
        match self {
            Self::Key(_) => None,
            Self::Constrained { constraint, .. } => Some(constraint),
        }
    }
}

/// Shorthand for [`RuleEntry::Key`].
pub fn key(name: &str) -> RuleEntry {
    RuleEntry::Key(name.to_string())
}

/// Shorthand for [`RuleEntry::Constrained`].
pub fn constrained(name: &str, constraint: Constraint) -> RuleEntry {
    RuleEntry::Constrained {
        key: name.to_string(),
        constraint,
    }
}

/// Contents of a raw group.
#[derive(Debug, Clone, PartialEq)]
pub enum GroupRules {
    /// The group's own entries.
    Entries(Vec<RuleEntry>),
    /// Copy the base target's group of the same name.
    Inherit,
}

/// A named, unresolved rule group.
#[derive(Debug, Clone, PartialEq)]
pub struct RawGroup {
    /// Group name (`required`, `recommend`, `optional`, ...).
    pub name: String,
    /// Entries or the inherit marker.
    pub rules: GroupRules,
}

impl RawGroup {
    /// A group with explicit entries.
    pub fn entries(name: &str, entries: Vec<RuleEntry>) -> Self {
        Self {
            name: name.to_string(),
            rules: GroupRules::Entries(entries),
        }
    }

    /// A group that inherits from the base target.
    pub fn inherit(name: &str) -> Self {
        Self {
            name: name.to_string(),
            rules: GroupRules::Inherit,
        }
    }

    /// A group of bare keys.
    pub fn keys(name: &str, keys: &[&str]) -> Self {
        Self::entries(name, keys.iter().map(|k| key(k)).collect())
    }
}

/// Static mapping from target to raw rule groups.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleTable {
    base: Target,
    targets: BTreeMap<Target, Vec<RawGroup>>,
}

impl RuleTable {
    /// An empty table whose `inherit` groups resolve against `base`.
    pub fn new(base: Target) -> Self {
        Self {
            base,
            targets: BTreeMap::new(),
        }
    }

    /// Add or replace a target's groups.
    pub fn with_target(mut self, target: Target, groups: Vec<RawGroup>) -> Self {
        self.targets.insert(target, groups);
        self
    }

    /// The built-in table covering every [`Target`].
    pub fn builtin() -> &'static RuleTable {
        static TABLE: OnceLock<RuleTable> = OnceLock::new();
        TABLE.get_or_init(|| {
            RuleTable::new(Target::Chrome)
                .with_target(Target::Chrome, chrome_groups())
                .with_target(Target::Firefox, firefox_groups())
                .with_target(Target::Opera, opera_groups())
                .with_target(Target::Edge, edge_groups())
        })
    }

    /// Target that `inherit` groups copy from.
    pub fn base(&self) -> Target {
        self.base
    }

    /// A target's raw groups in declaration order.
    pub fn groups(&self, target: Target) -> Option<&[RawGroup]> {
        self.targets.get(&target).map(Vec::as_slice)
    }

    /// A single raw group of a target.
    pub fn group(&self, target: Target, name: &str) -> Option<&RawGroup> {
        self.groups(target)?.iter().find(|g| g.name == name)
    }
}

// ── Built-in tables ─────────────────────────────────────────────────

const CHROME_OPTIONAL_KEYS: &[&str] = &[
    "author",
    "automation",
    "browser_action",
    "chrome_settings_overrides",
    "chrome_ui_overrides",
    "chrome_url_overrides",
    "commands",
    "content_capabilities",
    "content_scripts",
    "content_security_policy",
    "converted_from_user_script",
    "current_locale",
    "devtools_page",
    "event_rules",
    "externally_connectable",
    "file_browser_handlers",
    "file_system_provider_capabilities",
    "homepage_url",
    "import",
    "incognito",
    "input_components",
    "key",
    "minimum_chrome_version",
    "nacl_modules",
    "oauth2",
    "offline_enabled",
    "omnibox",
    "options_page",
    "options_ui",
    "page_action",
    "platforms",
    "plugins",
    "requirements",
    "sandbox",
    "short_name",
    "signature",
    "spellcheck",
    "storage",
    "system_indicator",
    "tts_engine",
    "update_url",
    "version_name",
    "web_accessible_resources",
];

const CHROME_PERMISSIONS: &[&str] = &[
    "activeTab",
    "alarms",
    "background",
    "bookmarks",
    "browsingData",
    "certificateProvider",
    "clipboardRead",
    "clipboardWrite",
    "contentSettings",
    "contextMenus",
    "cookies",
    "debugger",
    "declarativeContent",
    "declarativeWebRequest",
    "desktopCapture",
    "documentScan",
    "downloads",
    "enterprise.platformKeys",
    "experimental",
    "fileBrowserHandler",
    "fileSystemProvider",
    "fontSettings",
    "gcm",
    "geolocation",
    "history",
    "identity",
    "idle",
    "idltest",
    "management",
    "nativeMessaging",
    "networking.config",
    "notifications",
    "pageCapture",
    "platformKeys",
    "power",
    "printerProvider",
    "privacy",
    "processes",
    "proxy",
    "sessions",
    "signedInDevices",
    "storage",
    "system.cpu",
    "system.display",
    "system.memory",
    "system.storage",
    "tabCapture",
    "tabs",
    "topSites",
    "tts",
    "ttsEngine",
    "unlimitedStorage",
    "vpnProvider",
    "wallpaper",
    "webNavigation",
    "webRequest",
    "webRequestBlocking",
];

const FIREFOX_OPTIONAL_KEYS: &[&str] = &[
    "author",
    "browser_action",
    "chrome_settings_overrides",
    "commands",
    "content_scripts",
    "content_security_policy",
    "developer",
    "devtools_page",
    "homepage_url",
    "omnibox",
    "page_action",
    "protocol_handlers",
    "short_name",
    "sidebar_action",
    "theme",
    "web_accessible_resources",
];

const FIREFOX_PERMISSIONS: &[&str] = &[
    "activeTab",
    "alarms",
    "bookmarks",
    "browserSettings",
    "browsingData",
    "clipboardRead",
    "clipboardWrite",
    "contextMenus",
    "contextualIdentities",
    "cookies",
    "downloads",
    "downloads.open",
    "find",
    "geolocation",
    "history",
    "identity",
    "idle",
    "management",
    "menus",
    "nativeMessaging",
    "notifications",
    "pkcs11",
    "privacy",
    "proxy",
    "sessions",
    "storage",
    "tabs",
    "theme",
    "topSites",
    "unlimitedStorage",
    "webNavigation",
    "webRequest",
    "webRequestBlocking",
];

const EDGE_OPTIONAL_KEYS: &[&str] = &[
    "browser_action",
    "browser_specific_settings",
    "content_scripts",
    "content_security_policy",
    "default_locale",
    "key",
    "options_page",
    "page_action",
    "short_name",
    "version_name",
    "web_accessible_resources",
];

const EDGE_PERMISSIONS: &[&str] = &[
    "activeTab",
    "contextMenus",
    "cookies",
    "geolocation",
    "idle",
    "notifications",
    "storage",
    "tabs",
    "unlimitedStorage",
    "webNavigation",
    "webRequest",
    "webRequestBlocking",
];

fn with_constrained(keys: &[&str], extra: Vec<RuleEntry>) -> Vec<RuleEntry> {
    let mut entries: Vec<RuleEntry> = keys.iter().map(|k| key(k)).collect();
    entries.extend(extra);
    entries
}

fn chrome_groups() -> Vec<RawGroup> {
    vec![
        RawGroup::keys(REQUIRED_GROUP, &[MANIFEST_VERSION_KEY, "name", "version"]),
        RawGroup::keys(RECOMMEND_GROUP, &["default_locale", "description", "icons"]),
        RawGroup::entries(
            "optional",
            with_constrained(
                CHROME_OPTIONAL_KEYS,
                vec![constrained(
                    "background",
                    Constraint::new().recommended_value(json!({ "persistent": false })),
                )],
            ),
        ),
        RawGroup::entries(
            PERMISSIONS_KEY,
            vec![constrained(
                PERMISSIONS_KEY,
                Constraint::new().allowed_values(CHROME_PERMISSIONS.iter().copied()),
            )],
        ),
        RawGroup::keys(OPTIONAL_PERMISSIONS_KEY, &[OPTIONAL_PERMISSIONS_KEY]),
    ]
}

fn firefox_groups() -> Vec<RawGroup> {
    vec![
        RawGroup::keys(
            REQUIRED_GROUP,
            &[MANIFEST_VERSION_KEY, "name", "version", APPLICATIONS_KEY],
        ),
        RawGroup::keys(RECOMMEND_GROUP, &["default_locale", "description", "icons"]),
        RawGroup::entries(
            "optional",
            with_constrained(
                FIREFOX_OPTIONAL_KEYS,
                vec![
                    constrained(
                        "background",
                        Constraint::new().unsupported_properties(["persistent"]),
                    ),
                    constrained(
                        "chrome_url_overrides",
                        Constraint::new().unsupported_properties(["bookmarks", "history"]),
                    ),
                    constrained(
                        "options_ui",
                        Constraint::new().unsupported_properties(["chrome_style"]),
                    ),
                    constrained(
                        "incognito",
                        Constraint::new().recommended_value(json!("spanning")),
                    ),
                ],
            ),
        ),
        RawGroup::entries(
            PERMISSIONS_KEY,
            vec![constrained(
                PERMISSIONS_KEY,
                Constraint::new().allowed_values(FIREFOX_PERMISSIONS.iter().copied()),
            )],
        ),
        RawGroup::keys(OPTIONAL_PERMISSIONS_KEY, &[OPTIONAL_PERMISSIONS_KEY]),
    ]
}

fn opera_groups() -> Vec<RawGroup> {
    vec![
        RawGroup::inherit(REQUIRED_GROUP),
        RawGroup::inherit(RECOMMEND_GROUP),
        RawGroup::inherit("optional"),
        RawGroup::keys("opera", &["developer", "sidebar_action"]),
        RawGroup::inherit(PERMISSIONS_KEY),
        RawGroup::keys(OPTIONAL_PERMISSIONS_KEY, &[OPTIONAL_PERMISSIONS_KEY]),
    ]
}

fn edge_groups() -> Vec<RawGroup> {
    vec![
        RawGroup::keys(REQUIRED_GROUP, &["author", "name", "version"]),
        RawGroup::inherit(RECOMMEND_GROUP),
        RawGroup::entries(
            "optional",
            with_constrained(
                EDGE_OPTIONAL_KEYS,
                vec![constrained(
                    "background",
                    Constraint::new().recommended_value(json!({ "persistent": true })),
                )],
            ),
        ),
        RawGroup::entries(
            PERMISSIONS_KEY,
            vec![constrained(
                PERMISSIONS_KEY,
                Constraint::new().allowed_values(EDGE_PERMISSIONS.iter().copied()),
            )],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_covers_every_target() {
        let table = RuleTable::builtin();
        for target in Target::all_targets() {
            assert!(table.groups(*target).is_some(), "no table for {target}");
        }
    }

    #[test]
    fn base_target_has_no_inherit_groups() {
        let table = RuleTable::builtin();
        let groups = table.groups(table.base()).unwrap();
        assert!(groups.iter().all(|g| g.rules != GroupRules::Inherit));
    }

    #[test]
    fn recommended_object_becomes_fields() {
        let c = Constraint::new().recommended_value(json!({ "persistent": false }));
        assert!(matches!(c.recommended_value, Some(RecommendedValue::Fields(_))));
        let c = Constraint::new().recommended_value(json!("spanning"));
        assert!(matches!(c.recommended_value, Some(RecommendedValue::Value(_))));
    }

    #[test]
    fn rule_entry_accessors() {
        let entry = constrained(
            "background",
            Constraint::new().unsupported_properties(["persistent"]),
        );
        assert_eq!(entry.key(), "background");
        assert!(entry.constraint().is_some());
        assert_eq!(key("name").key(), "name");
        assert!(key("name").constraint().is_none());
    }

    #[test]
    fn empty_constraint() {
        assert!(Constraint::new().is_empty());
        assert!(!Constraint::new().allowed_values(["tabs"]).is_empty());
    }

    #[test]
    fn firefox_requires_applications() {
        let group = RuleTable::builtin()
            .group(Target::Firefox, REQUIRED_GROUP)
            .unwrap();
        match &group.rules {
            GroupRules::Entries(entries) => {
                assert!(entries.iter().any(|e| e.key() == APPLICATIONS_KEY));
            }
            GroupRules::Inherit => panic!("firefox required group should be explicit"),
        }
    }
}
