//! # Rule Resolution
//!
//! Flattens a target's raw groups into a [`ResolvedRuleSet`]: the set of
//! valid top-level keys plus the list of constrained rules. After
//! resolution no `inherit` marker remains, and every key named by any
//! group is a valid key.
//!
//! Two groups get special handling:
//!
//! - `optional_permissions`, when a `permissions` group exists, becomes a
//!   single rule carrying the permissions constraint, so both keys accept
//!   exactly the same values.
//! - An `inherit` group is replaced by the base target's group of the same
//!   name.

use std::collections::BTreeSet;

use wxm_core::{Target, WxmError, WxmResult};

use crate::table::{
    Constraint, GroupRules, RuleEntry, RuleTable, OPTIONAL_PERMISSIONS_KEY,
    PERMISSIONS_KEY, RECOMMEND_GROUP, REQUIRED_GROUP,
};

/// A group after inheritance has been expanded.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleGroup {
    /// Group name.
    pub name: String,
    /// Resolved entries.
    pub entries: Vec<RuleEntry>,
}

/// A key together with the constraint it must satisfy.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstrainedRule {
    /// Top-level manifest key.
    pub key: String,
    /// Sub-rules for the key's value.
    pub constraint: Constraint,
}

/// The flattened rules for a single target.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedRuleSet {
    target: Target,
    groups: Vec<RuleGroup>,
    valid_keys: BTreeSet<String>,
    constrained_rules: Vec<ConstrainedRule>,
}

impl ResolvedRuleSet {
    /// Target these rules were resolved for.
    pub fn target(&self) -> Target {
        self.target
    }

    /// Resolved groups in table order.
    pub fn groups(&self) -> &[RuleGroup] {
        &self.groups
    }

    /// A resolved group by name.
    pub fn group(&self, name: &str) -> Option<&RuleGroup> {
        self.groups.iter().find(|g| g.name == name)
    }

    /// Union of every key named by any group.
    pub fn valid_keys(&self) -> &BTreeSet<String> {
        &self.valid_keys
    }

    /// True if `key` may appear at the top level of a manifest.
    pub fn is_valid_key(&self, key: &str) -> bool {
        self.valid_keys.contains(key)
    }

    /// Every rule that carries a constraint, in table order.
    pub fn constrained_rules(&self) -> &[ConstrainedRule] {
        &self.constrained_rules
    }

    /// Keys of the `required` group.
    pub fn required_keys(&self) -> Vec<&str> {
        self.group_keys(REQUIRED_GROUP)
    }

    /// Keys of the `recommend` group.
    pub fn recommended_keys(&self) -> Vec<&str> {
        self.group_keys(RECOMMEND_GROUP)
    }

    fn group_keys(&self, name: &str) -> Vec<&str> {
        self.group(name)
            .map(|g| g.entries.iter().map(RuleEntry::key).collect())
            .unwrap_or_default()
    }
}

/// Resolve `target` against the built-in table.
///
/// # Errors
///
/// See [`resolve_with`].
pub fn resolve(target: Target) -> WxmResult<ResolvedRuleSet> {
    resolve_with(RuleTable::builtin(), target)
}

/// Resolve `target` against an arbitrary table.
///
/// # Errors
///
/// Returns `WxmError::Configuration` if the table has no entry for
/// `target`, if an `inherit` group has no counterpart in the base target,
/// or if the result lacks a `required` or `recommend` group.
pub fn resolve_with(table: &RuleTable, target: Target) -> WxmResult<ResolvedRuleSet> {
    let raw = table.groups(target).ok_or_else(|| {
        WxmError::Configuration(format!("no rule table for target '{target}'"))
    })?;
    let has_permissions = raw.iter().any(|g| g.name == PERMISSIONS_KEY);

    let mut groups = Vec::with_capacity(raw.len());
    let mut valid_keys = BTreeSet::new();
    let mut constrained_rules = Vec::new();

    for group in raw {
        let entries = if group.name == OPTIONAL_PERMISSIONS_KEY && has_permissions {
            vec![optional_permissions_rule(table, target)?]
        } else {
            match &group.rules {
                GroupRules::Entries(entries) => entries.clone(),
                GroupRules::Inherit => inherited_entries(table, target, &group.name)?.to_vec(),
            }
        };

        for entry in &entries {
            valid_keys.insert(entry.key().to_string());
            if let RuleEntry::Constrained { key, constraint } = entry {
                constrained_rules.push(ConstrainedRule {
                    key: key.clone(),
                    constraint: constraint.clone(),
                });
            }
        }
        groups.push(RuleGroup {
            name: group.name.clone(),
            entries,
        });
    }

    for name in [REQUIRED_GROUP, RECOMMEND_GROUP] {
        if !groups.iter().any(|g| g.name == name) {
            return Err(WxmError::Configuration(format!(
                "rule table for '{target}' has no '{name}' group"
            )));
        }
    }

    tracing::debug!(
        target_browser = %target,
        valid_keys = valid_keys.len(),
        constrained_rules = constrained_rules.len(),
        "resolved rule set"
    );

    Ok(ResolvedRuleSet {
        target,
        groups,
        valid_keys,
        constrained_rules,
    })
}

fn inherited_entries<'t>(
    table: &'t RuleTable,
    target: Target,
    name: &str,
) -> WxmResult<&'t [RuleEntry]> {
    let base = table.base();
    match table.group(base, name).map(|g| &g.rules) {
        Some(GroupRules::Entries(entries)) => Ok(entries.as_slice()),
        Some(GroupRules::Inherit) => Err(WxmError::Configuration(format!(
            "group '{name}' of base target '{base}' is itself 'inherit'"
        ))),
        None => Err(WxmError::Configuration(format!(
            "group '{name}' of '{target}' inherits from '{base}', which has no such group"
        ))),
    }
}

/// Build the `optional_permissions` rule from the target's `permissions`
/// group, following `inherit` if needed. A permissions group with no
/// constraint yields a bare key.
fn optional_permissions_rule(table: &RuleTable, target: Target) -> WxmResult<RuleEntry> {
    let entries: &[RuleEntry] = match table.group(target, PERMISSIONS_KEY).map(|g| &g.rules) {
        Some(GroupRules::Entries(entries)) => entries.as_slice(),
        Some(GroupRules::Inherit) => inherited_entries(table, target, PERMISSIONS_KEY)?,
        None => &[],
    };
    let constraint = entries
        .iter()
        .filter(|e| e.key() == PERMISSIONS_KEY)
        .find_map(RuleEntry::constraint);

    Ok(match constraint {
        Some(constraint) => RuleEntry::Constrained {
            key: OPTIONAL_PERMISSIONS_KEY.to_string(),
            constraint: constraint.clone(),
        },
        None => RuleEntry::Key(OPTIONAL_PERMISSIONS_KEY.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{constrained, key, RawGroup, APPLICATIONS_KEY};

    #[test]
    fn every_group_key_is_valid_for_every_target() {
        for target in Target::all_targets() {
            let rules = resolve(*target).unwrap();
            for group in rules.groups() {
                for entry in &group.entries {
                    assert!(
                        rules.is_valid_key(entry.key()),
                        "{target}: key '{}' of group '{}' not in valid keys",
                        entry.key(),
                        group.name
                    );
                }
            }
            for rule in rules.constrained_rules() {
                assert!(rules.is_valid_key(&rule.key));
            }
        }
    }

    #[test]
    fn inherit_copies_base_group() {
        let opera = resolve(Target::Opera).unwrap();
        let chrome = resolve(Target::Chrome).unwrap();
        assert_eq!(opera.required_keys(), chrome.required_keys());
        assert_eq!(opera.recommended_keys(), chrome.recommended_keys());
        assert_eq!(
            opera.group("optional").unwrap().entries,
            chrome.group("optional").unwrap().entries
        );
    }

    #[test]
    fn optional_permissions_share_permissions_constraint() {
        for target in [Target::Chrome, Target::Firefox, Target::Opera] {
            let rules = resolve(target).unwrap();
            let find = |k: &str| {
                rules
                    .constrained_rules()
                    .iter()
                    .find(|r| r.key == k)
                    .map(|r| r.constraint.clone())
            };
            let permissions = find(PERMISSIONS_KEY).expect("permissions constraint");
            let optional = find(OPTIONAL_PERMISSIONS_KEY).expect("optional_permissions constraint");
            assert_eq!(permissions, optional, "{target}");
        }
    }

    #[test]
    fn edge_has_no_optional_permissions() {
        let edge = resolve(Target::Edge).unwrap();
        assert!(!edge.is_valid_key(OPTIONAL_PERMISSIONS_KEY));
        assert!(edge.is_valid_key("author"));
    }

    #[test]
    fn applications_only_valid_for_firefox() {
        for target in Target::all_targets() {
            let rules = resolve(*target).unwrap();
            assert_eq!(
                rules.is_valid_key(APPLICATIONS_KEY),
                *target == Target::Firefox,
                "{target}"
            );
        }
    }

    #[test]
    fn missing_target_is_configuration_error() {
        let table = RuleTable::new(Target::Chrome)
            .with_target(Target::Chrome, vec![RawGroup::keys(REQUIRED_GROUP, &["name"])]);
        let err = resolve_with(&table, Target::Firefox).unwrap_err();
        assert!(matches!(err, WxmError::Configuration(_)));
    }

    #[test]
    fn inherit_without_base_group_is_configuration_error() {
        let table = RuleTable::new(Target::Chrome)
            .with_target(
                Target::Chrome,
                vec![
                    RawGroup::keys(REQUIRED_GROUP, &["name"]),
                    RawGroup::keys(RECOMMEND_GROUP, &[]),
                ],
            )
            .with_target(
                Target::Edge,
                vec![
                    RawGroup::keys(REQUIRED_GROUP, &["name"]),
                    RawGroup::keys(RECOMMEND_GROUP, &[]),
                    RawGroup::inherit("optional"),
                ],
            );
        let err = resolve_with(&table, Target::Edge).unwrap_err();
        assert!(err.to_string().contains("optional"));
    }

    #[test]
    fn missing_required_group_is_configuration_error() {
        let table = RuleTable::new(Target::Chrome)
            .with_target(Target::Chrome, vec![RawGroup::keys(RECOMMEND_GROUP, &[])]);
        let err = resolve_with(&table, Target::Chrome).unwrap_err();
        assert!(err.to_string().contains("required"));
    }

    #[test]
    fn optional_permissions_without_constraint_is_bare_key() {
        let table = RuleTable::new(Target::Chrome).with_target(
            Target::Chrome,
            vec![
                RawGroup::keys(REQUIRED_GROUP, &[]),
                RawGroup::keys(RECOMMEND_GROUP, &[]),
                RawGroup::entries(PERMISSIONS_KEY, vec![key(PERMISSIONS_KEY)]),
                RawGroup::keys(OPTIONAL_PERMISSIONS_KEY, &[]),
            ],
        );
        let rules = resolve_with(&table, Target::Chrome).unwrap();
        assert!(rules.is_valid_key(OPTIONAL_PERMISSIONS_KEY));
        assert!(rules.constrained_rules().is_empty());
    }

    #[test]
    fn constrained_entries_populate_rules() {
        let table = RuleTable::new(Target::Chrome).with_target(
            Target::Chrome,
            vec![
                RawGroup::keys(REQUIRED_GROUP, &[]),
                RawGroup::keys(RECOMMEND_GROUP, &[]),
                RawGroup::entries(
                    "optional",
                    vec![constrained(
                        "background",
                        Constraint::new().unsupported_properties(["persistent"]),
                    )],
                ),
            ],
        );
        let rules = resolve_with(&table, Target::Chrome).unwrap();
        assert_eq!(rules.constrained_rules().len(), 1);
        assert_eq!(rules.constrained_rules()[0].key, "background");
    }
}
