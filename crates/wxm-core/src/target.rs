//! # Browser Targets
//!
//! The fixed set of platforms a manifest can be validated for. Every rule
//! table is keyed by one of these, and every `match` on `Target` must be
//! exhaustive, so adding a browser forces the rule table to grow with it.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::WxmError;

/// A browser whose extension format governs validation.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Target {
    /// Google Chrome. Other Chromium targets inherit groups from it.
    Chrome,
    /// Mozilla Firefox (WebExtensions).
    #[default]
    Firefox,
    /// Opera.
    Opera,
    /// Microsoft Edge.
    Edge,
}

impl Target {
    /// Returns every target in canonical order.
    pub fn all_targets() -> &'static [Target] {
        &[Self::Chrome, Self::Firefox, Self::Opera, Self::Edge]
    }

    /// Returns the lowercase identifier for this target.
    ///
    /// Matches the serde representation and the names accepted by
    /// [`Target::from_str`].
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Chrome => "chrome",
            Self::Firefox => "firefox",
            Self::Opera => "opera",
            Self::Edge => "edge",
        }
    }
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Target {
    type Err = WxmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "chrome" => Ok(Self::Chrome),
            "firefox" => Ok(Self::Firefox),
            "opera" => Ok(Self::Opera),
            "edge" => Ok(Self::Edge),
            other => Err(WxmError::Configuration(format!(
                "unknown target: {other:?} (expected one of chrome, firefox, opera, edge)"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_as_str_roundtrip() {
        for target in Target::all_targets() {
            let parsed: Target = target.as_str().parse().unwrap();
            assert_eq!(*target, parsed);
        }
    }

    #[test]
    fn test_from_str_invalid() {
        assert!("safari".parse::<Target>().is_err());
        assert!("Firefox".parse::<Target>().is_err()); // case-sensitive
        assert!("".parse::<Target>().is_err());
    }

    #[test]
    fn test_unknown_target_is_configuration_error() {
        let err = "netscape".parse::<Target>().unwrap_err();
        assert!(matches!(err, WxmError::Configuration(_)));
        assert!(err.to_string().contains("netscape"));
    }

    #[test]
    fn test_serde_format_matches_as_str() {
        for target in Target::all_targets() {
            let json = serde_json::to_string(target).unwrap();
            assert_eq!(json, format!("\"{}\"", target.as_str()));
        }
    }

    #[test]
    fn test_default_is_firefox() {
        assert_eq!(Target::default(), Target::Firefox);
    }
}
