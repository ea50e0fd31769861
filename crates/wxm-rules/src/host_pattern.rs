//! # Host Permission Patterns
//!
//! Grammar for host permissions (`scheme://host/path`), used to accept
//! permission entries that are URL patterns rather than named APIs.
//!
//! - `scheme` is one of `http`, `https`, `file`, `ftp`, or `*`.
//! - `host` is empty, `*`, or an optional `*.` prefix followed by
//!   characters other than `/` and `*`.
//! - `path` is everything after the `/` that ends the host, and may be
//!   empty but the `/` itself is mandatory.
//!
//! The literal `<all_urls>` matches everything and is always valid.

use std::sync::OnceLock;

use regex::Regex;

/// Wildcard permission matching every URL.
pub const ALL_URLS: &str = "<all_urls>";

fn host_pattern_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(http|https|file|ftp|\*)://(\*|(\*\.)?[^/*]+)?/.*$")
            .expect("host pattern regex is valid")
    })
}

/// True if `value` is `<all_urls>` or a well-formed host pattern.
pub fn is_valid_host_pattern(value: &str) -> bool {
    value == ALL_URLS || host_pattern_re().is_match(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_documented_patterns() {
        for pattern in [
            "<all_urls>",
            "http://*/*",
            "http://*/foo*",
            "https://*.google.com/foo*bar",
            "http://example.org/foo/bar.html",
            "file:///foo*",
            "http://127.0.0.1/*",
            "*://mail.google.com/*",
        ] {
            assert!(is_valid_host_pattern(pattern), "{pattern} should be valid");
        }
    }

    #[test]
    fn rejects_malformed_patterns() {
        for pattern in [
            "http:/bar",
            "foo://*",
            "http://www.google.com",
            "http://*foo/bar",
            "http://foo.*.bar/baz",
            "",
            "tabs",
        ] {
            assert!(!is_valid_host_pattern(pattern), "{pattern} should be invalid");
        }
    }

    #[test]
    fn all_urls_must_be_exact() {
        assert!(!is_valid_host_pattern("<all_urls> "));
        assert!(!is_valid_host_pattern("<ALL_URLS>"));
    }
}
