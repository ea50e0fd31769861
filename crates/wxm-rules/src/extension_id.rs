//! # Firefox Extension Identifiers
//!
//! Firefox identifies an add-on by `applications.gecko.id`. Only the
//! email-like form is accepted here: a local part of letters, digits, `.`
//! and `-`, an `@`, then a domain with at least one dotted suffix. `+` is
//! not allowed anywhere.
//!
//! GUID-shaped identifiers are rejected outright, even if they would also
//! satisfy the email-like grammar. The two conditions are checked in that
//! order.

use std::sync::OnceLock;

use regex::Regex;
use uuid::Uuid;

fn extension_id_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9.\-]+@[A-Za-z0-9\-]+(\.[A-Za-z\-]+)+$")
            .expect("extension id regex is valid")
    })
}

/// True for GUID/UUID strings in any of the usual spellings (bare,
/// hyphenated, braced, or `urn:uuid:`).
pub fn is_guid(value: &str) -> bool {
    Uuid::parse_str(value).is_ok()
}

/// True if `id` is an acceptable email-like extension identifier.
pub fn is_valid_extension_id(id: &str) -> bool {
    extension_id_re().is_match(id) && !is_guid(id)
}
