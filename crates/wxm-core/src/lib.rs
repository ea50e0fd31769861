//! # wxm-core: Foundational Types for wxm
//!
//! Defines the primitives shared by the rule engine and the CLI: the
//! browser [`Target`] enumeration, the [`Document`] representation of a
//! parsed manifest, the project-defaults merge, and the error hierarchy.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `wxm-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.
//! - I/O happens here and in the CLI only. The rule engine never touches
//!   the filesystem.

pub mod document;
pub mod error;
pub mod target;

pub use document::{
    load_document, load_package, merge_package_defaults, parse_document, Document,
    INHERITABLE_FIELDS, INHERIT_MARKER,
};
pub use error::{WxmError, WxmResult};
pub use target::Target;
