//! # wxm-cli: CLI Tool for wxm
//!
//! Provides the `wxm` command-line interface over the manifest rule engine.
//!
//! ## Subcommands
//!
//! - `wxm check`: Validate a manifest and print its diagnostics.
//! - `wxm fix`: Apply repairs and write the resulting manifest.
//! - `wxm targets`: List supported browsers and their rule summaries.
//!
//! ```bash
//! wxm check manifest.json --target chrome
//! wxm fix manifest.json --default-manifest-version --delete-unsupported-keys --in-place
//! wxm --config wxm.yaml targets
//! ```
//!
//! Every handler returns an exit code: 0 when the manifest ends valid,
//! 1 when it does not. Operational failures propagate as `Err` and exit 2.

pub mod check;
pub mod config;
pub mod fix;
pub mod targets;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use wxm_core::{load_document, load_package, merge_package_defaults, Target};
use wxm_rules::ManifestFormatter;

pub use config::CliConfig;

/// Arguments shared by subcommands that operate on one manifest.
#[derive(Args, Debug, Clone)]
pub struct ManifestArgs {
    /// Path to the manifest.json to process.
    #[arg(value_name = "MANIFEST")]
    pub manifest: PathBuf,

    /// Browser to validate for (chrome, firefox, opera, edge).
    #[arg(long, short)]
    pub target: Option<Target>,

    /// Package document whose `webextension` block supplies defaults.
    #[arg(long, conflicts_with = "no_package")]
    pub package: Option<PathBuf>,

    /// Do not merge any package document.
    #[arg(long)]
    pub no_package: bool,
}

/// Load the manifest named by `args`, merge package defaults, and bind it
/// to the selected target.
///
/// An unreadable package document is skipped with a warning; an unreadable
/// manifest is an error.
pub fn load_formatter(args: &ManifestArgs, config: &CliConfig) -> Result<ManifestFormatter> {
    let target = config.target(args.target);
    let mut document = load_document(&args.manifest)
        .with_context(|| format!("failed to load manifest {}", args.manifest.display()))?;

    if let Some(package_path) = config.package(args.package.as_deref(), args.no_package) {
        match load_package(&package_path) {
            Ok(package) => {
                tracing::debug!(package = %package_path.display(), "merging package defaults");
                document = merge_package_defaults(document, &package);
            }
            Err(e) => {
                tracing::warn!(package = %package_path.display(), "skipping package document: {e}");
            }
        }
    }

    let formatter = ManifestFormatter::new(document, target)
        .with_context(|| format!("no rules available for target {target}"))?;
    tracing::info!(
        manifest = %args.manifest.display(),
        target_browser = %target,
        valid = formatter.is_valid(),
        "loaded manifest"
    );
    Ok(formatter)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(manifest: PathBuf) -> ManifestArgs {
        ManifestArgs {
            manifest,
            target: None,
            package: None,
            no_package: true,
        }
    }

    #[test]
    fn load_formatter_uses_config_target() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("manifest.json");
        std::fs::write(&path, r#"{"manifest_version": 2, "name": "x", "version": "1"}"#).unwrap();
        let config = CliConfig {
            target: Some(Target::Chrome),
            ..CliConfig::default()
        };
        let formatter = load_formatter(&args(path), &config).unwrap();
        assert_eq!(formatter.target(), Target::Chrome);
        assert!(formatter.is_valid());
    }

    #[test]
    fn load_formatter_merges_package() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = dir.path().join("manifest.json");
        let package = dir.path().join("package.json");
        std::fs::write(&manifest, r#"{"manifest_version": 2, "name": "x", "version": "1"}"#)
            .unwrap();
        std::fs::write(
            &package,
            r#"{"webextension": {"applications": {"gecko": {"id": "pkg@example.com"}}}}"#,
        )
        .unwrap();
        let mut manifest_args = args(manifest);
        manifest_args.no_package = false;
        manifest_args.package = Some(package);
        let formatter = load_formatter(&manifest_args, &CliConfig::default()).unwrap();
        assert_eq!(
            formatter.document()["applications"]["gecko"]["id"],
            "pkg@example.com"
        );
        assert!(formatter.is_valid());
    }

    #[test]
    fn unreadable_package_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = dir.path().join("manifest.json");
        std::fs::write(&manifest, r#"{"name": "x"}"#).unwrap();
        let mut manifest_args = args(manifest);
        manifest_args.no_package = false;
        manifest_args.package = Some(dir.path().join("missing.json"));
        assert!(load_formatter(&manifest_args, &CliConfig::default()).is_ok());
    }

    #[test]
    fn missing_manifest_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_formatter(&args(dir.path().join("nope.json")), &CliConfig::default());
        assert!(result.is_err());
    }
}
