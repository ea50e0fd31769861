//! # Check Subcommand
//!
//! Validates one manifest for one target and prints every finding.
//!
//! ```text
//! ERROR: firefox's extension must have keys: applications
//! RECOMMEND: set icons is good
//! FAIL: manifest.json (firefox), 1 error(s)
//! ```

use anyhow::Result;
use clap::Args;

use wxm_rules::ManifestFormatter;

use crate::{load_formatter, CliConfig, ManifestArgs};

/// Arguments for the `wxm check` subcommand.
#[derive(Args, Debug)]
pub struct CheckArgs {
    #[command(flatten)]
    pub manifest: ManifestArgs,
}

/// Execute the check subcommand.
///
/// Returns exit code: 0 if the manifest is valid, 1 otherwise.
pub fn run_check(args: &CheckArgs, config: &CliConfig) -> Result<u8> {
    let formatter = load_formatter(&args.manifest, config)?;
    for line in report_lines(&formatter, &args.manifest.manifest.display().to_string()) {
        println!("{line}");
    }
    Ok(exit_code(&formatter))
}

/// Render a formatter's diagnostics, one finding per line, ending in a
/// summary line.
pub fn report_lines(formatter: &ManifestFormatter, label: &str) -> Vec<String> {
    let mut lines: Vec<String> = formatter
        .errors()
        .iter()
        .map(|e| format!("ERROR: {e}"))
        .collect();
    lines.extend(
        formatter
            .recommendations()
            .iter()
            .map(|r| format!("RECOMMEND: {r}")),
    );
    let target = formatter.target();
    if formatter.is_valid() {
        lines.push(format!("OK: {label} ({target})"));
    } else {
        lines.push(format!(
            "FAIL: {label} ({target}), {} error(s)",
            formatter.errors().len()
        ));
    }
    lines
}

pub(crate) fn exit_code(formatter: &ManifestFormatter) -> u8 {
    if formatter.is_valid() {
        0
    } else {
        1
    }
}
