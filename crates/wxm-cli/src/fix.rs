//! # Fix Subcommand
//!
//! Applies guided repairs to a manifest and writes the result.
//!
//! Repairs run in a fixed order: `--set` assignments, the
//! `manifest_version` default, unsupported property removal, then
//! unsupported key removal. The repaired manifest goes to `--out`, back to
//! the input with `--in-place`, or to stdout. When the manifest goes to
//! stdout, the report goes to stderr.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::Value;

use wxm_core::Document;
use wxm_rules::{ManifestFormatter, MANIFEST_VERSION_KEY};

use crate::check::{exit_code, report_lines};
use crate::{load_formatter, CliConfig, ManifestArgs};

/// Arguments for the `wxm fix` subcommand.
#[derive(Args, Debug)]
pub struct FixArgs {
    #[command(flatten)]
    pub manifest: ManifestArgs,

    /// Set a required key. VALUE is parsed as JSON, falling back to a plain string.
    #[arg(long = "set", value_name = "KEY=VALUE")]
    pub set: Vec<String>,

    /// Fill `manifest_version` with its default when absent.
    #[arg(long)]
    pub default_manifest_version: bool,

    /// Remove top-level keys the target does not support.
    #[arg(long)]
    pub delete_unsupported_keys: bool,

    /// Remove nested properties and array values the target does not support.
    #[arg(long)]
    pub delete_unsupported_properties: bool,

    /// Write the repaired manifest to this path.
    #[arg(long, short, conflicts_with = "in_place")]
    pub out: Option<PathBuf>,

    /// Overwrite the input manifest.
    #[arg(long)]
    pub in_place: bool,
}

/// Execute the fix subcommand.
///
/// Returns exit code: 0 if the repaired manifest is valid, 1 otherwise.
pub fn run_fix(args: &FixArgs, config: &CliConfig) -> Result<u8> {
    let assignments = args
        .set
        .iter()
        .map(|raw| parse_assignment(raw))
        .collect::<Result<Vec<_>>>()?;

    let mut formatter = load_formatter(&args.manifest, config)?;
    apply_repairs(&mut formatter, args, assignments);

    let rendered = render(formatter.document(), config.indent())?;
    let destination = if args.in_place {
        Some(args.manifest.manifest.as_path())
    } else {
        args.out.as_deref()
    };

    let mut report: Vec<String> = formatter
        .removed_keys()
        .iter()
        .map(|r| format!("REMOVED: {r}"))
        .collect();
    report.extend(report_lines(
        &formatter,
        &args.manifest.manifest.display().to_string(),
    ));

    match destination {
        Some(path) => {
            write_manifest(path, &rendered)?;
            for line in &report {
                println!("{line}");
            }
            println!("Wrote {}", path.display());
        }
        None => {
            print!("{rendered}");
            for line in &report {
                eprintln!("{line}");
            }
        }
    }

    Ok(exit_code(&formatter))
}

fn apply_repairs(
    formatter: &mut ManifestFormatter,
    args: &FixArgs,
    assignments: Vec<(String, Value)>,
) {
    for (key, value) in assignments {
        formatter.fill_required(&key, Some(value));
    }
    if args.default_manifest_version && !formatter.document().contains_key(MANIFEST_VERSION_KEY) {
        formatter.fill_required(MANIFEST_VERSION_KEY, None);
    }
    if args.delete_unsupported_properties {
        formatter.delete_unsupported_properties();
    }
    if args.delete_unsupported_keys {
        formatter.delete_unsupported_keys();
    }
}

/// Split `KEY=VALUE`. The value is JSON when it parses as JSON, else a
/// string.
pub fn parse_assignment(raw: &str) -> Result<(String, Value)> {
    let Some((key, value)) = raw.split_once('=') else {
        bail!("invalid --set '{raw}': expected KEY=VALUE");
    };
    let key = key.trim();
    if key.is_empty() {
        bail!("invalid --set '{raw}': empty key");
    }
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((key.to_string(), value))
}

/// Serialize a manifest as pretty JSON with a trailing newline.
pub fn render(document: &Document, indent: usize) -> Result<String> {
    let indent = " ".repeat(indent);
    let mut buf = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(
        &mut buf,
        PrettyFormatter::with_indent(indent.as_bytes()),
    );
    document
        .serialize(&mut serializer)
        .context("failed to serialize manifest")?;
    buf.push(b'\n');
    String::from_utf8(buf).context("serialized manifest is not UTF-8")
}

fn write_manifest(path: &Path, rendered: &str) -> Result<()> {
    std::fs::write(path, rendered)
        .with_context(|| format!("failed to write manifest {}", path.display()))?;
    tracing::info!(path = %path.display(), "wrote manifest");
    Ok(())
}
