//! # Targets Subcommand
//!
//! Lists the supported browsers with a summary of each rule set.

use anyhow::{Context, Result};
use clap::Args;

use wxm_core::Target;
use wxm_rules::{resolve, ResolvedRuleSet};

/// Arguments for the `wxm targets` subcommand.
#[derive(Args, Debug)]
pub struct TargetsArgs {
    /// Also print every valid top-level key.
    #[arg(long)]
    pub keys: bool,
}

/// Execute the targets subcommand. Always returns exit code 0.
pub fn run_targets(args: &TargetsArgs) -> Result<u8> {
    for target in Target::all_targets() {
        let rules =
            resolve(*target).with_context(|| format!("failed to resolve rules for {target}"))?;
        for line in describe(&rules, args.keys) {
            println!("{line}");
        }
    }
    Ok(0)
}

/// Summary lines for one resolved rule set.
pub fn describe(rules: &ResolvedRuleSet, with_keys: bool) -> Vec<String> {
    let mut lines = vec![
        format!("{}:", rules.target()),
        format!("  required: {}", rules.required_keys().join(", ")),
        format!("  recommend: {}", rules.recommended_keys().join(", ")),
        format!(
            "  {} valid keys, {} constrained",
            rules.valid_keys().len(),
            rules.constrained_rules().len()
        ),
    ];
    if with_keys {
        lines.extend(rules.valid_keys().iter().map(|k| format!("    {k}")));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describe_firefox() {
        let rules = resolve(Target::Firefox).unwrap();
        let lines = describe(&rules, false);
        assert_eq!(lines[0], "firefox:");
        assert!(lines[1].contains("applications"));
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn describe_with_keys_lists_every_key() {
        let rules = resolve(Target::Edge).unwrap();
        let lines = describe(&rules, true);
        assert_eq!(lines.len(), 4 + rules.valid_keys().len());
        assert!(lines.iter().any(|l| l.trim() == "author"));
    }

    #[test]
    fn run_targets_succeeds() {
        assert_eq!(run_targets(&TargetsArgs { keys: false }).unwrap(), 0);
    }
}
