//! # wxm CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use wxm_cli::check::{run_check, CheckArgs};
use wxm_cli::fix::{run_fix, FixArgs};
use wxm_cli::targets::{run_targets, TargetsArgs};
use wxm_cli::CliConfig;

/// wxm: WebExtension manifest checker
///
/// Validates a manifest.json against the rules of one browser and applies
/// guided repairs: filling required keys and removing what the browser
/// does not support.
#[derive(Parser, Debug)]
#[command(name = "wxm", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to a YAML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate a manifest and print errors and recommendations.
    Check(CheckArgs),

    /// Repair a manifest and write the result.
    Fix(FixArgs),

    /// List supported browsers and their rules.
    Targets(TargetsArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("wxm CLI v{} starting", env!("CARGO_PKG_VERSION"));

    let config = match CliConfig::load_optional(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{e:#}");
            return ExitCode::from(2);
        }
    };

    let result = match cli.command {
        Commands::Check(args) => run_check(&args, &config),
        Commands::Fix(args) => run_fix(&args, &config),
        Commands::Targets(args) => run_targets(&args),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(2)
        }
    }
}
