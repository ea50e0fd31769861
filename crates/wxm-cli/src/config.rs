//! # CLI Configuration
//!
//! Optional YAML file (`--config`) supplying defaults for the manifest
//! subcommands. Precedence, highest first: command-line flags, config
//! file, built-in defaults.
//!
//! ```yaml
//! target: firefox
//! package: ../package.json
//! indent: 4
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use wxm_core::Target;

/// Package document looked up in the working directory when none is named.
pub const DEFAULT_PACKAGE_FILE: &str = "package.json";

/// Indentation of written manifests when none is configured.
pub const DEFAULT_INDENT: usize = 2;

/// Contents of a `--config` file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CliConfig {
    /// Browser to validate for.
    pub target: Option<Target>,
    /// Package document supplying project defaults.
    pub package: Option<PathBuf>,
    /// Spaces per indentation level when writing JSON.
    pub indent: Option<usize>,
}

impl CliConfig {
    /// Parse a YAML config file.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read or is not valid config YAML.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read config file {}", path.display()))?;
        let config: Self = serde_yaml::from_str(&content)
            .with_context(|| format!("invalid config file {}", path.display()))?;
        tracing::debug!(path = %path.display(), ?config, "loaded config");
        Ok(config)
    }

    /// Load `path` if given, else the empty config.
    ///
    /// # Errors
    ///
    /// See [`CliConfig::load`].
    pub fn load_optional(path: Option<&Path>) -> Result<Self> {
        path.map_or_else(|| Ok(Self::default()), Self::load)
    }

    /// Pick the target: flag, then config, then the built-in default.
    pub fn target(&self, flag: Option<Target>) -> Target {
        flag.or(self.target).unwrap_or_default()
    }

    /// Pick the package document.
    ///
    /// `--no-package` disables the merge. Otherwise the flag wins over the
    /// config, and with neither, `package.json` in the working directory is
    /// used when it exists.
    pub fn package(&self, flag: Option<&Path>, disabled: bool) -> Option<PathBuf> {
        if disabled {
            return None;
        }
        if let Some(path) = flag {
            return Some(path.to_path_buf());
        }
        if let Some(path) = &self.package {
            return Some(path.clone());
        }
        let fallback = PathBuf::from(DEFAULT_PACKAGE_FILE);
        fallback.is_file().then_some(fallback)
    }

    /// Pick the output indentation.
    pub fn indent(&self) -> usize {
        self.indent.unwrap_or(DEFAULT_INDENT)
    }
}
