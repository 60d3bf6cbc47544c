//! Optional TOML configuration for the CLI.
//!
//! ```toml
//! target = "dp_x64_original.exe"
//! output = "dp_x64_patched.exe"
//! patches = "hwid.json"
//! pause = true
//! ```
//!
//! Command-line flags take precedence over values from this file.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub target: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub patches: Option<PathBuf>,
    pub pause: bool,
}

impl CliConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config {}", path.display()))
    }

    /// Load the config, falling back to defaults when it is absent or invalid.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            debug!("No config file at {}, using defaults", path.display());
            return Self::default();
        }

        match Self::load(path) {
            Ok(config) => {
                info!("Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                warn!("{:#}, using defaults", e);
                Self::default()
            }
        }
    }

    pub fn target(&self, flag: Option<PathBuf>) -> Result<PathBuf> {
        flag.or_else(|| self.target.clone())
            .context("No target file given. Use --target or set `target` in the config file")
    }

    pub fn output(&self, flag: Option<PathBuf>) -> Option<PathBuf> {
        flag.or_else(|| self.output.clone())
    }

    pub fn patches(&self, flag: Option<PathBuf>) -> Option<PathBuf> {
        flag.or_else(|| self.patches.clone())
    }
}
