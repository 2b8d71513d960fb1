//! Build configuration file (`braid.json`). Every field is optional;
//! command-line flags override whatever the file sets.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Deserialized `braid.json`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BuildConfig {
    /// Entry module id, e.g. `./index.js`.
    pub entry: Option<String>,
    /// Source directory to walk.
    pub root: Option<PathBuf>,
    /// Output file.
    pub output: Option<PathBuf>,
    /// Run the tree-shake pass.
    pub tree_shake: Option<bool>,
    /// Run the minify pass.
    pub minify: Option<bool>,
    /// Minifier: keep comments.
    pub keep_comments: Option<bool>,
    /// Run the obfuscate pass.
    pub obfuscate: Option<bool>,
    /// Obfuscator: rename identifiers.
    pub rename_identifiers: Option<bool>,
    /// Obfuscator: encode strings.
    pub encode_strings: Option<bool>,
}

impl BuildConfig {
    /// Parse a config file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("invalid config {}", path.display()))
    }
}
