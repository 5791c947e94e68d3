//! Configuration file schema for evolint.
//!
//! A config selects which checks run, carries per-check options, and lists
//! paths to skip.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use globset::{Glob, GlobMatcher};
use serde::{Deserialize, Serialize};

use crate::checks::{Check, CHECKS};

/// Config file names searched for, in order, when none is given.
pub const DEFAULT_CONFIG_NAMES: &[&str] = &[".evolint.yaml", "evolint.yaml"];

/// The config written by `evolint init`.
pub const DEFAULT_CONFIG: &str = include_str!("templates/default.yaml");

/// Top-level config definition.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub version: String,
    /// Check name globs; a leading `-` disables, later entries win.
    #[serde(default = "default_checks")]
    pub checks: Vec<String>,
    /// Options keyed by check name.
    #[serde(default)]
    pub check_options: BTreeMap<String, serde_yaml::Value>,
    /// Glob patterns for unit files to skip (e.g. "**/generated/**")
    #[serde(default)]
    pub excluded_paths: Vec<String>,
    /// Analyze units in parallel (default: true)
    #[serde(default = "default_true")]
    pub parallel: bool,
}

fn default_checks() -> Vec<String> {
    vec!["evolution-*".to_string()]
}

fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: String::new(),
            checks: default_checks(),
            check_options: BTreeMap::new(),
            excluded_paths: Vec::new(),
            parallel: true,
        }
    }
}

impl Config {
    /// Parse a config from a YAML file.
    pub fn parse_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("invalid config {}", path.display()))?;
        Ok(config)
    }

    /// The first default-named config file in `dir`, if any.
    pub fn discover(dir: &Path) -> Option<PathBuf> {
        DEFAULT_CONFIG_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|p| p.is_file())
    }

    /// Compile the `checks` list.
    pub fn check_selector(&self) -> anyhow::Result<CheckSelector> {
        CheckSelector::new(&self.checks)
    }

    /// Check if a path should be excluded based on excluded_paths patterns.
    pub fn is_path_excluded(&self, path: &Path) -> bool {
        if self.excluded_paths.is_empty() {
            return false;
        }

        let path_str = path.to_string_lossy();
        self.excluded_paths.iter().any(|pattern| {
            Glob::new(pattern)
                .map(|g| g.compile_matcher().is_match(&*path_str))
                .unwrap_or(false)
        })
    }
}

/// Compiled check selection rules.
#[derive(Debug, Clone)]
pub struct CheckSelector {
    rules: Vec<(bool, GlobMatcher)>,
}

impl CheckSelector {
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> anyhow::Result<Self> {
        let mut rules = Vec::with_capacity(patterns.len());
        for pattern in patterns {
            let pattern = pattern.as_ref().trim();
            let (enable, glob) = match pattern.strip_prefix('-') {
                Some(rest) => (false, rest),
                None => (true, pattern),
            };
            let matcher = Glob::new(glob)
                .with_context(|| format!("invalid check pattern {:?}", pattern))?
                .compile_matcher();
            rules.push((enable, matcher));
        }
        Ok(Self { rules })
    }

    /// Whether the last rule matching `name` enables it. Unmatched names are
    /// disabled.
    pub fn is_enabled(&self, name: &str) -> bool {
        self.rules
            .iter()
            .rev()
            .find(|(_, m)| m.is_match(name))
            .map(|(enable, _)| *enable)
            .unwrap_or(false)
    }
}

/// Validate a config for correctness.
pub fn validate(config: &Config) -> anyhow::Result<()> {
    config.check_selector()?;

    for pattern in &config.excluded_paths {
        Glob::new(pattern)
            .map_err(|e| anyhow::anyhow!("invalid excluded_paths pattern {:?}: {}", pattern, e))?;
    }

    for (name, options) in &config.check_options {
        if !CHECKS.iter().any(|(known, _)| *known == name.as_str()) {
            anyhow::bail!("check_options given for unknown check {:?}", name);
        }
        Check::configure(name, Some(options))?;
    }

    Ok(())
}
