//! Project configuration, read from `.transcatrc.json`.
//!
//! The file is searched upward from the working directory and every field
//! is optional; the extract command applies its flag overrides on top.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use glob::Pattern;
use serde::{Deserialize, Serialize};

pub const CONFIG_FILE_NAME: &str = ".transcatrc.json";

pub const TEST_FILE_PATTERNS: &[&str] = &[
    "**/*.test.tsx",
    "**/*.test.ts",
    "**/*.test.jsx",
    "**/*.test.js",
    "**/*.spec.tsx",
    "**/*.spec.ts",
    "**/*.spec.jsx",
    "**/*.spec.js",
    "**/__tests__/**",
];

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default)]
    pub ignores: Vec<String>,
    #[serde(default = "defaults::includes")]
    pub includes: Vec<String>,
    #[serde(default = "defaults::source_root")]
    pub source_root: String,
    #[serde(default = "defaults::output_root")]
    pub output_root: String,
    #[serde(default = "defaults::locale")]
    pub locale: String,
    #[serde(default = "defaults::locale")]
    pub source_language: String,
    #[serde(default = "defaults::yes")]
    pub add_date: bool,
    #[serde(default = "defaults::yes")]
    pub add_reference: bool,
    #[serde(default = "defaults::yes")]
    pub add_reference_position: bool,
    #[serde(default = "defaults::yes")]
    pub ignore_test_files: bool,
}

mod defaults {
    pub fn includes() -> Vec<String> {
        vec!["src".to_string()]
    }

    pub fn source_root() -> String {
        "./".to_string()
    }

    pub fn output_root() -> String {
        "./translations".to_string()
    }

    pub fn locale() -> String {
        "en".to_string()
    }

    pub fn yes() -> bool {
        true
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ignores: Vec::new(),
            includes: defaults::includes(),
            source_root: defaults::source_root(),
            output_root: defaults::output_root(),
            locale: defaults::locale(),
            source_language: defaults::locale(),
            add_date: true,
            add_reference: true,
            add_reference_position: true,
            ignore_test_files: true,
        }
    }
}

impl Config {
    /// Reject unparseable glob patterns up front, so a typo fails the run
    /// instead of silently matching nothing.
    pub fn validate(&self) -> Result<()> {
        check_patterns("ignores", &self.ignores, false)?;
        // Includes without wildcards are literal directory paths, so
        // bracketed route segments like app/[locale] stay valid.
        check_patterns("includes", &self.includes, true)?;
        Ok(())
    }
}

fn check_patterns(field: &str, patterns: &[String], wildcards_only: bool) -> Result<()> {
    for pattern in patterns {
        if wildcards_only && !pattern.contains('*') && !pattern.contains('?') {
            continue;
        }
        Pattern::new(pattern)
            .with_context(|| format!("Invalid glob pattern in '{}': \"{}\"", field, pattern))?;
    }
    Ok(())
}

pub fn default_config_json() -> Result<String> {
    serde_json::to_string_pretty(&Config::default()).context("Failed to generate default config.")
}

/// Walk from `start_dir` toward the filesystem root looking for the config
/// file. A `.git` directory marks the project boundary and ends the search.
pub fn find_config_file(start_dir: &Path) -> Option<PathBuf> {
    for dir in start_dir.ancestors() {
        let candidate = dir.join(CONFIG_FILE_NAME);
        if candidate.exists() {
            return Some(candidate);
        }
        if dir.join(".git").exists() {
            break;
        }
    }
    None
}

/// Result of loading configuration.
pub struct ConfigLoadResult {
    pub config: Config,
    /// True if config was loaded from a file, false if using defaults.
    pub from_file: bool,
}

pub fn load_config(start_dir: &Path) -> Result<ConfigLoadResult> {
    let Some(path) = find_config_file(start_dir) else {
        return Ok(ConfigLoadResult {
            config: Config::default(),
            from_file: false,
        });
    };

    let content = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;
    let config: Config = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;
    config.validate()?;

    Ok(ConfigLoadResult {
        config,
        from_file: true,
    })
}
