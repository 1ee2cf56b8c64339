//! CLI configuration
//!
//! Stored as TOML at `$KINDRED_CONFIG` or `<config dir>/kindred/config.toml`.

use std::path::PathBuf;

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Location of the config file
pub fn config_file_path() -> PathBuf {
    if let Some(path) = std::env::var_os("KINDRED_CONFIG") {
        return PathBuf::from(path);
    }
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("kindred")
        .join("config.toml")
}

/// Configuration for the CLI
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Default graph document
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub graph: Option<PathBuf>,

    /// Default output format
    #[serde(default = "default_format")]
    pub format: String,

    /// Edge cap for path searches
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path_depth: Option<u32>,

    /// Generation cap for ancestor searches
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ancestor_depth: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,

    /// Queries run at once in batch mode
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub concurrency: Option<usize>,
}

fn default_format() -> String {
    "table".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            graph: None,
            format: default_format(),
            path_depth: None,
            ancestor_depth: None,
            timeout_ms: None,
            concurrency: None,
        }
    }
}

impl Config {
    /// Load the config file, falling back to defaults
    pub fn load() -> Self {
        let path = config_file_path();
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(_) => return Self::default(),
        };
        match toml::from_str(&content) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Ignoring invalid config file {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Write the config file, creating its directory
    pub fn save(&self) -> anyhow::Result<()> {
        let path = config_file_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(&path, content)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    pub fn keys() -> &'static [&'static str] {
        &[
            "graph",
            "format",
            "path_depth",
            "ancestor_depth",
            "timeout_ms",
            "concurrency",
        ]
    }

    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "graph" => Some(
                self.graph
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default(),
            ),
            "format" => Some(self.format.clone()),
            "path_depth" => Some(self.path_depth.map(|d| d.to_string()).unwrap_or_default()),
            "ancestor_depth" => Some(
                self.ancestor_depth
                    .map(|d| d.to_string())
                    .unwrap_or_default(),
            ),
            "timeout_ms" => Some(self.timeout_ms.map(|t| t.to_string()).unwrap_or_default()),
            "concurrency" => Some(self.concurrency.map(|c| c.to_string()).unwrap_or_default()),
            _ => None,
        }
    }

    /// Set a key from its string form; an empty value unsets optional keys
    pub fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        let value = value.trim();
        match key {
            "graph" => self.graph = (!value.is_empty()).then(|| PathBuf::from(value)),
            "format" => match value {
                "table" | "json" => self.format = value.to_string(),
                _ => anyhow::bail!("Invalid format '{}': expected table or json", value),
            },
            "path_depth" => self.path_depth = parse_optional(key, value)?,
            "ancestor_depth" => self.ancestor_depth = parse_optional(key, value)?,
            "timeout_ms" => self.timeout_ms = parse_optional(key, value)?,
            "concurrency" => self.concurrency = parse_optional(key, value)?,
            _ => anyhow::bail!(
                "Unknown config key: {} (available: {})",
                key,
                Self::keys().join(", ")
            ),
        }
        Ok(())
    }
}

fn parse_optional<T>(key: &str, value: &str) -> anyhow::Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    if value.is_empty() {
        return Ok(None);
    }
    value
        .parse()
        .map(Some)
        .map_err(|e| anyhow::anyhow!("Invalid value for {}: {}", key, e))
}
