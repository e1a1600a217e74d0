use config::{Config, ConfigError, Environment, File as ConfigFile};
use serde::Deserialize;
use std::path::PathBuf;

use crate::scanner::DEFAULT_PLACEHOLDER_PATTERNS;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub root_paths: Vec<String>,
    #[serde(default)]
    pub ignore_patterns: Vec<String>,
    #[serde(default = "default_placeholder_patterns")]
    pub placeholder_patterns: Vec<String>,
    /// Proposals scoring below this are dropped before planning.
    #[serde(default)]
    pub min_confidence: f64,
    /// `EnvFilter` directive, e.g. `info` or `untitled_folder=debug`.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Log file in addition to the console. No file when unset.
    #[serde(default)]
    pub log_file: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            root_paths: Vec::new(),
            ignore_patterns: Vec::new(),
            placeholder_patterns: default_placeholder_patterns(),
            min_confidence: 0.0,
            log_level: default_log_level(),
            log_file: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_placeholder_patterns() -> Vec<String> {
    DEFAULT_PLACEHOLDER_PATTERNS
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// Reads `Config.toml` from the working directory if present, then
/// `UNTITLED_*` environment variables. List values in the environment are
/// comma separated.
pub fn load_configuration() -> Result<AppConfig, ConfigError> {
    let builder = Config::builder()
        .add_source(ConfigFile::with_name("Config").required(false))
        .add_source(
            Environment::with_prefix("UNTITLED")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("root_paths")
                .with_list_parse_key("ignore_patterns")
                .with_list_parse_key("placeholder_patterns"),
        )
        .build()?;
    builder.try_deserialize::<AppConfig>()
}

/// Drops roots nested inside another root so no subtree is scanned twice.
/// Keeps the first-seen order of the surviving roots.
pub fn non_overlapping_directories(roots: &[PathBuf]) -> Vec<PathBuf> {
    let mut result: Vec<PathBuf> = Vec::new();

    for root in roots {
        if result.iter().any(|kept| root.starts_with(kept)) {
            continue;
        }
        result.retain(|kept| !kept.starts_with(root));
        result.push(root.clone());
    }

    result
}
