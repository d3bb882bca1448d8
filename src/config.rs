//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub clickhouse: ClickHouseConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// ClickHouse tables and timeouts
#[derive(Debug, Clone, Deserialize)]
pub struct ClickHouseConfig {
    #[serde(default = "default_url")]
    pub url: String,

    /// Forward tree table (paths from root segment)
    #[serde(default = "default_tree_table")]
    pub tree_table: String,

    /// Reverse tree table (paths from leaf segment); unset or empty
    /// disables reverse routing
    #[serde(default = "default_reverse_tree_table")]
    pub reverse_tree_table: Option<String>,

    #[serde(default = "default_tree_timeout")]
    pub tree_timeout_ms: u64,

    /// Points table with forward paths
    #[serde(default = "default_data_table")]
    pub data_table: String,

    /// Points table with reversed paths, used for reverse-routed queries
    #[serde(default)]
    pub reverse_data_table: Option<String>,

    #[serde(default = "default_data_timeout")]
    pub data_timeout_ms: u64,
}

fn default_url() -> String {
    "http://localhost:8123/".to_string()
}

fn default_tree_table() -> String {
    "graphite_tree".to_string()
}

fn default_reverse_tree_table() -> Option<String> {
    Some("graphite_reverse_tree".to_string())
}

fn default_tree_timeout() -> u64 {
    60_000 // 1 minute
}

fn default_data_table() -> String {
    "graphite".to_string()
}

fn default_data_timeout() -> u64 {
    60_000
}

impl Default for ClickHouseConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            tree_table: default_tree_table(),
            reverse_tree_table: default_reverse_tree_table(),
            tree_timeout_ms: default_tree_timeout(),
            data_table: default_data_table(),
            reverse_data_table: None,
            data_timeout_ms: default_data_timeout(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,

    pub file: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::parse(&content).map_err(|error| ConfigError::Parse {
            path: path.to_path_buf(),
            error,
        })
    }

    fn parse(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| e.to_string())
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("graphite-router").join("config.toml")),
            Some(PathBuf::from("/etc/graphite-router/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path_opt in config_paths.iter().flatten() {
            if path_opt.exists() {
                match Self::load_with_env(path_opt) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path_opt);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path_opt, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        // ClickHouse overrides
        if let Ok(url) = std::env::var("GRAPHITE_ROUTER_CLICKHOUSE_URL") {
            self.clickhouse.url = url;
        }
        if let Ok(table) = std::env::var("GRAPHITE_ROUTER_TREE_TABLE") {
            self.clickhouse.tree_table = table;
        }
        if let Ok(table) = std::env::var("GRAPHITE_ROUTER_REVERSE_TREE_TABLE") {
            self.clickhouse.reverse_tree_table = Some(table);
        }
        if let Ok(table) = std::env::var("GRAPHITE_ROUTER_DATA_TABLE") {
            self.clickhouse.data_table = table;
        }

        // Logging overrides
        if let Ok(level) = std::env::var("GRAPHITE_ROUTER_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("GRAPHITE_ROUTER_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Graphite Router Configuration
#
# Environment variables override these settings:
# - GRAPHITE_ROUTER_CLICKHOUSE_URL
# - GRAPHITE_ROUTER_TREE_TABLE
# - GRAPHITE_ROUTER_REVERSE_TREE_TABLE
# - GRAPHITE_ROUTER_DATA_TABLE
# - GRAPHITE_ROUTER_LOG_LEVEL
# - GRAPHITE_ROUTER_LOG_FORMAT

[clickhouse]
# ClickHouse HTTP interface
url = "http://localhost:8123/"

# Metric tree, paths stored from the root segment
tree_table = "graphite_tree"

# Metric tree with reversed paths. Queries ending in a literal segment
# are answered from here. Set to "" to disable reverse routing.
reverse_tree_table = "graphite_reverse_tree"

# Tree query timeout (ms)
tree_timeout_ms = 60000

# Points table
data_table = "graphite"

# Points table with reversed paths (optional)
# reverse_data_table = "graphite_reverse"

# Points query timeout (ms)
data_timeout_ms = 60000

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"

# Optional log file path
# file = "/var/log/graphite-router/graphite-router.log"
"#
    .to_string()
}
