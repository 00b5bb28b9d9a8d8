//! Ambient engine configuration.
//!
//! This is deliberately *not* the per-run keyword-argument surface of
//! [`crate::dataflow::Dataflow`] (`multithread(..)`, `head(..)`, `weight(..)`),
//! which is an in-process builder API with no file or CLI binding. `EngineConfig`
//! instead holds the handful of process-wide defaults a host application may
//! want to set once: default worker count, default logging, and the target
//! partition size a reference [`crate::source::DatasetSource`] should aim for.
//!
//! Hierarchical loading, in order of increasing precedence:
//! - `cutflow.toml` (base configuration)
//! - `cutflow.local.toml` (git-ignored local overrides)
//! - environment variables with a `CUTFLOW_` prefix
//!
//! ## Example
//!
//! ```toml
//! # cutflow.toml
//! [execution]
//! default_threads = 4
//! default_partition_size = 50000
//! ```
//!
//! ```bash
//! CUTFLOW_EXECUTION__DEFAULT_THREADS=8
//! ```

use figment::providers::{Env, Format, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

/// Top-level ambient configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EngineConfig {
    #[serde(default)]
    pub execution: ExecutionConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Defaults for [`crate::processor::Processor`] construction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExecutionConfig {
    /// Default worker count when a dataflow does not pass `multithread(..)`.
    /// 0 = use all available CPU cores.
    #[serde(default)]
    pub default_threads: usize,

    /// Target number of entries per partition for reference dataset sources.
    #[serde(default = "default_partition_size")]
    pub default_partition_size: usize,
}

fn default_partition_size() -> usize {
    50_000
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        ExecutionConfig {
            default_threads: 0,
            default_partition_size: default_partition_size(),
        }
    }
}

/// Structured-logging defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format (text, json).
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            execution: ExecutionConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from the default locations, merging in order:
    /// 1. `cutflow.toml`
    /// 2. `cutflow.local.toml`
    /// 3. `CUTFLOW_`-prefixed environment variables
    ///
    /// Missing files are silently skipped; figment only errors on malformed
    /// TOML or a type mismatch during extraction.
    pub fn load() -> Result<Self, figment::Error> {
        Figment::from(figment::providers::Serialized::defaults(
            EngineConfig::default(),
        ))
        .merge(Toml::file("cutflow.toml"))
        .merge(Toml::file("cutflow.local.toml"))
        .merge(Env::prefixed("CUTFLOW_").split("__"))
        .extract()
    }

    /// Load configuration from a specific file path, plus environment overrides.
    pub fn from_file(path: &str) -> Result<Self, figment::Error> {
        Figment::from(figment::providers::Serialized::defaults(
            EngineConfig::default(),
        ))
        .merge(Toml::file(path))
        .merge(Env::prefixed("CUTFLOW_").split("__"))
        .extract()
    }

    /// Render the resolved configuration as pretty JSON, for logging the
    /// effective settings at startup.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_sensible_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.execution.default_threads, 0);
        assert_eq!(config.execution.default_partition_size, 50_000);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn config_round_trips_through_toml() {
        let config = EngineConfig::default();
        let toml_str = toml::to_string(&config).expect("serialize");
        assert!(toml_str.contains("[execution]"));
        assert!(toml_str.contains("[logging]"));
        let parsed: EngineConfig = toml::from_str(&toml_str).expect("parse");
        assert_eq!(parsed, config);
    }

    #[test]
    fn to_json_pretty_emits_resolved_settings() {
        let config = EngineConfig::default();
        let json = config.to_json_pretty().unwrap();
        assert!(json.contains("\"default_threads\""));
        assert!(json.contains("\"level\""));
    }

    #[test]
    fn env_override_takes_precedence() {
        std::env::set_var("CUTFLOW_EXECUTION__DEFAULT_THREADS", "8");
        let config = Figment::from(figment::providers::Serialized::defaults(
            EngineConfig::default(),
        ))
        .merge(Env::prefixed("CUTFLOW_").split("__"))
        .extract::<EngineConfig>()
        .expect("extract");
        assert_eq!(config.execution.default_threads, 8);
        std::env::remove_var("CUTFLOW_EXECUTION__DEFAULT_THREADS");
    }
}
