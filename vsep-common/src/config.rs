//! Configuration loading
//!
//! Config file resolution priority:
//! 1. Command-line argument (highest priority)
//! 2. `VSEP_CONFIG` environment variable
//! 3. Platform config dir (`~/.config/vsep/vsep.toml` on Linux)
//! 4. Compiled defaults (fallback)
//!
//! A missing or broken config file never stops startup: a warning is logged
//! and compiled defaults are used.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "VSEP_CONFIG";

/// Top-level TOML configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct TomlConfig {
    /// Default tracing filter when `RUST_LOG` is unset
    pub log_level: String,
    pub server: ServerSection,
    pub tools: ToolsSection,
    pub model: ModelSection,
}

/// Web form server settings
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerSection {
    pub bind: String,
    pub port: u16,
    /// Maximum accepted upload size in megabytes
    pub max_upload_mb: usize,
    /// Sessions idle longer than this are dropped
    pub session_idle_secs: u64,
}

/// External program names (looked up in PATH unless absolute)
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ToolsSection {
    pub ffmpeg: String,
    pub ytdlp: String,
    pub demucs: String,
}

/// Pretrained separation model selection
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ModelSection {
    pub name: String,
    pub device: String,
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            server: ServerSection::default(),
            tools: ToolsSection::default(),
            model: ModelSection::default(),
        }
    }
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: 5790,
            max_upload_mb: 200,
            session_idle_secs: 3600,
        }
    }
}

impl Default for ToolsSection {
    fn default() -> Self {
        Self {
            ffmpeg: "ffmpeg".to_string(),
            ytdlp: "yt-dlp".to_string(),
            demucs: "demucs".to_string(),
        }
    }
}

impl Default for ModelSection {
    fn default() -> Self {
        Self {
            name: "htdemucs".to_string(),
            device: "cpu".to_string(),
        }
    }
}

/// Platform default config file location
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("vsep").join("vsep.toml"))
}

/// Pick the config file to read, if any.
///
/// An explicit path (CLI or env) is returned even when it does not exist so
/// the caller can warn about it; the platform default is only returned when
/// present.
pub fn resolve_config_path(cli_arg: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    default_config_path().filter(|p| p.exists())
}

/// Read and parse a TOML config file.
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
}

/// Where the active configuration came from
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigSource {
    /// No config file; compiled defaults
    Defaults,
    /// Loaded from this file
    File(PathBuf),
    /// This file could not be used; compiled defaults
    Fallback { path: PathBuf, error: String },
}

/// Configuration plus its provenance
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: TomlConfig,
    pub source: ConfigSource,
}

impl LoadedConfig {
    /// Log where the configuration came from.
    ///
    /// Separate from loading so binaries can load first, initialise tracing
    /// with the configured level, then report.
    pub fn log_source(&self) {
        match &self.source {
            ConfigSource::Defaults => info!("No config file found, using compiled defaults"),
            ConfigSource::File(path) => info!("Loaded config from {}", path.display()),
            ConfigSource::Fallback { error, .. } => {
                warn!("{} - using compiled defaults", error)
            }
        }
    }
}

/// Resolve and load configuration without logging.
pub fn load_config(cli_arg: Option<&Path>) -> LoadedConfig {
    let Some(path) = resolve_config_path(cli_arg) else {
        return LoadedConfig {
            config: TomlConfig::default(),
            source: ConfigSource::Defaults,
        };
    };

    match load_toml_config(&path) {
        Ok(config) => LoadedConfig {
            config,
            source: ConfigSource::File(path),
        },
        Err(e) => LoadedConfig {
            config: TomlConfig::default(),
            source: ConfigSource::Fallback {
                path,
                error: e.to_string(),
            },
        },
    }
}

/// Resolve and load configuration, degrading to defaults on any problem.
pub fn load_or_default(cli_arg: Option<&Path>) -> TomlConfig {
    let loaded = load_config(cli_arg);
    loaded.log_source();
    loaded.config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: TomlConfig = toml::from_str(
            r#"
            [server]
            port = 8080

            [model]
            name = "htdemucs_ft"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.bind, "127.0.0.1");
        assert_eq!(config.model.name, "htdemucs_ft");
        assert_eq!(config.model.device, "cpu");
        assert_eq!(config.tools, ToolsSection::default());
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_empty_toml_is_default() {
        let config: TomlConfig = toml::from_str("").unwrap();
        assert_eq!(config, TomlConfig::default());
    }
}
