//! Layered configuration.
//!
//! Settings resolve in three layers: compiled-in defaults, an optional TOML
//! file, and environment variable overrides. Command-line flags sit on top of
//! all three at the CLI level. The resolved configuration is validated once
//! and then shared process-wide through [`get_config`].

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::info;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub logging: LoggingConfig,
    pub store: StoreConfig,
    pub capture: CaptureConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    pub output: String,
    pub directory: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Root directory holding one subdirectory per tracked category.
    pub root: PathBuf,
}

/// Defaults for the capture parameters a run records in snapshot metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// Category display name.
    pub category: String,
    /// Category subdirectory under the store root.
    pub subdir: String,
    /// Category tree depth the reports are generated with.
    pub depth: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            logging: LoggingConfig {
                level: "ERROR".to_string(),
                format: "pretty".to_string(),
                output: "console".to_string(),
                directory: PathBuf::from("logs"),
            },
            store: StoreConfig {
                root: PathBuf::from("reports"),
            },
            capture: CaptureConfig {
                category: "Media supplied by Universitätsarchiv St. Gallen".to_string(),
                subdir: "universitaetsarchiv-st-gallen".to_string(),
                depth: 12,
            },
        }
    }
}

impl Config {
    /// Resolve the configuration: defaults, then the first config file found,
    /// then environment overrides, then validation.
    pub fn load() -> Result<Self> {
        let mut config = match Self::candidate_files().iter().find(|path| path.exists()) {
            Some(path) => {
                info!(config_file = %path.display(), "Loading configuration from file");
                Self::load_from_file(path)?
            }
            None => Config::default(),
        };

        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Config file locations, most specific first.
    fn candidate_files() -> Vec<PathBuf> {
        let mut candidates = vec![
            PathBuf::from("glam-usage.toml"),
            PathBuf::from(".glam-usage.toml"),
        ];
        if let Some(dir) = dirs::config_dir() {
            candidates.push(dir.join("glam-usage").join("config.toml"));
        }
        candidates
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn apply_env_overrides(&mut self) -> Result<()> {
        env_string("LOG_LEVEL", &mut self.logging.level);
        env_string("LOG_FORMAT", &mut self.logging.format);
        env_string("LOG_OUTPUT", &mut self.logging.output);
        env_path("GLAM_USAGE_LOG_DIR", &mut self.logging.directory);

        env_path("GLAM_USAGE_STORE_ROOT", &mut self.store.root);

        env_string("GLAM_USAGE_CATEGORY", &mut self.capture.category);
        env_string("GLAM_USAGE_SUBDIR", &mut self.capture.subdir);
        if let Ok(raw) = env::var("GLAM_USAGE_DEPTH") {
            self.capture.depth = raw.parse().context("Invalid GLAM_USAGE_DEPTH")?;
        }

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.capture.depth == 0 {
            anyhow::bail!("Category depth must be greater than 0");
        }
        if self.capture.subdir.trim().is_empty() {
            anyhow::bail!("Category subdirectory must not be empty");
        }
        if self.store.root.as_os_str().is_empty() {
            anyhow::bail!("Store root must not be empty");
        }
        Ok(())
    }
}

fn env_string(var: &str, target: &mut String) {
    if let Ok(value) = env::var(var) {
        *target = value;
    }
}

fn env_path(var: &str, target: &mut PathBuf) {
    if let Ok(value) = env::var(var) {
        *target = PathBuf::from(value);
    }
}

static CONFIG: OnceLock<Config> = OnceLock::new();

/// The process-wide configuration, resolved on first access.
pub fn get_config() -> &'static Config {
    CONFIG.get_or_init(|| Config::load().expect("Failed to load configuration"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.logging.level, "ERROR");
        assert_eq!(config.store.root, PathBuf::from("reports"));
        assert_eq!(config.capture.depth, 12);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_override() {
        env::set_var("GLAM_USAGE_DEPTH", "4");
        let mut config = Config::default();
        config.apply_env_overrides().unwrap();
        assert_eq!(config.capture.depth, 4);
        env::remove_var("GLAM_USAGE_DEPTH");
    }

    #[test]
    fn test_zero_depth_is_rejected() {
        let mut config = Config::default();
        config.capture.depth = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_blank_subdir_is_rejected() {
        let mut config = Config::default();
        config.capture.subdir = "  ".to_string();
        assert!(config.validate().is_err());
    }
}
