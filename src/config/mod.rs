//! User configuration for solution-templatize.
//!
//! Settings live in a TOML file, by default `~/.solution-templatize/config.toml`
//! (`%LOCALAPPDATA%\solution-templatize\config.toml` on Windows). A missing
//! file means defaults; command line flags override whatever the file says.
//!
//! ```toml
//! # Use catalog urls and layer ids as literal text instead of patterns
//! pattern_mode = "escaped"
//!
//! # Rewrite object keys that equal field names
//! templatize_keys = false
//!
//! # Fail `resolve` on placeholders the settings cannot satisfy
//! strict_placeholders = true
//!
//! # Default tracing filter when RUST_LOG is unset
//! log_level = "debug"
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::templating::{PatternMode, TemplatizeOptions};

/// Name of the per-user configuration directory.
const CONFIG_DIR: &str = ".solution-templatize";

/// Persistent settings shared by every command.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// How catalog urls and ids are matched.
    #[serde(default)]
    pub pattern_mode: PatternMode,

    /// Rewrite object keys that equal field names.
    #[serde(default)]
    pub templatize_keys: bool,

    /// Treat unresolved placeholders as errors.
    #[serde(default)]
    pub strict_placeholders: bool,

    /// Tracing filter used when neither `RUST_LOG` nor a verbosity flag is set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
}

impl Settings {
    /// Load settings from `path`, or from [`Settings::default_path`] when `None`.
    ///
    /// A file that does not exist yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or is not valid
    /// TOML for this schema.
    pub async fn load_with_optional(path: Option<PathBuf>) -> Result<Self> {
        let path = match path {
            Some(path) => path,
            None => match Self::default_path() {
                Ok(path) => path,
                Err(e) => {
                    tracing::debug!("No default config location: {e}");
                    return Ok(Self::default());
                }
            },
        };

        if path.exists() {
            Self::load_from(&path).await
        } else {
            tracing::debug!("No config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Load settings from a specific file.
    pub async fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))
    }

    /// Write settings to `path`, creating parent directories as needed.
    pub async fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.with_context(|| {
                format!("Failed to create config directory {}", parent.display())
            })?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, content)
            .await
            .with_context(|| format!("Failed to write config to {}", path.display()))
    }

    /// Platform default location of the config file.
    ///
    /// # Errors
    ///
    /// Returns an error if the home (or local data) directory is unknown.
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = if cfg!(target_os = "windows") {
            dirs::data_local_dir()
                .ok_or_else(|| anyhow::anyhow!("Unable to determine local data directory"))?
                .join("solution-templatize")
        } else {
            dirs::home_dir()
                .ok_or_else(|| anyhow::anyhow!("Unable to determine home directory"))?
                .join(CONFIG_DIR)
        };

        Ok(config_dir.join("config.toml"))
    }

    /// Templatizer options described by these settings.
    #[must_use]
    pub const fn templatize_options(&self) -> TemplatizeOptions {
        TemplatizeOptions {
            pattern_mode: self.pattern_mode,
            templatize_keys: self.templatize_keys,
        }
    }
}
