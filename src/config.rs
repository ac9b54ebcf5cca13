//! Application configuration management.
//!
//! Settings are layered, later layers winning:
//! defaults < `config.toml` in the platform config directory < environment
//! variables prefixed `DUPEFIND_` < command-line flags.
//!
//! The library never reads configuration itself; the binary resolves values
//! here and passes them down.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::output::DEFAULT_CSV_FILENAME;
use crate::scanner::DEFAULT_SKIP_NAMES;

/// Prefix of environment variables read into [`Config`].
pub const ENV_PREFIX: &str = "DUPEFIND_";

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Number of I/O threads used for hashing.
    pub io_threads: usize,
    /// File names never considered (e.g. `.DS_Store`).
    pub skip_names: Vec<String>,
    /// Only hash files that share their size with another file.
    pub fast_scan: bool,
    /// Default file name for saved tables.
    pub csv_filename: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            io_threads: 4,
            skip_names: DEFAULT_SKIP_NAMES.iter().map(|s| (*s).to_string()).collect(),
            fast_scan: false,
            csv_filename: DEFAULT_CSV_FILENAME.to_string(),
        }
    }
}

impl Config {
    /// Load the configuration from the default platform-specific path and
    /// the environment.
    ///
    /// Falls back to defaults if anything fails to load.
    pub fn load() -> Self {
        let path = Self::config_path().ok();
        match Self::figment(path.as_deref(), ENV_PREFIX).extract::<Self>() {
            Ok(config) => config.sanitized(),
            Err(e) => {
                log::debug!("Failed to load config, using defaults: {}", e);
                Self::default()
            }
        }
    }

    /// Build the layered provider chain.
    ///
    /// A missing file is skipped silently.
    #[must_use]
    pub fn figment(file: Option<&Path>, env_prefix: &str) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(path) = file {
            figment = figment.merge(Toml::file(path));
        }
        figment.merge(Env::prefixed(env_prefix))
    }

    /// Load from a specific file, ignoring the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be parsed.
    pub fn load_from(path: &Path) -> Result<Self> {
        let config: Self = Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(path))
            .extract()
            .with_context(|| format!("Invalid configuration in {}", path.display()))?;
        Ok(config.sanitized())
    }

    fn sanitized(mut self) -> Self {
        self.io_threads = self.io_threads.max(1);
        self
    }

    /// Get the default platform-specific configuration path.
    ///
    /// # Errors
    ///
    /// Returns an error if no home directory can be determined.
    pub fn config_path() -> Result<PathBuf> {
        let project_dirs = ProjectDirs::from("com", "dupefind", "dupefind")
            .ok_or_else(|| anyhow::anyhow!("Failed to determine project directories"))?;
        Ok(project_dirs.config_dir().join("config.toml"))
    }
}
