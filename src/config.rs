//! Layered application configuration.
//!
//! Settings are merged from, lowest to highest priority:
//! 1. Built-in defaults
//! 2. A TOML file (`--config`, or `config.toml` in the platform config dir)
//! 3. Environment variables prefixed `DEDUPE_` (e.g. `DEDUPE_PREHASH_SIZE`)
//!
//! Command-line flags are applied on top by the binary.
//!
//! ```toml
//! prehash_size = 8192
//! skip_hidden = true
//! ignore_patterns = ["*.tmp", "node_modules/"]
//! ```

use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::duplicates::DEFAULT_CHANNEL_CAPACITY;
use crate::scanner::PREHASH_SIZE;

/// Prefix of the environment variables read by [`Config::load`].
pub const ENV_PREFIX: &str = "DEDUPE_";

/// Errors raised while loading or saving configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A source held a malformed file or an invalid value.
    #[error("Invalid configuration: {0}")]
    Invalid(#[from] Box<figment::Error>),

    /// The configuration could not be serialized.
    #[error("Failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// Reading or writing the file failed.
    #[error("Config I/O error for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Bytes covered by a prefix fingerprint.
    pub prehash_size: u64,
    /// Capacity of each pipeline queue.
    pub channel_capacity: usize,
    /// Skip dot files and directories.
    pub skip_hidden: bool,
    /// Skip zero-length files.
    pub skip_empty: bool,
    /// Follow symbolic links while walking.
    pub follow_symlinks: bool,
    /// Gitignore-style patterns excluded from the walk.
    pub ignore_patterns: Vec<String>,
    /// Remove duplicates instead of moving them to trash.
    pub permanent_delete: bool,
    /// Write a header row in CSV output.
    pub csv_header: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            prehash_size: PREHASH_SIZE as u64,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            skip_hidden: false,
            skip_empty: false,
            follow_symlinks: false,
            ignore_patterns: Vec::new(),
            permanent_delete: false,
            csv_header: false,
        }
    }
}

impl Config {
    /// The merged provider chain for an optional explicit file.
    ///
    /// Without an explicit file, the platform default path is used when it
    /// can be determined. A missing file contributes nothing.
    #[must_use]
    pub fn figment(file: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        let file = file.map(Path::to_path_buf).or_else(Self::config_path);
        if let Some(path) = file {
            log::debug!("Reading configuration from {}", path.display());
            figment = figment.merge(Toml::file(path));
        }
        figment.merge(Env::prefixed(ENV_PREFIX))
    }

    /// Load the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` for malformed TOML or a value of the
    /// wrong type in any source.
    pub fn load(file: Option<&Path>) -> Result<Self, ConfigError> {
        Self::figment(file)
            .extract()
            .map_err(|e| ConfigError::Invalid(Box::new(e)))
    }

    /// Write this configuration as TOML, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if serialization or the write fails.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let io_err = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content).map_err(io_err)?;
        Ok(())
    }

    /// Platform-specific default configuration file.
    #[must_use]
    pub fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "dedupe").map(|dirs| dirs.config_dir().join("config.toml"))
    }
}
