//! Configuration management.
//!
//! Settings come from a TOML file and a few environment overrides:
//!
//! ```toml
//! data_file = "students_data.json"
//! strict_add = false
//!
//! [logging]
//! format = "pretty"   # or "json"
//! level = "info"
//! file = "/var/log/roster.log"
//! ```

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable naming an explicit config file.
pub const CONFIG_PATH_ENV: &str = "ROSTER_CONFIG_PATH";

/// Environment variable overriding the data file location.
pub const DATA_FILE_ENV: &str = "ROSTER_DATA_FILE";

/// Default data file, relative to the working directory.
pub const DEFAULT_DATA_FILE: &str = "students_data.json";

/// Main configuration for roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RosterConfig {
    /// Location of the persisted student array.
    pub data_file: PathBuf,
    /// Whether added students must pass the name and age rules.
    pub strict_add: bool,
    /// Logging settings.
    pub logging: LoggingSettings,
}

/// Logging section of the config file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Output format: `pretty` or `json`.
    pub format: Option<String>,
    /// Default filter directive, such as `info` or `roster=debug`.
    pub level: Option<String>,
    /// File to append log lines to instead of stderr.
    pub file: Option<PathBuf>,
}

/// Configuration file structure (for TOML parsing).
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    /// Data file path.
    pub data_file: Option<String>,
    /// Strict add validation.
    pub strict_add: Option<bool>,
    /// Logging configuration.
    pub logging: Option<LoggingSettings>,
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from(DEFAULT_DATA_FILE),
            strict_add: false,
            logging: LoggingSettings::default(),
        }
    }
}

impl RosterConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the effective configuration.
    ///
    /// The file is taken from `explicit`, then `ROSTER_CONFIG_PATH`, then the
    /// default locations. `ROSTER_DATA_FILE` is applied last.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicitly named file cannot be read or parsed.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let env_path = std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from);
        let config = match explicit.map(Path::to_path_buf).or(env_path) {
            Some(path) => Self::load_from_file(&path)?,
            None => Self::load_default(),
        };
        Ok(config.with_overrides(|key| std::env::var(key).ok()))
    }

    /// Loads configuration from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| Error::OperationFailed {
            operation: "read_config_file".to_string(),
            cause: format!("{}: {e}", path.display()),
        })?;

        let file: ConfigFile = toml::from_str(&contents).map_err(|e| Error::OperationFailed {
            operation: "parse_config_file".to_string(),
            cause: format!("{}: {e}", path.display()),
        })?;

        tracing::debug!(path = %path.display(), "loaded config file");
        Ok(Self::from_config_file(file))
    }

    /// Loads configuration from the default location.
    ///
    /// Checks the following paths in order:
    /// 1. Platform-specific config dir (`~/Library/Application Support/roster/` on macOS)
    /// 2. XDG config dir (`~/.config/roster/` for Unix compatibility)
    ///
    /// Returns default configuration if no readable config file is found.
    #[must_use]
    pub fn load_default() -> Self {
        let Some(base_dirs) = directories::BaseDirs::new() else {
            return Self::default();
        };

        let candidates = [
            base_dirs.config_dir().join("roster").join("config.toml"),
            base_dirs
                .home_dir()
                .join(".config")
                .join("roster")
                .join("config.toml"),
        ];

        candidates
            .iter()
            .filter(|path| path.exists())
            .find_map(|path| {
                Self::load_from_file(path)
                    .map_err(|e| tracing::warn!(error = %e, "ignoring config file"))
                    .ok()
            })
            .unwrap_or_default()
    }

    /// Applies environment overrides read through `var`.
    #[must_use]
    pub fn with_overrides(mut self, var: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(data_file) = var(DATA_FILE_ENV).filter(|v| !v.trim().is_empty()) {
            self.data_file = PathBuf::from(data_file);
        }
        self
    }

    /// Sets the data file.
    #[must_use]
    pub fn with_data_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.data_file = path.into();
        self
    }

    /// Enables or disables strict add validation.
    #[must_use]
    pub const fn with_strict_add(mut self, strict: bool) -> Self {
        self.strict_add = strict;
        self
    }

    /// Renders the configuration as TOML.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::OperationFailed {
            operation: "serialize_config".to_string(),
            cause: e.to_string(),
        })
    }

    /// Converts a `ConfigFile` to `RosterConfig`.
    fn from_config_file(file: ConfigFile) -> Self {
        let mut config = Self::default();

        if let Some(data_file) = file.data_file {
            config.data_file = PathBuf::from(data_file);
        }
        if let Some(strict_add) = file.strict_add {
            config.strict_add = strict_add;
        }
        if let Some(logging) = file.logging {
            config.logging = logging;
        }

        config
    }
}
