//! Structured logging configuration.

use crate::config::LoggingSettings;
use std::path::PathBuf;
use std::str::FromStr;
use tracing_subscriber::EnvFilter;

/// Environment variables consulted for a filter, in order.
const FILTER_ENV_VARS: [&str; 2] = ["ROSTER_LOG", "RUST_LOG"];

/// Log line format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human readable, multi-line output.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pretty" | "text" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format '{other}'")),
        }
    }
}

/// Resolved logging configuration.
#[derive(Debug)]
pub struct LoggingConfig {
    /// Event filter.
    pub filter: EnvFilter,
    /// Output format.
    pub format: LogFormat,
    /// File to append to instead of stderr.
    pub file: Option<PathBuf>,
}

impl LoggingConfig {
    /// Builds a logging configuration from file settings.
    ///
    /// A filter in `ROSTER_LOG` or `RUST_LOG` wins over the configured
    /// level. `verbose` raises the default level to `debug`.
    #[must_use]
    pub fn from_settings(settings: Option<&LoggingSettings>, verbose: bool) -> Self {
        let env_filter = FILTER_ENV_VARS
            .iter()
            .find_map(|key| std::env::var(key).ok())
            .filter(|v| !v.trim().is_empty());
        Self::resolve(settings, verbose, env_filter.as_deref())
    }

    fn resolve(settings: Option<&LoggingSettings>, verbose: bool, env_filter: Option<&str>) -> Self {
        let default_level = if verbose { "debug" } else { "warn" };
        let directive = match env_filter {
            Some(directive) => directive,
            None if verbose => default_level,
            None => settings
                .and_then(|s| s.level.as_deref())
                .unwrap_or(default_level),
        };

        let filter = EnvFilter::try_new(directive).unwrap_or_else(|e| {
            eprintln_invalid(directive, &e);
            EnvFilter::new(default_level)
        });

        let format = settings
            .and_then(|s| s.format.as_deref())
            .and_then(|f| f.parse().ok())
            .unwrap_or_default();

        Self {
            filter,
            format,
            file: settings.and_then(|s| s.file.clone()),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self::resolve(None, false, None)
    }
}

#[allow(clippy::print_stderr)]
fn eprintln_invalid(directive: &str, error: &tracing_subscriber::filter::ParseError) {
    eprintln!("roster: ignoring invalid log filter '{directive}': {error}");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(level: Option<&str>, format: Option<&str>) -> LoggingSettings {
        LoggingSettings {
            format: format.map(str::to_string),
            level: level.map(str::to_string),
            file: None,
        }
    }

    #[test]
    fn test_log_format_parse() {
        assert_eq!("json".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("Pretty".parse::<LogFormat>().unwrap(), LogFormat::Pretty);
        assert!("xml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn test_defaults() {
        let config = LoggingConfig::default();
        assert_eq!(config.format, LogFormat::Pretty);
        assert_eq!(config.filter.to_string(), "warn");
        assert!(config.file.is_none());
    }

    #[test]
    fn test_settings_level_and_format() {
        let s = settings(Some("info"), Some("json"));
        let config = LoggingConfig::resolve(Some(&s), false, None);
        assert_eq!(config.filter.to_string(), "info");
        assert_eq!(config.format, LogFormat::Json);
    }

    #[test]
    fn test_verbose_raises_level() {
        let s = settings(Some("info"), None);
        let config = LoggingConfig::resolve(Some(&s), true, None);
        assert_eq!(config.filter.to_string(), "debug");
    }

    #[test]
    fn test_env_filter_wins() {
        let s = settings(Some("info"), None);
        let config = LoggingConfig::resolve(Some(&s), true, Some("roster=trace"));
        assert_eq!(config.filter.to_string(), "roster=trace");
    }

    #[test]
    fn test_unknown_format_falls_back() {
        let s = settings(None, Some("xml"));
        let config = LoggingConfig::resolve(Some(&s), false, None);
        assert_eq!(config.format, LogFormat::Pretty);
    }
}
