// RUNTIME PREFERENCES (User Experience)

use super::constants::compile_time;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

fn env_flag(name: &str, default: bool) -> bool {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingPreferences {
    /// Whether to use structured JSON logging
    pub use_structured_logging: bool,

    /// Whether to enable console output
    pub enable_console_logging: bool,

    /// Minimum level that reaches the configured logger
    pub min_log_level: LogLevel,
}

impl Default for LoggingPreferences {
    fn default() -> Self {
        Self {
            use_structured_logging: env_flag(env_vars::LOGGING_USE_STRUCTURED, false),
            enable_console_logging: env_flag(env_vars::LOGGING_ENABLE_CONSOLE, false),
            min_log_level: env::var(env_vars::LOGGING_MIN_LEVEL)
                .ok()
                .and_then(|v| parse_log_level(&v))
                .unwrap_or(LogLevel::Info),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderPreferences {
    /// Whether snapshot files must carry the .sps extension
    pub require_sps_extension: bool,

    /// Upper bound on snapshot size; may only tighten the compile-time limit
    pub max_snapshot_size: u64,
}

impl Default for LoaderPreferences {
    fn default() -> Self {
        Self {
            require_sps_extension: env_flag(env_vars::LOADER_REQUIRE_SPS_EXTENSION, true),
            max_snapshot_size: env::var(env_vars::LOADER_MAX_SNAPSHOT_SIZE)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(compile_time::loader::MAX_SNAPSHOT_FILE_SIZE),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupingPreferences {
    /// Grouping tokens used when the caller supplies none
    pub default_grouping: String,

    /// Whether newly seen group nodes start expanded
    pub expand_new_nodes: bool,
}

impl Default for GroupingPreferences {
    fn default() -> Self {
        Self {
            default_grouping: env::var(env_vars::GROUPING_DEFAULT)
                .unwrap_or_else(|_| compile_time::grouping::DEFAULT_GROUPING.to_string()),
            expand_new_nodes: env_flag(env_vars::GROUPING_EXPAND_NEW_NODES, false),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error = 0,
    Warning = 1,
    Info = 2,
    Debug = 3,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warning => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
        }
    }

    /// Convert to events::LogLevel for compatibility
    pub fn to_events_log_level(&self) -> crate::logging::events::LogLevel {
        match self {
            LogLevel::Error => crate::logging::events::LogLevel::Error,
            LogLevel::Warning => crate::logging::events::LogLevel::Warning,
            LogLevel::Info => crate::logging::events::LogLevel::Info,
            LogLevel::Debug => crate::logging::events::LogLevel::Debug,
        }
    }
}

/// Parse log level from string (used for environment variables)
pub fn parse_log_level(level: &str) -> Option<LogLevel> {
    match level.to_lowercase().as_str() {
        "error" | "0" => Some(LogLevel::Error),
        "warning" | "warn" | "1" => Some(LogLevel::Warning),
        "info" | "2" => Some(LogLevel::Info),
        "debug" | "3" => Some(LogLevel::Debug),
        _ => None,
    }
}

/// Errors raised while loading or validating runtime configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read configuration file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

impl ConfigError {
    pub fn error_code(&self) -> crate::logging::Code {
        use crate::logging::codes;
        match self {
            ConfigError::Io { .. } => codes::loader::IO_ERROR,
            ConfigError::Parse(_) | ConfigError::InvalidValue { .. } => {
                codes::system::CONFIGURATION_INVALID
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub logging: LoggingPreferences,
    pub loader: LoaderPreferences,
    pub grouping: GroupingPreferences,
}

impl RuntimeConfig {
    /// Parse a TOML document; missing sections fall back to environment defaults
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: RuntimeConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.loader.max_snapshot_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "loader.max_snapshot_size",
                reason: "must be greater than zero".to_string(),
            });
        }

        if self.loader.max_snapshot_size > compile_time::loader::MAX_SNAPSHOT_FILE_SIZE {
            return Err(ConfigError::InvalidValue {
                field: "loader.max_snapshot_size",
                reason: format!(
                    "exceeds compile-time limit of {} bytes",
                    compile_time::loader::MAX_SNAPSHOT_FILE_SIZE
                ),
            });
        }

        if self.grouping.default_grouping.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "grouping.default_grouping",
                reason: "must name at least one grouping level".to_string(),
            });
        }

        Ok(())
    }
}

/// Environment variable names for configuration
pub mod env_vars {
    // Logging
    pub const LOGGING_USE_STRUCTURED: &str = "DASH_LOGGING_USE_STRUCTURED";
    pub const LOGGING_ENABLE_CONSOLE: &str = "DASH_LOGGING_ENABLE_CONSOLE";
    pub const LOGGING_MIN_LEVEL: &str = "DASH_LOGGING_MIN_LEVEL";

    // Loader
    pub const LOADER_REQUIRE_SPS_EXTENSION: &str = "DASH_LOADER_REQUIRE_SPS_EXTENSION";
    pub const LOADER_MAX_SNAPSHOT_SIZE: &str = "DASH_LOADER_MAX_SNAPSHOT_SIZE";

    // Grouping
    pub const GROUPING_DEFAULT: &str = "DASH_GROUPING_DEFAULT";
    pub const GROUPING_EXPAND_NEW_NODES: &str = "DASH_GROUPING_EXPAND_NEW_NODES";
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::io::Write;

    #[test]
    fn test_log_level_parsing() {
        assert_eq!(parse_log_level("error"), Some(LogLevel::Error));
        assert_eq!(parse_log_level("WARN"), Some(LogLevel::Warning));
        assert_eq!(parse_log_level("2"), Some(LogLevel::Info));
        assert_eq!(parse_log_level("debug"), Some(LogLevel::Debug));
        assert_eq!(parse_log_level("verbose"), None);
    }

    #[test]
    fn test_toml_overrides_sections() {
        let config = RuntimeConfig::from_toml_str(
            r#"
            [loader]
            require_sps_extension = false
            max_snapshot_size = 1024

            [grouping]
            default_grouping = "tag|service,control,result"
            "#,
        )
        .unwrap();

        assert!(!config.loader.require_sps_extension);
        assert_eq!(config.loader.max_snapshot_size, 1024);
        assert_eq!(config.grouping.default_grouping, "tag|service,control,result");
    }

    #[test]
    fn test_rejects_oversized_limit() {
        let source = format!(
            "[loader]\nmax_snapshot_size = {}\n",
            compile_time::loader::MAX_SNAPSHOT_FILE_SIZE + 1
        );
        assert_matches!(
            RuntimeConfig::from_toml_str(&source),
            Err(ConfigError::InvalidValue {
                field: "loader.max_snapshot_size",
                ..
            })
        );
    }

    #[test]
    fn test_rejects_malformed_toml() {
        assert_matches!(
            RuntimeConfig::from_toml_str("[loader\n"),
            Err(ConfigError::Parse(_))
        );
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[logging]\nmin_log_level = \"debug\"").unwrap();

        let config = RuntimeConfig::load(file.path()).unwrap();
        assert_eq!(config.logging.min_log_level, LogLevel::Debug);
    }

    #[test]
    fn test_structured_logging_from_toml() {
        let config =
            RuntimeConfig::from_toml_str("[logging]\nuse_structured_logging = true\n").unwrap();
        assert!(config.logging.use_structured_logging);
    }

    #[test]
    fn test_error_codes() {
        use crate::logging::codes;

        let err = RuntimeConfig::from_toml_str("[loader\n").unwrap_err();
        assert_eq!(err.error_code(), codes::system::CONFIGURATION_INVALID);

        let err = RuntimeConfig::load(std::path::Path::new("/nonexistent/dash.toml")).unwrap_err();
        assert_eq!(err.error_code(), codes::loader::IO_ERROR);
    }
}
