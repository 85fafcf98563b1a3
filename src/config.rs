//! Loading logger settings from JSON or the environment.

use std::env;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::flags::{Flags, ParseError};
use crate::level::LevelSet;
use crate::logger::Logger;
use crate::sink::Sink;

pub const ENV_PREFIX: &str = "ALOG_PREFIX";
pub const ENV_FLAGS: &str = "ALOG_FLAGS";
pub const ENV_LEVELS: &str = "ALOG_LEVELS";

/// Everything needed to build a [`Logger`] except its sink.
///
/// Flags and levels are written as text in serialized form:
///
/// ```
/// # use alog::{Config, Flags, Level};
/// let config = Config::from_json(r#"{"prefix":"api|","flags":"std|utc","levels":"warn|error"}"#)?;
/// assert_eq!(config.flags, Flags::STD | Flags::UTC);
/// assert!(config.levels.contains(Level::Warn));
/// assert!(!config.levels.contains(Level::Info));
/// # Ok::<(), alog::ConfigError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub prefix: String,
    #[serde(with = "as_text")]
    pub flags: Flags,
    #[serde(with = "as_text")]
    pub levels: LevelSet,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            prefix: String::new(),
            flags: Flags::STD,
            levels: LevelSet::default(),
        }
    }
}

impl Config {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(ConfigError::Json)
    }

    /// Reads `ALOG_PREFIX`, `ALOG_FLAGS` and `ALOG_LEVELS`. Unset variables
    /// keep their [`Default`] values.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(prefix) = lookup(ENV_PREFIX) {
            config.prefix = prefix;
        }
        if let Some(flags) = lookup(ENV_FLAGS) {
            config.flags = flags.parse().map_err(|e| ConfigError::Env(ENV_FLAGS, e))?;
        }
        if let Some(levels) = lookup(ENV_LEVELS) {
            config.levels = levels.parse().map_err(|e| ConfigError::Env(ENV_LEVELS, e))?;
        }
        Ok(config)
    }

    pub fn to_json(&self) -> String {
        // all fields serialize as plain strings
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Builds a logger writing to `sink`, or discarding if `None`.
    pub fn build(&self, sink: Option<Box<dyn Sink>>) -> Logger {
        let logger = Logger::new(sink, &self.prefix, self.flags);
        logger.set_levels(self.levels);
        logger
    }
}

/// Why a [`Config`] could not be loaded.
#[derive(Debug)]
pub enum ConfigError {
    Json(serde_json::Error),
    /// The named environment variable holds an unknown flag or level.
    Env(&'static str, ParseError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Json(err) => write!(f, "invalid logger config: {err}"),
            ConfigError::Env(var, err) => write!(f, "invalid {var}: {err}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Json(err) => Some(err),
            ConfigError::Env(_, err) => Some(err),
        }
    }
}

mod as_text {
    use std::fmt::Display;
    use std::str::FromStr;

    use serde::de::Error as _;

    use super::{Deserialize, Deserializer, Serializer};

    pub fn serialize<T: Display, S: Serializer>(value: &T, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<T, D::Error>
    where
        T: FromStr,
        T::Err: Display,
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(D::Error::custom)
    }
}
