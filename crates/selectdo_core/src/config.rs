//! Runtime configuration for the core.
//!
//! # Responsibility
//! - Hold every tunable the store, filter engine and focus controller read.
//! - Load from defaults, an optional JSON file and `SELECTDO_*` variables.
//!
//! # Invariants
//! - Every field has a default; a partial JSON document is valid.
//! - `validate()` runs after every load path.

use crate::filter::engine::ShuffleMode;
use crate::focus::FocusStartPolicy;
use crate::logging::{default_log_level, parse_level};
use crate::model::task::{DEFAULT_CONTEXT, RECOGNIZED_CONTEXTS};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Path to a JSON config file.
pub const ENV_CONFIG_PATH: &str = "SELECTDO_CONFIG";
pub const ENV_DB_PATH: &str = "SELECTDO_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "SELECTDO_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "SELECTDO_LOG_DIR";
/// `every_derive|on_reshuffle|disabled`.
pub const ENV_SHUFFLE: &str = "SELECTDO_SHUFFLE";
/// `reject|replace`.
pub const ENV_FOCUS_POLICY: &str = "SELECTDO_FOCUS_POLICY";

const DEFAULT_MINUTES: u32 = 15;

#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, message: String },
    Parse(serde_json::Error),
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, message } => {
                write!(f, "failed to read config `{}`: {message}", path.display())
            }
            Self::Parse(err) => write!(f, "invalid config JSON: {err}"),
            Self::Invalid(message) => write!(f, "invalid config: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
            Self::Io { .. } | Self::Invalid(_) => None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

/// Core configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// SQLite file; `None` lets the host pick a location.
    pub db_path: Option<PathBuf>,
    pub log_level: String,
    /// Absolute directory for rolling log files.
    pub log_dir: Option<PathBuf>,
    /// Context selected by a fresh or reset Find screen.
    pub default_context: String,
    /// Time budget selected by a fresh or reset Find screen; `None` is "Custom".
    pub default_minutes: Option<u32>,
    pub recognized_contexts: Vec<String>,
    /// Rewrite contexts outside `recognized_contexts` to `default_context`.
    pub normalize_contexts: bool,
    pub haptics_enabled: bool,
    pub shuffle: ShuffleMode,
    pub focus_start_policy: FocusStartPolicy,
    /// Complete the bound task when a focus countdown runs out.
    pub complete_on_elapse: bool,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            log_level: default_log_level().to_string(),
            log_dir: None,
            default_context: DEFAULT_CONTEXT.to_string(),
            default_minutes: Some(DEFAULT_MINUTES),
            recognized_contexts: RECOGNIZED_CONTEXTS
                .iter()
                .map(|context| context.to_string())
                .collect(),
            normalize_contexts: true,
            haptics_enabled: true,
            shuffle: ShuffleMode::default(),
            focus_start_policy: FocusStartPolicy::default(),
            complete_on_elapse: false,
        }
    }
}

impl CoreConfig {
    /// Parses a (possibly partial) JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a JSON config file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|err| ConfigError::Io {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;
        Self::from_json_str(&raw)
    }

    /// Defaults, then `SELECTDO_CONFIG` file if set, then variable overrides.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with(|key| std::env::var(key).ok())
    }

    /// `load` with an injectable variable lookup.
    pub fn load_with(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let base = match non_blank(lookup(ENV_CONFIG_PATH)) {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        let config = base.with_overrides(lookup)?;
        config.validate()?;
        Ok(config)
    }

    fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(path) = non_blank(lookup(ENV_DB_PATH)) {
            self.db_path = Some(PathBuf::from(path));
        }
        if let Some(level) = non_blank(lookup(ENV_LOG_LEVEL)) {
            self.log_level = level;
        }
        if let Some(dir) = non_blank(lookup(ENV_LOG_DIR)) {
            self.log_dir = Some(PathBuf::from(dir));
        }
        if let Some(raw) = non_blank(lookup(ENV_SHUFFLE)) {
            self.shuffle = ShuffleMode::parse(&raw)
                .ok_or_else(|| ConfigError::Invalid(format!("{ENV_SHUFFLE}=`{raw}`")))?;
        }
        if let Some(raw) = non_blank(lookup(ENV_FOCUS_POLICY)) {
            self.focus_start_policy = FocusStartPolicy::parse(&raw)
                .ok_or_else(|| ConfigError::Invalid(format!("{ENV_FOCUS_POLICY}=`{raw}`")))?;
        }
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        parse_level(&self.log_level).map_err(|err| ConfigError::Invalid(err.to_string()))?;

        if self.default_context.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "default_context must not be blank".to_string(),
            ));
        }
        if self.recognized_contexts.is_empty() {
            return Err(ConfigError::Invalid(
                "recognized_contexts must not be empty".to_string(),
            ));
        }
        if self.normalize_contexts
            && !self
                .recognized_contexts
                .iter()
                .any(|context| context == &self.default_context)
        {
            return Err(ConfigError::Invalid(format!(
                "default_context `{}` is not a recognized context",
                self.default_context
            )));
        }
        if self.default_minutes == Some(0) {
            return Err(ConfigError::Invalid(
                "default_minutes must be greater than zero".to_string(),
            ));
        }
        if let Some(dir) = self.log_dir.as_ref() {
            if !dir.is_absolute() {
                return Err(ConfigError::Invalid(format!(
                    "log_dir must be absolute, got `{}`",
                    dir.display()
                )));
            }
        }
        Ok(())
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
