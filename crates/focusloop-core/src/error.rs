//! Core error types for focusloop-core.
//!
//! The taxonomy is deliberately small: configuration problems are
//! rejected up front, observer failures are passed through untouched,
//! and everything else an engine command can hit is a no-op rather than
//! an error.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Core error type for focusloop-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// An observer failed while handling an engine event
    #[error("Observer error: {0}")]
    Observer(#[from] ObserverError),

    /// The timer service task is gone
    #[error("Timer service has shut down")]
    ServiceClosed,
}

/// Configuration-specific errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A phase duration was zero
    #[error("Invalid duration for '{field}': must be greater than zero")]
    InvalidDuration { field: &'static str },

    /// Long-break cadence below one
    #[error("Invalid long break interval: must be at least 1")]
    InvalidInterval,

    /// Configuration changes are refused while the timer runs
    #[error("Configuration cannot change while the timer is running")]
    EngineRunning,

    /// Failed to load the settings file
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save the settings file
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Failed to parse the settings file
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),

    /// Dot-path key does not exist
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Value does not fit the key's type
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

/// Error returned by an [`Observer`](crate::observer::Observer) callback.
///
/// The engine never inspects or wraps it further: whatever the observer
/// returned reaches the caller of the engine command that triggered the
/// notification.
pub struct ObserverError(Box<dyn std::error::Error + Send + Sync>);

impl ObserverError {
    pub fn new<E>(err: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self(err.into())
    }
}

impl fmt::Debug for ObserverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for ObserverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for ObserverError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::ParseFailed(err.to_string())
    }
}
