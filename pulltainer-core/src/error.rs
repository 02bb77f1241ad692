//! Error types for pulltainer-core.

use thiserror::Error;

/// Startup misconfiguration detected while validating [`crate::Settings`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettingsError {
    /// The Portainer base URL is empty or does not parse.
    #[error("invalid Portainer URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The API key is missing or blank.
    #[error("Portainer API key is empty; set PULLTAINER_API_KEY")]
    MissingApiKey,

    /// A zero timeout would fail every request immediately.
    #[error("request timeout must be at least one second")]
    ZeroTimeout,

    /// Unknown `--log-format` value.
    #[error("unknown log format '{0}'; expected: text, json")]
    UnknownLogFormat(String),
}
