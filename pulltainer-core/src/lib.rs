//! Pulltainer core library: domain types and daemon settings.
//!
//! - [`types`]: stacks, env pairs, status codes as seen on the wire
//! - [`settings`]: [`Settings`], built once at startup
//! - [`error`]: [`SettingsError`]

pub mod error;
pub mod settings;
pub mod types;

pub use error::SettingsError;
pub use settings::{toggle_enabled, LogFormat, Settings, DEFAULT_CRON, DEFAULT_TIMEOUT_SECS};
pub use types::{
    EndpointId, EnvPair, ImageStatus, ImageStatusReport, Stack, StackDefinition, StackId,
    StackStatus, IGNORE_ENV_KEY,
};
