//! Domain types for the Portainer stack API.
//!
//! Field names follow the JSON the API speaks (PascalCase for stacks,
//! lowercase for env pairs). All types are plain data: the reconciler reads
//! them and never mutates them.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Env var name that opts a stack out of automated redeploys.
pub const IGNORE_ENV_KEY: &str = "PULLTAINER_IGNORE";

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// Identifier of a stack, stable for the stack's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StackId(pub i64);

impl fmt::Display for StackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<i64> for StackId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// Identifier of the Portainer environment (endpoint) a stack runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EndpointId(pub i64);

impl fmt::Display for EndpointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<i64> for EndpointId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// Compose file content of a stack, passed back verbatim on redeploy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackDefinition(pub String);

impl StackDefinition {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for StackDefinition {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for StackDefinition {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Portainer's stack status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StackStatus {
    /// Code `1`; the only status that is ever redeployed.
    Active,
    /// Code `2`.
    Inactive,
    Unknown(i64),
}

impl StackStatus {
    pub fn code(self) -> i64 {
        match self {
            StackStatus::Active => 1,
            StackStatus::Inactive => 2,
            StackStatus::Unknown(code) => code,
        }
    }

    pub fn is_running(self) -> bool {
        self == StackStatus::Active
    }
}

impl From<i64> for StackStatus {
    fn from(code: i64) -> Self {
        match code {
            1 => StackStatus::Active,
            2 => StackStatus::Inactive,
            other => StackStatus::Unknown(other),
        }
    }
}

impl Serialize for StackStatus {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.code())
    }
}

impl<'de> Deserialize<'de> for StackStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        i64::deserialize(deserializer).map(StackStatus::from)
    }
}

impl fmt::Display for StackStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StackStatus::Active => write!(f, "active"),
            StackStatus::Inactive => write!(f, "inactive"),
            StackStatus::Unknown(code) => write!(f, "unknown({code})"),
        }
    }
}

/// Result of Portainer's `images_status` check for a stack.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ImageStatus {
    Outdated,
    Updated,
    Processing,
    Skipped,
    Error,
    Other(String),
}

impl ImageStatus {
    /// Only an exact `outdated` answer authorises a redeploy.
    pub fn is_outdated(&self) -> bool {
        matches!(self, ImageStatus::Outdated)
    }

    pub fn as_str(&self) -> &str {
        match self {
            ImageStatus::Outdated => "outdated",
            ImageStatus::Updated => "updated",
            ImageStatus::Processing => "processing",
            ImageStatus::Skipped => "skipped",
            ImageStatus::Error => "error",
            ImageStatus::Other(raw) => raw,
        }
    }
}

impl From<&str> for ImageStatus {
    fn from(raw: &str) -> Self {
        match raw {
            "outdated" => ImageStatus::Outdated,
            "updated" => ImageStatus::Updated,
            "processing" => ImageStatus::Processing,
            "skipped" => ImageStatus::Skipped,
            "error" => ImageStatus::Error,
            other => ImageStatus::Other(other.to_owned()),
        }
    }
}

impl From<String> for ImageStatus {
    fn from(raw: String) -> Self {
        ImageStatus::from(raw.as_str())
    }
}

impl Serialize for ImageStatus {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl fmt::Display for ImageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Domain structs
// ---------------------------------------------------------------------------

/// Answer of the `images_status` endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageStatusReport {
    pub status: ImageStatus,
    /// Free-form detail Portainer sometimes attaches, e.g. a registry error.
    pub message: Option<String>,
}

impl ImageStatusReport {
    pub fn new(status: impl Into<ImageStatus>) -> Self {
        Self {
            status: status.into(),
            message: None,
        }
    }
}

/// One `{name, value}` entry of a stack's environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvPair {
    pub name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub value: String,
}

impl EnvPair {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A stack as returned by `GET /api/stacks`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stack {
    #[serde(rename = "Id")]
    pub id: StackId,
    #[serde(rename = "Name", default)]
    pub name: String,
    #[serde(rename = "EndpointId")]
    pub endpoint_id: EndpointId,
    #[serde(rename = "Env", default, deserialize_with = "null_as_empty")]
    pub env: Vec<EnvPair>,
    #[serde(rename = "Status")]
    pub status: StackStatus,
    #[serde(rename = "Webhook", default, deserialize_with = "null_as_empty")]
    pub webhook: String,
}

impl Stack {
    /// True when any env name equals [`IGNORE_ENV_KEY`], ignoring ASCII case.
    /// The value is not inspected.
    pub fn is_ignored(&self) -> bool {
        self.env
            .iter()
            .any(|pair| pair.name.eq_ignore_ascii_case(IGNORE_ENV_KEY))
    }
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
