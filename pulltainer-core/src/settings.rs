//! Immutable daemon settings.
//!
//! Built once at startup from the environment (via the CLI) and handed to the
//! client, the reconciler and the scheduler. Nothing reads the environment
//! after this point.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use url::Url;

use crate::error::SettingsError;

/// Daily at 04:00.
pub const DEFAULT_CRON: &str = "0 4 * * *";

pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Output format of the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" | "" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(SettingsError::UnknownLogFormat(other.to_string())),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogFormat::Text => write!(f, "text"),
            LogFormat::Json => write!(f, "json"),
        }
    }
}

/// Everything the daemon needs to know, validated.
#[derive(Clone, PartialEq, Eq)]
pub struct Settings {
    /// Root of the Portainer instance, e.g. `https://portainer.local:9443/`.
    pub base_url: Url,
    /// Sent as `X-API-Key` on every request.
    pub api_key: String,
    /// 5-field cron expression; parsed by the scheduler.
    pub cron: String,
    /// Ask `images_status` before redeploying (Portainer Business Edition only).
    pub check_image_status: bool,
    pub request_timeout: Duration,
    /// Evaluate stacks but never submit an update.
    pub dry_run: bool,
    pub log_format: LogFormat,
}

impl Settings {
    /// Validate the two required values; everything else takes its default.
    pub fn new(base_url: &str, api_key: impl Into<String>) -> Result<Self, SettingsError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(SettingsError::MissingApiKey);
        }

        Ok(Self {
            base_url: parse_base_url(base_url)?,
            api_key,
            cron: DEFAULT_CRON.to_string(),
            check_image_status: false,
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            dry_run: false,
            log_format: LogFormat::Text,
        })
    }

    /// An unset or blank expression keeps [`DEFAULT_CRON`].
    pub fn with_cron(mut self, cron: Option<&str>) -> Self {
        match cron.map(str::trim) {
            Some(expr) if !expr.is_empty() => self.cron = expr.to_string(),
            _ => self.cron = DEFAULT_CRON.to_string(),
        }
        self
    }

    pub fn with_image_status_check(mut self, enabled: bool) -> Self {
        self.check_image_status = enabled;
        self
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Result<Self, SettingsError> {
        if secs == 0 {
            return Err(SettingsError::ZeroTimeout);
        }
        self.request_timeout = Duration::from_secs(secs);
        Ok(self)
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn with_log_format(mut self, format: LogFormat) -> Self {
        self.log_format = format;
        self
    }
}

// The API key never reaches the logs.
impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &"<redacted>")
            .field("cron", &self.cron)
            .field("check_image_status", &self.check_image_status)
            .field("request_timeout", &self.request_timeout)
            .field("dry_run", &self.dry_run)
            .field("log_format", &self.log_format)
            .finish()
    }
}

/// A toggle is on only for a case-insensitive `true`.
pub fn toggle_enabled(raw: &str) -> bool {
    raw.eq_ignore_ascii_case("true")
}

fn parse_base_url(raw: &str) -> Result<Url, SettingsError> {
    let invalid = |reason: &str| SettingsError::InvalidUrl {
        url: raw.to_string(),
        reason: reason.to_string(),
    };

    if raw.trim().is_empty() {
        return Err(invalid("empty; set PULLTAINER_URL"));
    }
    let url = Url::parse(raw.trim()).map_err(|err| invalid(&err.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid("scheme must be http or https"));
    }
    if url.cannot_be_a_base() {
        return Err(invalid("not a base URL"));
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_after_new() {
        let settings = Settings::new("https://portainer.local", "ptr_abc").expect("settings");
        assert_eq!(settings.cron, DEFAULT_CRON);
        assert!(!settings.check_image_status);
        assert!(!settings.dry_run);
        assert_eq!(settings.request_timeout, Duration::from_secs(10));
        assert_eq!(settings.log_format, LogFormat::Text);
    }

    #[test]
    fn blank_cron_keeps_default() {
        let settings = Settings::new("http://p", "k")
            .expect("settings")
            .with_cron(Some("  "));
        assert_eq!(settings.cron, DEFAULT_CRON);

        let settings = settings.with_cron(Some("*/5 * * * *"));
        assert_eq!(settings.cron, "*/5 * * * *");
    }

    #[test]
    fn debug_output_redacts_api_key() {
        let settings = Settings::new("http://p", "super-secret").expect("settings");
        let rendered = format!("{settings:?}");
        assert!(!rendered.contains("super-secret"), "got: {rendered}");
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let err = Settings::new("http://p", "k")
            .expect("settings")
            .with_timeout_secs(0)
            .unwrap_err();
        assert_eq!(err, SettingsError::ZeroTimeout);
    }

    #[test]
    fn toggle_is_case_insensitive_true_only() {
        assert!(toggle_enabled("true"));
        assert!(toggle_enabled("TRUE"));
        assert!(toggle_enabled("True"));
        assert!(!toggle_enabled("1"));
        assert!(!toggle_enabled("yes"));
        assert!(!toggle_enabled(""));
    }

    #[test]
    fn log_format_parses() {
        assert_eq!("JSON".parse::<LogFormat>(), Ok(LogFormat::Json));
        assert_eq!("text".parse::<LogFormat>(), Ok(LogFormat::Text));
        assert!(matches!(
            "xml".parse::<LogFormat>(),
            Err(SettingsError::UnknownLogFormat(_))
        ));
    }
}
