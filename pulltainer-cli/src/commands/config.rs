//! Settings shared by every subcommand, from `PULLTAINER_*` or flags.

use anyhow::{Context, Result};
use clap::Args;

use pulltainer_core::{toggle_enabled, LogFormat, Settings, DEFAULT_CRON, DEFAULT_TIMEOUT_SECS};
use pulltainer_daemon::CronSchedule;

#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    /// Portainer base URL, e.g. https://portainer.local:9443.
    #[arg(long, env = "PULLTAINER_URL", global = true)]
    pub url: Option<String>,

    /// Portainer API key, sent as X-API-Key.
    #[arg(long, env = "PULLTAINER_API_KEY", global = true, hide_env_values = true)]
    pub api_key: Option<String>,

    /// 5-field cron expression for scheduled passes [default: 0 4 * * *].
    #[arg(long, env = "PULLTAINER_CRON", global = true)]
    pub cron: Option<String>,

    /// Only redeploy stacks whose images are outdated (Business Edition).
    /// Enabled by `true` in any case.
    #[arg(
        long,
        env = "PULLTAINER_BE_API",
        global = true,
        value_name = "BOOL",
        num_args = 0..=1,
        default_missing_value = "true"
    )]
    pub be_api: Option<String>,

    /// Per-request timeout in seconds.
    #[arg(long, env = "PULLTAINER_TIMEOUT_SECS", global = true, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,

    /// Evaluate every stack but never submit an update.
    #[arg(
        long,
        env = "PULLTAINER_DRY_RUN",
        global = true,
        value_name = "BOOL",
        num_args = 0..=1,
        default_missing_value = "true"
    )]
    pub dry_run: Option<String>,

    /// Log output: text or json.
    #[arg(long, env = "PULLTAINER_LOG_FORMAT", global = true, default_value = "text")]
    pub log_format: LogFormat,
}

impl ConfigArgs {
    /// Validated settings for commands that talk to Portainer.
    pub fn settings(&self) -> Result<Settings> {
        let url = self
            .url
            .as_deref()
            .context("Portainer URL is required: set PULLTAINER_URL or pass --url")?;
        let api_key = self
            .api_key
            .as_deref()
            .context("API key is required: set PULLTAINER_API_KEY or pass --api-key")?;

        let settings = Settings::new(url, api_key)
            .context("invalid configuration")?
            .with_cron(self.cron.as_deref())
            .with_image_status_check(is_on(&self.be_api))
            .with_timeout_secs(self.timeout_secs)
            .context("invalid configuration")?
            .with_dry_run(is_on(&self.dry_run))
            .with_log_format(self.log_format);
        Ok(settings)
    }

    /// The configured schedule; needs neither URL nor key.
    pub fn schedule(&self) -> Result<CronSchedule> {
        let expr = match self.cron.as_deref().map(str::trim) {
            Some(expr) if !expr.is_empty() => expr,
            _ => DEFAULT_CRON,
        };
        CronSchedule::parse(expr).with_context(|| format!("invalid PULLTAINER_CRON '{expr}'"))
    }
}

fn is_on(toggle: &Option<String>) -> bool {
    toggle.as_deref().is_some_and(toggle_enabled)
}
