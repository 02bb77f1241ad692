//! `pulltainer run`: the foreground daemon.

use anyhow::{Context, Result};

use pulltainer_daemon::{start_blocking, CronSchedule};

use super::config::ConfigArgs;

pub fn run(config: &ConfigArgs) -> Result<()> {
    let settings = config.settings()?;
    // Fail before the runtime and logging come up.
    CronSchedule::parse(&settings.cron)
        .with_context(|| format!("invalid PULLTAINER_CRON '{}'", settings.cron))?;

    start_blocking(settings).context("daemon exited with error")
}
