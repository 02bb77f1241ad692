//! `pulltainer next`: preview the schedule without contacting Portainer.

use anyhow::Result;
use chrono::SecondsFormat;
use clap::Args;

use pulltainer_daemon::Scheduler;

use super::config::ConfigArgs;

#[derive(Args, Debug)]
pub struct NextArgs {
    /// How many firings to print.
    #[arg(long, short = 'n', default_value_t = 5)]
    pub count: usize,
}

impl NextArgs {
    pub fn run(self, config: &ConfigArgs) -> Result<()> {
        let scheduler = Scheduler::new(config.schedule()?);
        let fires = scheduler.upcoming(&scheduler.now(), self.count);
        if fires.is_empty() {
            println!("'{}' does not fire in the next five years", scheduler.schedule());
            return Ok(());
        }
        for fire in fires {
            println!("{}", fire.to_rfc3339_opts(SecondsFormat::Secs, false));
        }
        Ok(())
    }
}
