//! Pulltainer daemon: cron schedule, job loop, and process runtime.

pub mod cron;
mod error;
pub mod runtime;
pub mod scheduler;

pub use cron::CronSchedule;
pub use error::{CronError, DaemonError};
pub use runtime::{init_tracing, run, run_once, start_blocking};
pub use scheduler::{Clock, RunGuard, RunToken, Scheduler, Trigger};
