//! Cron-driven job loop.
//!
//! One registered job. It runs once at startup and then on every firing of the
//! schedule until shutdown. Firings follow the wall clock, not the job's
//! duration; a firing that lands while the previous run is still going is
//! skipped, so runs never overlap.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Local, TimeZone, Utc};
use tokio::sync::broadcast;

use crate::cron::CronSchedule;

/// Source of "now"; swapped out in tests.
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Marks a run in progress. At most one [`RunToken`] exists at a time.
#[derive(Debug, Clone, Default)]
pub struct RunGuard {
    busy: Arc<AtomicBool>,
}

impl RunGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// `None` while another run holds the token.
    pub fn try_begin(&self) -> Option<RunToken> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| RunToken {
                busy: self.busy.clone(),
            })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

/// Releases the [`RunGuard`] on drop, including when the job panics.
#[derive(Debug)]
pub struct RunToken {
    busy: Arc<AtomicBool>,
}

impl Drop for RunToken {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}

/// Why a job run was started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Startup,
    Cron,
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trigger::Startup => write!(f, "startup"),
            Trigger::Cron => write!(f, "cron"),
        }
    }
}

/// Fires a blocking job on a [`CronSchedule`], evaluated in time zone `Z`.
#[derive(Clone)]
pub struct Scheduler<Z: TimeZone = Local> {
    schedule: Arc<CronSchedule>,
    tz: Z,
    clock: Clock,
    guard: RunGuard,
}

impl Scheduler<Local> {
    /// Production scheduler: system clock, local time zone.
    pub fn new(schedule: CronSchedule) -> Self {
        Self::with_clock(schedule, Local, Arc::new(Utc::now))
    }
}

impl<Z> Scheduler<Z>
where
    Z: TimeZone + Send + Sync + 'static,
    Z::Offset: fmt::Display + Send + Sync,
{
    pub fn with_clock(schedule: CronSchedule, tz: Z, clock: Clock) -> Self {
        Self {
            schedule: Arc::new(schedule),
            tz,
            clock,
            guard: RunGuard::new(),
        }
    }

    pub fn schedule(&self) -> &CronSchedule {
        &self.schedule
    }

    pub fn now(&self) -> DateTime<Z> {
        (self.clock)().with_timezone(&self.tz)
    }

    /// Next firing of the registered job strictly after `after`.
    pub fn next_fire(&self, after: &DateTime<Z>) -> Option<DateTime<Z>> {
        self.schedule.next_after(after)
    }

    /// The next `count` firings after `from`.
    pub fn upcoming(&self, from: &DateTime<Z>, count: usize) -> Vec<DateTime<Z>> {
        let mut fires = Vec::with_capacity(count);
        let mut cursor = from.clone();
        while fires.len() < count {
            match self.next_fire(&cursor) {
                Some(next) => {
                    cursor = next.clone();
                    fires.push(next);
                }
                None => break,
            }
        }
        fires
    }

    /// Run `job` now and on every firing until `shutdown` receives.
    ///
    /// The job runs on the blocking pool. An in-flight run is not awaited on
    /// shutdown.
    pub async fn run<J>(&self, job: J, mut shutdown: broadcast::Receiver<()>)
    where
        J: Fn() + Send + Sync + 'static,
    {
        let job = Arc::new(job);
        self.fire(&job, Trigger::Startup);

        let mut last_fire = self.now();
        loop {
            // Never compute from a time before the last firing, so an early
            // timer wake-up cannot fire the same minute twice.
            let now = self.now();
            let from = if now > last_fire { now.clone() } else { last_fire.clone() };
            let Some(next) = self.next_fire(&from) else {
                tracing::warn!(cron = %self.schedule, "schedule never fires again; idling until shutdown");
                let _ = shutdown.recv().await;
                break;
            };
            let wait = (next.clone() - now).to_std().unwrap_or(Duration::ZERO);

            tokio::select! {
                _ = shutdown.recv() => break,
                _ = tokio::time::sleep(wait) => {
                    last_fire = next;
                    self.fire(&job, Trigger::Cron);
                }
            }
        }

        if self.guard.is_busy() {
            tracing::info!("shutting down with a reconciliation run still in progress");
        }
    }

    fn fire<J>(&self, job: &Arc<J>, trigger: Trigger)
    where
        J: Fn() + Send + Sync + 'static,
    {
        let Some(token) = self.guard.try_begin() else {
            tracing::warn!(%trigger, "previous run still in progress; skipping this firing");
            return;
        };

        let job = job.clone();
        let scheduler = self.clone();
        tokio::spawn(async move {
            tracing::debug!(%trigger, "run starting");
            let result = tokio::task::spawn_blocking(move || {
                let _token = token;
                job();
            })
            .await;
            if let Err(err) = result {
                tracing::error!(error = %err, "run task failed");
            }

            match scheduler.next_fire(&scheduler.now()) {
                Some(next) => tracing::info!(next = %next, "next job"),
                None => tracing::warn!(cron = %scheduler.schedule, "no next job"),
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_hands_out_one_token_at_a_time() {
        let guard = RunGuard::new();
        let token = guard.try_begin().expect("first token");
        assert!(guard.is_busy());
        assert!(guard.try_begin().is_none(), "second run must be refused");
        drop(token);
        assert!(!guard.is_busy());
        assert!(guard.try_begin().is_some());
    }

    #[test]
    fn guard_is_released_when_the_job_panics() {
        let guard = RunGuard::new();
        let token = guard.try_begin().expect("token");
        let result = std::thread::spawn(move || {
            let _token = token;
            panic!("job blew up");
        })
        .join();
        assert!(result.is_err());
        assert!(!guard.is_busy());
    }

    #[test]
    fn upcoming_lists_consecutive_firings() {
        let schedule = CronSchedule::parse("0 */6 * * *").expect("parse");
        let start = Utc.with_ymd_and_hms(2026, 10, 16, 5, 0, 0).unwrap();
        let scheduler = Scheduler::with_clock(schedule, Utc, Arc::new(move || start));

        let fires = scheduler.upcoming(&scheduler.now(), 3);
        let hours: Vec<u32> = fires.iter().map(|t| chrono::Timelike::hour(t)).collect();
        assert_eq!(hours, vec![6, 12, 18]);
    }
}
