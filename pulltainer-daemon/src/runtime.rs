use std::fmt;
use std::future::Future;
use std::time::Duration;

use chrono::TimeZone;
use tokio::sync::broadcast;

use pulltainer_client::PortainerClient;
use pulltainer_core::{LogFormat, Settings};
use pulltainer_reconcile::{PassReport, ReconcileOptions, Reconciler};

use crate::cron::CronSchedule;
use crate::error::DaemonError;
use crate::scheduler::Scheduler;

/// How long shutdown waits for an in-flight pass before the process exits.
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Start the daemon and block the current thread until it is told to stop.
pub fn start_blocking(settings: Settings) -> Result<(), DaemonError> {
    init_tracing(settings.log_format);
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(DaemonError::Runtime)?;
    let result = runtime.block_on(run(settings));
    runtime.shutdown_timeout(SHUTDOWN_GRACE);
    result
}

/// Run the startup pass, then one pass per cron firing, until ctrl-c or
/// SIGTERM.
pub async fn run(settings: Settings) -> Result<(), DaemonError> {
    let schedule = CronSchedule::parse(&settings.cron)?;
    let reconciler = build_reconciler(&settings);
    let scheduler = Scheduler::new(schedule);

    tracing::info!(
        url = %settings.base_url,
        cron = %scheduler.schedule(),
        check_image_status = settings.check_image_status,
        dry_run = settings.dry_run,
        "pulltainer starting",
    );

    // Failures are logged by the reconciler; the next firing is the retry.
    let job = move || {
        let _ = reconciler.run_pass();
    };
    supervise(&scheduler, job, wait_for_signal()).await?;

    tracing::info!("pulltainer stopped");
    Ok(())
}

/// Drive `scheduler` until `stop` resolves, then report `stop`'s result.
async fn supervise<Z, J, S>(scheduler: &Scheduler<Z>, job: J, stop: S) -> Result<(), DaemonError>
where
    Z: TimeZone + Send + Sync + 'static,
    Z::Offset: fmt::Display + Send + Sync,
    J: Fn() + Send + Sync + 'static,
    S: Future<Output = Result<(), DaemonError>> + Send + 'static,
{
    // Subscribed before the stop task exists, so its send is never lost.
    let (shutdown_tx, shutdown_rx) = broadcast::channel::<()>(4);
    let signal_handle = tokio::spawn(async move {
        let result = stop.await;
        let _ = shutdown_tx.send(());
        result
    });

    scheduler.run(job, shutdown_rx).await;

    match signal_handle.await {
        Ok(result) => result,
        Err(err) => Err(DaemonError::Join {
            task: "signal_handler",
            message: err.to_string(),
        }),
    }
}

/// A single pass on the current thread, for `pulltainer once`.
pub fn run_once(settings: &Settings) -> Result<PassReport, DaemonError> {
    init_tracing(settings.log_format);
    let report = build_reconciler(settings).run_pass()?;
    Ok(report)
}

fn build_reconciler(settings: &Settings) -> Reconciler<PortainerClient> {
    Reconciler::new(
        PortainerClient::new(settings),
        ReconcileOptions::from(settings),
    )
}

async fn wait_for_signal() -> Result<(), DaemonError> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut terminate = signal(SignalKind::terminate()).map_err(DaemonError::Signal)?;
        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                result.map_err(DaemonError::Signal)?;
                tracing::info!("received ctrl-c, shutting down");
            }
            _ = terminate.recv() => {
                tracing::info!("received SIGTERM, shutting down");
            }
        }
    }
    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await.map_err(DaemonError::Signal)?;
        tracing::info!("received ctrl-c, shutting down");
    }
    Ok(())
}

/// Install the global subscriber on stderr. `RUST_LOG` overrides the `info`
/// default.
pub fn init_tracing(format: LogFormat) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    let _ = match format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
}
