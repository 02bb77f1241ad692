use thiserror::Error;

/// Error surface for cron parsing, scheduling, and the daemon runtime.
#[derive(Debug, Error)]
pub enum DaemonError {
    #[error("invalid cron schedule: {0}")]
    Cron(#[from] CronError),

    #[error("reconciliation pass failed: {0}")]
    Pass(#[from] pulltainer_reconcile::PassError),

    #[error("failed to start tokio runtime: {0}")]
    Runtime(#[source] std::io::Error),

    #[error("failed to install signal handler: {0}")]
    Signal(#[source] std::io::Error),

    #[error("{task} task join failure: {message}")]
    Join { task: &'static str, message: String },
}

/// Why a cron expression was rejected.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CronError {
    #[error("expected 5 fields in '{expr}', found {found}")]
    FieldCount { expr: String, found: usize },

    #[error("invalid {field} value '{value}'")]
    InvalidValue { field: &'static str, value: String },

    #[error("{field} value {value} out of range {min}-{max}")]
    OutOfRange {
        field: &'static str,
        value: u32,
        min: u32,
        max: u32,
    },

    #[error("invalid {field} range '{value}'")]
    InvalidRange { field: &'static str, value: String },

    #[error("invalid {field} step '{value}'")]
    InvalidStep { field: &'static str, value: String },

    #[error("unknown descriptor '{0}'")]
    UnknownDescriptor(String),
}
