//! Error types for pulltainer-reconcile.

use thiserror::Error;

use pulltainer_client::ApiError;

/// A pass that could not start. Per-stack failures are outcomes, not errors.
#[derive(Debug, Error)]
pub enum PassError {
    /// Without the stack list there is nothing to iterate.
    #[error("get stacks: {0}")]
    ListStacks(#[source] ApiError),
}
