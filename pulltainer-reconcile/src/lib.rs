//! # pulltainer-reconcile
//!
//! One reconciliation pass over every Portainer stack.
//!
//! [`Reconciler::run_pass`] lists the stacks and walks them in API order,
//! applying the redeploy policy to each one in isolation: a failure on one
//! stack becomes that stack's [`StackOutcome`] and never stops the pass.

pub mod engine;
pub mod error;
pub mod outcome;

pub use engine::{ReconcileOptions, Reconciler};
pub use error::PassError;
pub use outcome::{PassReport, SkipReason, StackOutcome, StackResult};
