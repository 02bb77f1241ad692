//! The redeploy policy.
//!
//! Checks run cheapest first: running status and the opt-out marker are local,
//! then the image status, the stack file, and the update each cost a request.
//! The first check that says no ends that stack's pass.

use std::time::Instant;

use pulltainer_client::StackApi;
use pulltainer_core::{Settings, Stack, StackDefinition};

use crate::error::PassError;
use crate::outcome::{PassReport, SkipReason, StackOutcome, StackResult};

/// The subset of [`Settings`] the policy depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReconcileOptions {
    /// Only redeploy stacks whose images Portainer reports as `outdated`.
    pub check_image_status: bool,
    /// Stop short of the update call.
    pub dry_run: bool,
}

impl From<&Settings> for ReconcileOptions {
    fn from(settings: &Settings) -> Self {
        Self {
            check_image_status: settings.check_image_status,
            dry_run: settings.dry_run,
        }
    }
}

/// Runs reconciliation passes against one [`StackApi`].
pub struct Reconciler<A> {
    api: A,
    options: ReconcileOptions,
}

impl<A: StackApi> Reconciler<A> {
    pub fn new(api: A, options: ReconcileOptions) -> Self {
        Self { api, options }
    }

    /// One full pass: list, then every stack in API order.
    ///
    /// Fails only when the list itself cannot be fetched.
    pub fn run_pass(&self) -> Result<PassReport, PassError> {
        let started = Instant::now();
        let stacks = self.api.list_stacks().map_err(|err| {
            tracing::error!(error = %err, "get stacks failed; skipping this run");
            PassError::ListStacks(err)
        })?;

        let results = stacks
            .iter()
            .map(|stack| StackResult {
                id: stack.id,
                name: stack.name.clone(),
                outcome: self.reconcile_stack(stack),
            })
            .collect();

        let report = PassReport {
            stacks: results,
            elapsed: started.elapsed(),
        };
        tracing::info!(
            stacks = report.stacks.len(),
            redeployed = report.redeployed(),
            skipped = report.skipped(),
            failed = report.failed(),
            duration_ms = report.elapsed.as_millis(),
            dry_run = self.options.dry_run,
            "reconciliation pass finished",
        );
        Ok(report)
    }

    /// Decide and act on a single stack. Never fails; errors become skips.
    pub fn reconcile_stack(&self, stack: &Stack) -> StackOutcome {
        if !stack.status.is_running() {
            tracing::info!(stack = %stack.name, status = %stack.status, "skipping as stack is not running");
            return StackOutcome::Skipped(SkipReason::NotRunning {
                status: stack.status,
            });
        }

        if stack.is_ignored() {
            tracing::info!(stack = %stack.name, "skipping as stack is ignored");
            return StackOutcome::Skipped(SkipReason::Ignored);
        }

        if self.options.check_image_status {
            if let Some(skip) = self.check_outdated(stack) {
                return StackOutcome::Skipped(skip);
            }
        }

        let definition = match self.api.stack_file(stack.id) {
            Ok(definition) => definition,
            Err(err) => {
                tracing::warn!(stack = %stack.name, stack_id = %stack.id, error = %err, "stack file failed");
                return StackOutcome::Skipped(SkipReason::FetchFailed {
                    error: err.to_string(),
                });
            }
        };

        self.redeploy(stack, &definition)
    }

    /// `None` when the stack is outdated and should go ahead.
    fn check_outdated(&self, stack: &Stack) -> Option<SkipReason> {
        match self.api.image_status(stack.id) {
            Ok(report) if report.status.is_outdated() => None,
            Ok(report) => {
                tracing::info!(
                    stack = %stack.name,
                    image_status = %report.status,
                    detail = report.message.as_deref().unwrap_or(""),
                    "skipping as stack is not outdated",
                );
                Some(SkipReason::NotOutdated {
                    status: report.status,
                })
            }
            Err(err) => {
                tracing::warn!(stack = %stack.name, stack_id = %stack.id, error = %err, "stack images status failed");
                Some(SkipReason::StatusCheckFailed {
                    error: err.to_string(),
                })
            }
        }
    }

    fn redeploy(&self, stack: &Stack, definition: &StackDefinition) -> StackOutcome {
        if self.options.dry_run {
            tracing::info!(stack = %stack.name, endpoint_id = %stack.endpoint_id, "[dry-run] would redeploy stack");
            return StackOutcome::WouldRedeploy;
        }

        match self.api.update_stack(stack, definition) {
            Ok(()) => {
                tracing::info!(stack = %stack.name, endpoint_id = %stack.endpoint_id, "stack redeployed");
                StackOutcome::Redeployed
            }
            Err(err) => {
                tracing::warn!(stack = %stack.name, stack_id = %stack.id, error = %err, "put stack failed");
                StackOutcome::Skipped(SkipReason::UpdateFailed {
                    error: err.to_string(),
                })
            }
        }
    }
}
