//! Per-stack outcomes and the pass report.
//!
//! Every stack reaches exactly one terminal outcome per pass. Outcomes are
//! independent values; nothing is shared between stacks.

use std::fmt;
use std::time::Duration;

use serde::Serialize;

use pulltainer_core::{ImageStatus, StackId, StackStatus};

/// Why a stack was left alone this pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
    NotRunning { status: StackStatus },
    /// Carries the opt-out env marker.
    Ignored,
    NotOutdated { status: ImageStatus },
    StatusCheckFailed { error: String },
    FetchFailed { error: String },
    UpdateFailed { error: String },
}

impl SkipReason {
    /// Skips caused by a remote failure rather than by policy.
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            SkipReason::StatusCheckFailed { .. }
                | SkipReason::FetchFailed { .. }
                | SkipReason::UpdateFailed { .. }
        )
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NotRunning { status } => write!(f, "not running ({status})"),
            SkipReason::Ignored => write!(f, "ignored"),
            SkipReason::NotOutdated { status } => write!(f, "not outdated ({status})"),
            SkipReason::StatusCheckFailed { error } => write!(f, "image status failed: {error}"),
            SkipReason::FetchFailed { error } => write!(f, "stack file failed: {error}"),
            SkipReason::UpdateFailed { error } => write!(f, "update failed: {error}"),
        }
    }
}

/// Terminal state of one stack within one pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum StackOutcome {
    Redeployed,
    /// Dry run: every check passed but the update was not sent.
    WouldRedeploy,
    Skipped(SkipReason),
}

impl StackOutcome {
    pub fn is_redeploy(&self) -> bool {
        matches!(self, StackOutcome::Redeployed | StackOutcome::WouldRedeploy)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StackResult {
    pub id: StackId,
    pub name: String,
    #[serde(flatten)]
    pub outcome: StackOutcome,
}

/// Everything one pass did, in API order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PassReport {
    pub stacks: Vec<StackResult>,
    #[serde(rename = "duration_ms", serialize_with = "as_millis")]
    pub elapsed: Duration,
}

impl PassReport {
    pub fn redeployed(&self) -> usize {
        self.stacks
            .iter()
            .filter(|r| r.outcome.is_redeploy())
            .count()
    }

    pub fn failed(&self) -> usize {
        self.stacks
            .iter()
            .filter(|r| matches!(&r.outcome, StackOutcome::Skipped(reason) if reason.is_failure()))
            .count()
    }

    /// Skipped by policy (not running, ignored, not outdated).
    pub fn skipped(&self) -> usize {
        self.stacks.len() - self.redeployed() - self.failed()
    }

    pub fn outcome_of(&self, id: StackId) -> Option<&StackOutcome> {
        self.stacks.iter().find(|r| r.id == id).map(|r| &r.outcome)
    }
}

fn as_millis<S: serde::Serializer>(elapsed: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u128(elapsed.as_millis())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn result(id: i64, outcome: StackOutcome) -> StackResult {
        StackResult {
            id: StackId(id),
            name: format!("stack-{id}"),
            outcome,
        }
    }

    #[test]
    fn counts_partition_the_pass() {
        let report = PassReport {
            stacks: vec![
                result(1, StackOutcome::Redeployed),
                result(
                    2,
                    StackOutcome::Skipped(SkipReason::NotRunning {
                        status: StackStatus::Inactive,
                    }),
                ),
                result(3, StackOutcome::Skipped(SkipReason::Ignored)),
                result(
                    4,
                    StackOutcome::Skipped(SkipReason::FetchFailed {
                        error: "boom".into(),
                    }),
                ),
                result(5, StackOutcome::WouldRedeploy),
            ],
            elapsed: Duration::from_millis(40),
        };
        assert_eq!(report.redeployed(), 2);
        assert_eq!(report.failed(), 1);
        assert_eq!(report.skipped(), 2);
        assert_eq!(
            report.outcome_of(StackId(3)),
            Some(&StackOutcome::Skipped(SkipReason::Ignored))
        );
        assert_eq!(report.outcome_of(StackId(99)), None);
    }

    #[test]
    fn report_serializes_flat_per_stack_entries() {
        let report = PassReport {
            stacks: vec![
                result(1, StackOutcome::Redeployed),
                result(
                    2,
                    StackOutcome::Skipped(SkipReason::NotOutdated {
                        status: ImageStatus::Updated,
                    }),
                ),
            ],
            elapsed: Duration::from_millis(1500),
        };
        let value = serde_json::to_value(&report).expect("serialize");
        assert_eq!(value["duration_ms"], json!(1500));
        assert_eq!(
            value["stacks"][0],
            json!({"id": 1, "name": "stack-1", "outcome": "redeployed"})
        );
        assert_eq!(
            value["stacks"][1],
            json!({
                "id": 2,
                "name": "stack-2",
                "outcome": "skipped",
                "reason": "not_outdated",
                "status": "updated"
            })
        );
    }

    #[test]
    fn skip_reason_display_is_log_friendly() {
        let reason = SkipReason::NotRunning {
            status: StackStatus::Unknown(0),
        };
        assert_eq!(reason.to_string(), "not running (unknown(0))");
    }
}
