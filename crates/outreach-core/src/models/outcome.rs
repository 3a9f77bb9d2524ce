//! Result of one `execute_next_step` invocation.

use serde::{Deserialize, Serialize};

use super::{StepKind, StepResult};

/// Outcome reported back to callers, serialised with a `status` tag
/// (`step_completed`, `sequence_completed`, `no_ready_steps`, `step_failed`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ExecutionOutcome {
    /// A step ran and its result was persisted
    StepCompleted {
        step_number: u32,
        step_type: StepKind,
        result: StepResult,
    },
    /// No steps remained; the sequence is now completed
    SequenceCompleted,
    /// The step at the current position is not ready yet
    NoReadySteps,
    /// Generation failed; the step stays ready and can be retried
    StepFailed { step_number: u32, error: String },
}

impl ExecutionOutcome {
    pub fn status(&self) -> &'static str {
        match self {
            ExecutionOutcome::StepCompleted { .. } => "step_completed",
            ExecutionOutcome::SequenceCompleted => "sequence_completed",
            ExecutionOutcome::NoReadySteps => "no_ready_steps",
            ExecutionOutcome::StepFailed { .. } => "step_failed",
        }
    }
}
