//! Step model definition.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use super::{StepKind, StepStatus};

/// One unit of work in a sequence.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Step {
    /// Unique identifier for the step
    pub id: u64,

    /// ID of the owning sequence
    pub sequence_id: u64,

    /// Position within the sequence (1-based)
    pub step_number: u32,

    /// What the step does when it runs
    pub step_type: StepKind,

    /// Content-generation variant
    pub template_key: String,

    pub status: StepStatus,

    /// Sequence creation time plus the catalog delay (UTC)
    pub scheduled_at: Timestamp,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<Timestamp>,

    /// Generated output, written once on completion
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
}

impl Step {
    /// Whether the step's scheduled time has been reached at `now`.
    pub fn is_due(&self, now: Timestamp) -> bool {
        self.scheduled_at <= now
    }
}
