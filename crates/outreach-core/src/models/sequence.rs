//! Sequence model definitions.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use super::{SequenceStatus, SequenceType, Step, StepStatus};

/// An ordered, fixed-length outreach plan for one lead.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Sequence {
    /// Unique identifier for the sequence
    pub id: u64,

    /// Lead the sequence targets
    pub lead_id: u64,

    /// Catalog entry the steps were built from
    pub sequence_type: SequenceType,

    #[serde(default)]
    pub status: SequenceStatus,

    /// Step number to run next (1-based)
    pub current_step: u32,

    /// Number of steps created with the sequence; never changes
    pub total_steps: u32,

    /// Timestamp when the sequence was created (UTC)
    pub created_at: Timestamp,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<Timestamp>,

    /// Associated steps (lazy-loaded by default)
    #[serde(default)]
    pub steps: Vec<Step>,
}

impl Sequence {
    /// Number of loaded steps in `Completed` status.
    pub fn completed_steps(&self) -> u32 {
        self.steps
            .iter()
            .filter(|step| step.status == StepStatus::Completed)
            .count() as u32
    }
}

/// Identity returned when a sequence is created.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreatedSequence {
    pub sequence_id: u64,
    pub total_steps: u32,
}

/// Listing row: a sequence with its lead's name and step progress.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SequenceSummary {
    pub id: u64,
    pub lead_id: u64,
    /// Lead full name, or email when no name is known
    pub lead_name: String,
    pub company: Option<String>,
    pub sequence_type: SequenceType,
    pub status: SequenceStatus,
    pub current_step: u32,
    pub total_steps: u32,
    pub completed_steps: u32,
    pub created_at: Timestamp,
}

/// Read-only rollup across all sequences.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct SequenceAnalytics {
    pub total_sequences: u64,
    pub active_sequences: u64,
    pub completed_sequences: u64,
    /// Percentage of completed sequences whose lead converted, one decimal
    pub conversion_rate: f64,
}

impl SequenceAnalytics {
    /// Percentage of `converted` over `completed`, rounded to one decimal;
    /// zero when nothing has completed.
    pub fn conversion_rate(converted: u64, completed: u64) -> f64 {
        if completed == 0 {
            return 0.0;
        }
        (converted as f64 / completed as f64 * 1000.0).round() / 10.0
    }
}
