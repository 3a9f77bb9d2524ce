//! Status enumerations for leads, sequences and steps.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Type-safe enumeration of sequence statuses.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SequenceStatus {
    /// Sequence still has steps to run
    #[default]
    Active,

    /// Every step has been completed
    Completed,
}

impl FromStr for SequenceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "active" => Ok(SequenceStatus::Active),
            "completed" => Ok(SequenceStatus::Completed),
            _ => Err(format!("Invalid sequence status: {s}")),
        }
    }
}

impl SequenceStatus {
    /// Convert to database string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            SequenceStatus::Active => "active",
            SequenceStatus::Completed => "completed",
        }
    }
}

/// Type-safe enumeration of step statuses.
///
/// A step moves `Pending → Ready → Completed` and never backwards.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    /// Waiting for its scheduled time or its predecessor
    Pending,

    /// Eligible for execution
    Ready,

    /// Executed; the result payload is final
    Completed,
}

impl FromStr for StepStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(StepStatus::Pending),
            "ready" => Ok(StepStatus::Ready),
            "completed" => Ok(StepStatus::Completed),
            _ => Err(format!("Invalid step status: {s}")),
        }
    }
}

impl StepStatus {
    /// Convert to database string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            StepStatus::Pending => "pending",
            StepStatus::Ready => "ready",
            StepStatus::Completed => "completed",
        }
    }

    /// Get status with consistent icon formatting for display.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use outreach_core::models::StepStatus;
    ///
    /// assert_eq!(StepStatus::Completed.with_icon(), "✓ Completed");
    /// assert_eq!(StepStatus::Ready.with_icon(), "➤ Ready");
    /// assert_eq!(StepStatus::Pending.with_icon(), "○ Pending");
    /// ```
    pub fn with_icon(&self) -> &'static str {
        match self {
            StepStatus::Completed => "✓ Completed",
            StepStatus::Ready => "➤ Ready",
            StepStatus::Pending => "○ Pending",
        }
    }
}

/// Pipeline stage of a lead.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LeadStatus {
    #[default]
    New,
    Contacted,
    Qualified,
    Proposal,
    Negotiation,
    Won,
    Lost,
}

impl FromStr for LeadStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "new" => Ok(LeadStatus::New),
            "contacted" => Ok(LeadStatus::Contacted),
            "qualified" => Ok(LeadStatus::Qualified),
            "proposal" => Ok(LeadStatus::Proposal),
            "negotiation" => Ok(LeadStatus::Negotiation),
            "won" => Ok(LeadStatus::Won),
            "lost" => Ok(LeadStatus::Lost),
            _ => Err(format!("Invalid lead status: {s}")),
        }
    }
}

impl LeadStatus {
    /// Convert to database string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            LeadStatus::New => "new",
            LeadStatus::Contacted => "contacted",
            LeadStatus::Qualified => "qualified",
            LeadStatus::Proposal => "proposal",
            LeadStatus::Negotiation => "negotiation",
            LeadStatus::Won => "won",
            LeadStatus::Lost => "lost",
        }
    }

    /// Stages that count as a conversion in sequence analytics.
    pub const CONVERTED: [LeadStatus; 3] =
        [LeadStatus::Qualified, LeadStatus::Proposal, LeadStatus::Won];

    pub fn is_converted(&self) -> bool {
        Self::CONVERTED.contains(self)
    }
}
