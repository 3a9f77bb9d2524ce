//! Generated content, research findings and the records they are persisted
//! as.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use super::MessageFormat;

/// Text produced by the message, LinkedIn and call-script generators.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct GeneratedContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,

    pub content: String,

    #[serde(default)]
    pub personalization_notes: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub follow_up_suggestions: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub key_hooks: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct DecisionProcess {
    #[serde(default)]
    pub likely_stakeholders: Vec<String>,
    #[serde(default)]
    pub typical_timeline: Option<String>,
    #[serde(default)]
    pub key_factors: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct OutreachStrategy {
    #[serde(default)]
    pub best_times: Vec<String>,
    #[serde(default)]
    pub preferred_channels: Vec<String>,
    #[serde(default)]
    pub topics_of_interest: Vec<String>,
}

/// Output of the lead-enrichment generator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ResearchFindings {
    #[serde(default)]
    pub pain_points: Vec<String>,
    #[serde(default)]
    pub company_challenges: Vec<String>,
    #[serde(default)]
    pub decision_process: DecisionProcess,
    #[serde(default)]
    pub outreach_strategy: OutreachStrategy,
    #[serde(default)]
    pub discovery_questions: Vec<String>,
}

/// What a completed step produced; stored as the step's result payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum StepResult {
    Message(GeneratedContent),
    Research(ResearchFindings),
}

/// A message about to be written to the content store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewMessage {
    pub lead_id: u64,
    pub kind: MessageFormat,
    pub subject: Option<String>,
    pub content: String,
    pub personalization_notes: Vec<String>,
    /// Which template produced the message
    pub generation_note: String,
}

/// An activity-log entry about to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct NewActivity {
    pub lead_id: u64,
    pub kind: String,
    pub subject: Option<String>,
    pub content: Option<String>,
}

/// The persistence side effect of executing a step.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentRecord {
    Message {
        message: NewMessage,
        activity: Option<NewActivity>,
    },
    Research {
        lead_id: u64,
        findings: ResearchFindings,
    },
}

/// A stored message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub id: u64,
    pub lead_id: u64,
    pub kind: MessageFormat,
    pub subject: Option<String>,
    pub content: String,
    #[serde(default)]
    pub personalization_notes: Vec<String>,
    pub generation_note: Option<String>,
    pub created_at: Timestamp,
}

/// A stored activity-log entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Activity {
    pub id: u64,
    pub lead_id: u64,
    pub kind: String,
    pub subject: Option<String>,
    pub content: Option<String>,
    pub status: String,
    pub completed_at: Option<Timestamp>,
    pub created_at: Timestamp,
}
