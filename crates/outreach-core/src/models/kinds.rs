//! Closed vocabularies for sequence types, step types and generator
//! capabilities.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Key into the template catalog.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum SequenceType {
    #[default]
    Standard,
    Enterprise,
    QuickTouch,
}

impl SequenceType {
    pub const ALL: [SequenceType; 3] = [
        SequenceType::Standard,
        SequenceType::Enterprise,
        SequenceType::QuickTouch,
    ];

    /// Convert to database string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            SequenceType::Standard => "standard",
            SequenceType::Enterprise => "enterprise",
            SequenceType::QuickTouch => "quick_touch",
        }
    }
}

impl FromStr for SequenceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "standard" => Ok(SequenceType::Standard),
            "enterprise" => Ok(SequenceType::Enterprise),
            "quick_touch" | "quick-touch" | "quicktouch" => Ok(SequenceType::QuickTouch),
            _ => Err(format!("Invalid sequence type: {s}")),
        }
    }
}

/// What a step does when it runs.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    Email,
    FollowUp,
    #[serde(rename = "linkedin")]
    LinkedIn,
    Call,
    Research,
    FinalFollowUp,
    Meeting,
}

impl StepKind {
    /// Convert to database string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            StepKind::Email => "email",
            StepKind::FollowUp => "follow_up",
            StepKind::LinkedIn => "linkedin",
            StepKind::Call => "call",
            StepKind::Research => "research",
            StepKind::FinalFollowUp => "final_follow_up",
            StepKind::Meeting => "meeting",
        }
    }

    /// The generator capability that produces this step's content.
    ///
    /// Email-like steps, including meeting requests, all go through the
    /// message generator and differ only by template key.
    pub fn capability(&self) -> Capability {
        match self {
            StepKind::Email | StepKind::FollowUp | StepKind::FinalFollowUp | StepKind::Meeting => {
                Capability::Message
            }
            StepKind::LinkedIn => Capability::LinkedIn,
            StepKind::Call => Capability::CallScript,
            StepKind::Research => Capability::Research,
        }
    }
}

impl FromStr for StepKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "email" => Ok(StepKind::Email),
            "follow_up" => Ok(StepKind::FollowUp),
            "linkedin" => Ok(StepKind::LinkedIn),
            "call" => Ok(StepKind::Call),
            "research" => Ok(StepKind::Research),
            "final_follow_up" => Ok(StepKind::FinalFollowUp),
            "meeting" => Ok(StepKind::Meeting),
            _ => Err(format!("Invalid step type: {s}")),
        }
    }
}

/// Content-generation entry points a step can be dispatched to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    Message,
    LinkedIn,
    CallScript,
    Research,
}

impl Capability {
    /// Output format for the three text-producing capabilities; research
    /// returns structured findings instead.
    pub fn message_format(&self) -> Option<MessageFormat> {
        match self {
            Capability::Message => Some(MessageFormat::Email),
            Capability::LinkedIn => Some(MessageFormat::LinkedIn),
            Capability::CallScript => Some(MessageFormat::CallScript),
            Capability::Research => None,
        }
    }
}

/// Shape of generated text, also the `kind` column of stored messages.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MessageFormat {
    Email,
    #[serde(rename = "linkedin")]
    LinkedIn,
    CallScript,
}

impl MessageFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageFormat::Email => "email",
            MessageFormat::LinkedIn => "linkedin",
            MessageFormat::CallScript => "call_script",
        }
    }
}

impl FromStr for MessageFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "email" => Ok(MessageFormat::Email),
            "linkedin" => Ok(MessageFormat::LinkedIn),
            "call_script" => Ok(MessageFormat::CallScript),
            _ => Err(format!("Invalid message kind: {s}")),
        }
    }
}
