//! Lead history handed to the content generator for personalisation.

use jiff::{SignedDuration, Timestamp};
use serde::{Deserialize, Serialize};

use super::ResearchFindings;

/// How recently the lead has been in touch.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum EngagementLevel {
    #[default]
    Low,
    Medium,
    High,
}

impl EngagementLevel {
    /// Interactions newer than this window count as recent.
    pub const WINDOW: SignedDuration = SignedDuration::from_hours(7 * 24);

    /// Classify from the creation times of a lead's messages and activities.
    pub fn from_interactions<I>(interactions: I, now: Timestamp) -> Self
    where
        I: IntoIterator<Item = Timestamp>,
    {
        let cutoff = now - Self::WINDOW;
        let recent = interactions.into_iter().filter(|at| *at > cutoff).count();
        match recent {
            0 => EngagementLevel::Low,
            1 | 2 => EngagementLevel::Medium,
            _ => EngagementLevel::High,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EngagementLevel::Low => "low",
            EngagementLevel::Medium => "medium",
            EngagementLevel::High => "high",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct PreviousInteractions {
    pub messages: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_message_at: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_activity: Option<String>,
}

/// Personalisation context for one generation call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct GenerationContext {
    pub previous_interactions: PreviousInteractions,
    pub status_changes: u32,
    pub engagement_level: EngagementLevel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub research_insights: Option<ResearchFindings>,
}
