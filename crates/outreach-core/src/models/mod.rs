//! Data models for leads, sequences, steps and generated content.
//!
//! Display implementations for these models live in
//! [`crate::display::models`] so presentation stays separate from the data
//! structures.
//!
//! # Examples
//!
//! ```rust
//! use outreach_core::models::{ExecutionOutcome, StepKind, Capability};
//!
//! // Every step type maps onto exactly one generator capability
//! assert_eq!(StepKind::Meeting.capability(), Capability::Message);
//! assert_eq!(StepKind::Call.capability(), Capability::CallScript);
//!
//! // Outcomes serialise with a status tag
//! let json = serde_json::to_value(ExecutionOutcome::NoReadySteps).unwrap();
//! assert_eq!(json["status"], "no_ready_steps");
//! ```

pub mod content;
pub mod context;
pub mod kinds;
pub mod lead;
pub mod outcome;
pub mod sequence;
pub mod status;
pub mod step;


pub use content::{
    Activity, ContentRecord, DecisionProcess, GeneratedContent, Message, NewActivity, NewMessage,
    OutreachStrategy, ResearchFindings, StepResult,
};
pub use context::{EngagementLevel, GenerationContext, PreviousInteractions};
pub use kinds::{Capability, MessageFormat, SequenceType, StepKind};
pub use lead::Lead;
pub use outcome::ExecutionOutcome;
pub use sequence::{CreatedSequence, Sequence, SequenceAnalytics, SequenceSummary};
pub use status::{LeadStatus, SequenceStatus, StepStatus};
pub use step::Step;
