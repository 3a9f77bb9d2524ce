//! Core library for the outreach sequence engine.
//!
//! Leads are enrolled in multi-step outreach sequences built from a fixed
//! template catalog. Each call to
//! [`SequenceEngine::execute_next_step`] runs at most one ready step: it asks
//! a pluggable [`generation::ContentGenerator`] for the step's content,
//! records the result, and moves the sequence forward. Steps become ready
//! once their scheduled delay has passed.
//!
//! # Layout
//!
//! - [`catalog`]: sequence types and their step blueprints
//! - [`db`]: SQLite store for leads, sequences, steps and generated content
//! - [`executor`]: dispatches one step to the generator and commits it
//! - [`engine`]: the sequence controller and its builder
//! - [`generation`]: the generator trait, the xAI client and the offline
//!   template generator
//! - [`display`]: markdown `Display` implementations used by the front ends
//!
//! # Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use outreach_core::{
//!     generation::TemplateGenerator,
//!     params::{CreateLead, CreateSequence, Id},
//!     SequenceEngineBuilder,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let engine = SequenceEngineBuilder::new()
//!     .with_database_path(Some("outreach.db"))
//!     .with_generator(Arc::new(TemplateGenerator::new()))
//!     .build()
//!     .await?;
//!
//! let lead = engine
//!     .add_lead(&CreateLead {
//!         email: "grace@example.com".into(),
//!         company: Some("Example Corp".into()),
//!         ..Default::default()
//!     })
//!     .await?;
//!
//! let created = engine
//!     .create_outreach_sequence(&CreateSequence {
//!         lead_id: lead.id,
//!         sequence_type: None,
//!     })
//!     .await?;
//!
//! let outcome = engine
//!     .execute_next_step(&Id { id: created.sequence_id })
//!     .await?;
//! println!("{outcome}");
//! # Ok(())
//! # }
//! ```

pub mod catalog;
pub mod db;
pub mod display;
pub mod engine;
pub mod error;
pub mod executor;
pub mod generation;
pub mod models;
pub mod params;

// Re-export commonly used types
pub use db::Database;
pub use display::{Leads, LocalDateTime, OperationStatus, SequenceSummaries};
pub use engine::{Clock, ManualClock, SequenceEngine, SequenceEngineBuilder, SystemClock};
pub use error::{OutreachError, Result};
pub use models::{
    CreatedSequence, ExecutionOutcome, Lead, LeadStatus, Sequence, SequenceAnalytics,
    SequenceStatus, SequenceType, Step, StepKind, StepStatus,
};
