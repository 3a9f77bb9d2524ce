//! High-level engine API for running outreach sequences.
//!
//! [`SequenceEngine`] is the sequence controller: it creates sequences from
//! the template catalog, advances them one step per call, and answers the
//! read-side queries (sequences, leads, analytics) used by the front ends.
//!
//! ```text
//! ┌─────────────────┐    ┌─────────────────┐    ┌─────────────────┐
//! │ SequenceEngine  │    │  StepExecutor   │    │    Database     │
//! │ (sequence_ops,  │───▶│ (generation +   │───▶│   (via db/)     │
//! │  lead_ops)      │    │  side effects)  │    │                 │
//! └─────────────────┘    └─────────────────┘    └─────────────────┘
//! ```
//!
//! Every database call opens its own connection on the blocking pool, so
//! the engine is cheap to share behind an `Arc`. Concurrent
//! `execute_next_step` calls for one sequence are serialised in-process by a
//! per-sequence lock; across processes the conditional updates in the store
//! guarantee a step is completed at most once.
//!
//! # Usage
//!
//! ```rust
//! use outreach_core::{params::{CreateLead, CreateSequence, Id}, SequenceEngineBuilder};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let engine = SequenceEngineBuilder::new()
//!     .with_database_path(Some("/tmp/outreach-example.db"))
//!     .build()
//!     .await?;
//!
//! let lead = engine
//!     .add_lead(&CreateLead {
//!         email: "ada@example.com".into(),
//!         first_name: Some("Ada".into()),
//!         ..Default::default()
//!     })
//!     .await?;
//!
//! let created = engine
//!     .create_outreach_sequence(&CreateSequence {
//!         lead_id: lead.id,
//!         sequence_type: Some("quick_touch".into()),
//!     })
//!     .await?;
//!
//! let outcome = engine
//!     .execute_next_step(&Id { id: created.sequence_id })
//!     .await?;
//! println!("{}", outcome.status());
//! # Ok(())
//! # }
//! ```

use std::{path::PathBuf, sync::Arc};

pub mod builder;
pub mod clock;
mod lead_ops;
mod locks;
mod sequence_ops;

pub use builder::SequenceEngineBuilder;
pub use clock::{Clock, ManualClock, SystemClock};

use self::locks::SequenceLocks;
use crate::{executor::StepExecutor, generation::ContentGenerator};

/// Sequence controller with its injected generator and clock.
pub struct SequenceEngine {
    pub(crate) db_path: PathBuf,
    pub(crate) generator: Arc<dyn ContentGenerator>,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) executor: StepExecutor,
    locks: SequenceLocks,
}

impl SequenceEngine {
    pub(crate) fn new(
        db_path: PathBuf,
        generator: Arc<dyn ContentGenerator>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let executor = StepExecutor::new(db_path.clone(), generator.clone());
        Self {
            db_path,
            generator,
            clock,
            executor,
            locks: SequenceLocks::default(),
        }
    }

    /// Name of the configured content generator.
    pub fn generator_name(&self) -> &str {
        self.generator.name()
    }
}
