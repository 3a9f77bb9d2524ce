//! Markdown display for engine results.
//!
//! Domain models implement `Display` directly (see [`models`]); collections
//! are wrapped in newtypes so an empty listing still prints a sentence. The
//! CLI renders this markdown to the terminal and the MCP server returns it
//! verbatim for inspection tools.
//!
//! ```rust
//! use outreach_core::display::OperationStatus;
//!
//! let status = OperationStatus::success("Lead 1 moved to won".to_string());
//! assert_eq!(status.to_string(), "Success: Lead 1 moved to won\n");
//! ```

pub mod collections;
pub mod datetime;
pub mod models;
pub mod status;

pub use collections::{Leads, SequenceSummaries};
pub use datetime::LocalDateTime;
pub use status::OperationStatus;
