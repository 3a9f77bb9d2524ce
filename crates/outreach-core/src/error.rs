//! Error types for the outreach engine.

use std::path::PathBuf;

use thiserror::Error;

use crate::generation::GenerationError;

/// Comprehensive error type for all outreach operations.
#[derive(Error, Debug)]
pub enum OutreachError {
    /// Database connection or query errors
    #[error("Database error: {message}")]
    Database {
        message: String,
        #[source]
        source: rusqlite::Error,
    },
    /// Lead not found for the given ID
    #[error("Lead with ID {id} not found")]
    LeadNotFound { id: u64 },
    /// Sequence not found for the given ID
    #[error("Sequence with ID {id} not found")]
    SequenceNotFound { id: u64 },
    /// Step not found for the given ID
    #[error("Step with ID {id} not found")]
    StepNotFound { id: u64 },
    /// Operation attempted on a sequence or step in the wrong status
    #[error("Invalid state: {message}")]
    InvalidState { message: String },
    /// A concurrent writer changed the row first
    #[error("Conflict: {message}")]
    Conflict { message: String },
    /// The content generation capability failed
    #[error("Content generation failed: {message}")]
    GenerationFailed { message: String },
    /// Sequence type is not in the template catalog
    #[error("Unknown sequence type '{name}' (expected standard, enterprise or quick_touch)")]
    UnknownSequenceType { name: String },
    /// File system operation errors
    #[error("File system error at path '{path}': {source}")]
    FileSystem {
        path: PathBuf,
        source: std::io::Error,
    },
    /// XDG directory specification errors
    #[error("XDG directory error: {0}")]
    XdgDirectory(String),
    /// Invalid input validation errors
    #[error("Invalid input for field '{field}': {reason}")]
    InvalidInput { field: String, reason: String },
    /// Serialization/deserialization errors
    #[error("Serialization error: {source}")]
    Serialization {
        #[from]
        source: serde_json::Error,
    },
    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

/// Builder for creating database errors with optional context.
pub struct DatabaseErrorBuilder {
    message: String,
}

impl DatabaseErrorBuilder {
    /// Create a new database error builder with a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Build the error with the given source.
    pub fn with_source(self, source: rusqlite::Error) -> OutreachError {
        OutreachError::Database {
            message: self.message,
            source,
        }
    }
}

/// Builder for creating input validation errors.
pub struct InvalidInputBuilder {
    field: String,
}

impl InvalidInputBuilder {
    /// Create a new invalid input error builder for a field.
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
        }
    }

    /// Build the error with the given reason.
    pub fn with_reason(self, reason: impl Into<String>) -> OutreachError {
        OutreachError::InvalidInput {
            field: self.field,
            reason: reason.into(),
        }
    }
}

impl OutreachError {
    /// Creates a builder for database errors.
    pub fn database(message: impl Into<String>) -> DatabaseErrorBuilder {
        DatabaseErrorBuilder::new(message)
    }

    /// Creates a builder for input validation errors.
    pub fn invalid_input(field: impl Into<String>) -> InvalidInputBuilder {
        InvalidInputBuilder::new(field)
    }

    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState {
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    /// Errors the caller caused: absent ids, wrong status, bad input.
    ///
    /// Front ends surface these as client errors; everything else is an
    /// internal failure.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::LeadNotFound { .. }
                | Self::SequenceNotFound { .. }
                | Self::StepNotFound { .. }
                | Self::InvalidState { .. }
                | Self::UnknownSequenceType { .. }
                | Self::InvalidInput { .. }
        )
    }
}

impl From<GenerationError> for OutreachError {
    fn from(error: GenerationError) -> Self {
        Self::GenerationFailed {
            message: error.to_string(),
        }
    }
}

impl From<tokio::task::JoinError> for OutreachError {
    fn from(error: tokio::task::JoinError) -> Self {
        Self::Configuration {
            message: format!("Task join error: {error}"),
        }
    }
}

/// Specialized extension trait for database-related Results.
pub trait DatabaseResultExt<T> {
    /// Map database errors with a message.
    fn db_context(self, message: &str) -> Result<T>;
}

impl<T> DatabaseResultExt<T> for std::result::Result<T, rusqlite::Error> {
    fn db_context(self, message: &str) -> Result<T> {
        self.map_err(|e| OutreachError::database(message).with_source(e))
    }
}

/// Result type alias for outreach operations
pub type Result<T> = std::result::Result<T, OutreachError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_error_classification() {
        assert!(OutreachError::SequenceNotFound { id: 1 }.is_client_error());
        assert!(OutreachError::invalid_state("completed").is_client_error());
        assert!(OutreachError::UnknownSequenceType {
            name: "drip".into()
        }
        .is_client_error());
        assert!(!OutreachError::conflict("lost race").is_client_error());
        assert!(!OutreachError::GenerationFailed {
            message: "timeout".into()
        }
        .is_client_error());
    }

    #[test]
    fn test_generation_error_conversion() {
        let error: OutreachError = GenerationError::Timeout.into();
        match error {
            OutreachError::GenerationFailed { message } => {
                assert!(message.contains("timed out"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
