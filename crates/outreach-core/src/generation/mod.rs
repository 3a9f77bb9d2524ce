//! Content generation capability.
//!
//! Step execution never talks to a model directly. It hands a
//! [`GenerationRequest`] to an injected [`ContentGenerator`], which either
//! calls the xAI chat completions API ([`GrokClient`]) or renders canned
//! templates offline ([`TemplateGenerator`]).

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{GeneratedContent, GenerationContext, Lead, MessageFormat, ResearchFindings};

pub mod grok;
pub mod template;

pub use grok::{GrokClient, GrokConfig};
pub use template::TemplateGenerator;

/// Everything a generator needs to write one piece of outreach.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub lead: Lead,
    pub format: MessageFormat,
    /// Catalog template key, e.g. `follow_up_1` or `demo_request`
    pub template_key: String,
    pub context: GenerationContext,
}

/// Failures of the generation capability.
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("XAI_API_KEY is not set")]
    MissingApiKey,
    #[error("HTTP request failed: {0}")]
    Http(String),
    #[error("request timed out")]
    Timeout,
    #[error("authentication failed, check the xAI API key")]
    Unauthorized,
    #[error("rate limit exceeded, try again later")]
    RateLimited,
    #[error("xAI service unavailable (status {status})")]
    ServiceUnavailable { status: u16 },
    #[error("API returned status {status}: {message}")]
    Api { status: u16, message: String },
    #[error("malformed model response: {0}")]
    MalformedResponse(String),
}

impl From<reqwest::Error> for GenerationError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout
        } else {
            Self::Http(error.to_string())
        }
    }
}

impl GenerationError {
    /// Classify a non-success HTTP status.
    pub fn from_status(status: u16, body: String) -> Self {
        match status {
            401 => Self::Unauthorized,
            429 => Self::RateLimited,
            500..=599 => Self::ServiceUnavailable { status },
            _ => Self::Api {
                status,
                message: body,
            },
        }
    }
}

/// Produces outreach text and lead research.
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &str;

    /// Write a message in the requested format.
    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GeneratedContent, GenerationError>;

    /// Produce structured research findings about a lead.
    async fn research(&self, lead: &Lead) -> Result<ResearchFindings, GenerationError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        assert!(matches!(
            GenerationError::from_status(401, String::new()),
            GenerationError::Unauthorized
        ));
        assert!(matches!(
            GenerationError::from_status(429, String::new()),
            GenerationError::RateLimited
        ));
        assert!(matches!(
            GenerationError::from_status(503, String::new()),
            GenerationError::ServiceUnavailable { status: 503 }
        ));
        match GenerationError::from_status(400, "bad model".into()) {
            GenerationError::Api { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "bad model");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }
}
