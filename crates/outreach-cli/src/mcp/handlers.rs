//! MCP tool handlers implementation

use std::sync::Arc;

use log::debug;
use outreach_core::{display::OperationStatus, params as core, SequenceEngine};
use rmcp::{
    model::{CallToolResult, Content},
    ErrorData,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::errors::{not_found, to_mcp_error};

// Generic wrapper that adds the MCP derives to core parameter types while
// keeping them free of framework attributes. `#[serde(transparent)]` passes
// deserialization straight through to the wrapped type.

/// MCP wrapper for core parameter types
#[derive(Debug, Deserialize)]
#[serde(transparent)]
pub struct McpParams<T>(T)
where
    T: JsonSchema;

impl<T> JsonSchema for McpParams<T>
where
    T: JsonSchema,
{
    fn schema_name() -> std::borrow::Cow<'static, str> {
        T::schema_name()
    }

    fn json_schema(g: &mut schemars::SchemaGenerator) -> schemars::Schema {
        T::json_schema(g)
    }
}

impl<T> AsRef<T> for McpParams<T>
where
    T: JsonSchema,
{
    fn as_ref(&self) -> &T {
        &self.0
    }
}

pub type Id = McpParams<core::Id>;
pub type CreateLead = McpParams<core::CreateLead>;
pub type CreateSequence = McpParams<core::CreateSequence>;
pub type ListSequences = McpParams<core::ListSequences>;

pub type McpResult = Result<CallToolResult, ErrorData>;

fn json_result<T: Serialize>(value: &T) -> McpResult {
    let body = serde_json::to_string_pretty(value)
        .map_err(|e| ErrorData::internal_error(format!("Failed to encode result: {e}"), None))?;
    Ok(CallToolResult::success(vec![Content::text(body)]))
}

fn text_result(text: impl Into<String>) -> McpResult {
    Ok(CallToolResult::success(vec![Content::text(text.into())]))
}

/// Handler implementations for the MCP server
pub struct McpHandlers {
    engine: Arc<SequenceEngine>,
}

impl McpHandlers {
    pub fn new(engine: Arc<SequenceEngine>) -> Self {
        Self { engine }
    }

    pub async fn create_sequence(&self, params: CreateSequence) -> McpResult {
        debug!("create_sequence: {params:?}");

        let created = self
            .engine
            .create_outreach_sequence(params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to create sequence", &e))?;

        json_result(&created)
    }

    pub async fn execute_step(&self, params: Id) -> McpResult {
        debug!("execute_step: {params:?}");

        let outcome = self
            .engine
            .execute_next_step(params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to execute step", &e))?;

        json_result(&outcome)
    }

    pub async fn sequence_analytics(&self) -> McpResult {
        debug!("sequence_analytics");

        let analytics = self
            .engine
            .get_sequence_analytics()
            .await
            .map_err(|e| to_mcp_error("Failed to compute analytics", &e))?;

        json_result(&analytics)
    }

    pub async fn add_lead(&self, params: CreateLead) -> McpResult {
        debug!("add_lead: {params:?}");

        let lead = self
            .engine
            .add_lead(params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to add lead", &e))?;

        text_result(
            OperationStatus::success(format!(
                "Added lead {} with ID: {}. Use 'create_sequence' with lead_id={} to start outreach.",
                lead.email, lead.id, lead.id
            ))
            .to_string(),
        )
    }

    pub async fn show_lead(&self, params: Id) -> McpResult {
        debug!("show_lead: {params:?}");

        let lead = self
            .engine
            .get_lead(params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to get lead", &e))?
            .ok_or_else(|| not_found("Lead", params.as_ref().id))?;
        let sequences = self
            .engine
            .lead_sequences(params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to list lead sequences", &e))?;
        let activities = self
            .engine
            .lead_activities(params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to list activities", &e))?;

        let mut output = format!("{lead}\n## Sequences\n\n{sequences}");
        if !activities.is_empty() {
            output.push_str("\n## Recent Activity\n\n");
            for activity in &activities {
                output.push_str(&format!("- [{}]", activity.kind));
                if let Some(subject) = &activity.subject {
                    output.push_str(&format!(" {subject}"));
                }
                output.push('\n');
            }
        }
        text_result(output)
    }

    pub async fn list_sequences(&self, params: ListSequences) -> McpResult {
        debug!("list_sequences: {params:?}");

        let summaries = self
            .engine
            .list_sequences(params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to list sequences", &e))?;

        if summaries.is_empty() {
            return text_result("# No sequences found\n");
        }
        let title = match params.as_ref().status.as_deref() {
            Some("active") => "Active Sequences",
            Some("completed") => "Completed Sequences",
            _ => "Sequences",
        };
        text_result(format!("# {title}\n\n{summaries}"))
    }

    pub async fn show_sequence(&self, params: Id) -> McpResult {
        debug!("show_sequence: {params:?}");

        let sequence = self
            .engine
            .get_sequence(params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to get sequence", &e))?
            .ok_or_else(|| not_found("Sequence", params.as_ref().id))?;

        text_result(sequence.to_string())
    }
}
