//! MCP server implementation for Outreach
//!
//! Exposes the sequence engine to AI assistants over the Model Context
//! Protocol. The three core operations answer with JSON; inspection tools
//! answer with markdown.

use std::sync::Arc;

use anyhow::Result;
use log::{debug, error, info};
use outreach_core::SequenceEngine;
use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{Implementation, ProtocolVersion, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router, ServerHandler,
};
use tokio::signal::unix::{signal, SignalKind};

pub mod errors;
pub mod handlers;

pub use handlers::{CreateLead, CreateSequence, Id, ListSequences, McpResult};

/// MCP server for Outreach
#[derive(Clone)]
pub struct OutreachMcpServer {
    engine: Arc<SequenceEngine>,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl OutreachMcpServer {
    pub fn new(engine: SequenceEngine) -> Self {
        Self {
            engine: Arc::new(engine),
            tool_router: Self::tool_router(),
        }
    }

    fn handlers(&self) -> handlers::McpHandlers {
        handlers::McpHandlers::new(self.engine.clone())
    }

    #[tool(
        name = "create_sequence",
        description = "Start an outreach sequence for an existing lead. Provide lead_id (required) and optional sequence_type: 'standard' (default, 5 steps over 14 days), 'enterprise' (research-led, 5 steps) or 'quick_touch' (3 steps over 5 days). Returns JSON {sequence_id, total_steps}; step 1 is immediately ready."
    )]
    async fn create_sequence(&self, Parameters(params): Parameters<CreateSequence>) -> McpResult {
        self.handlers().create_sequence(params).await
    }

    #[tool(
        name = "execute_step",
        description = "Execute the next ready step of a sequence by its id. Generates the step's content and records it. Returns JSON with status: 'step_completed' (with step_number, step_type and result), 'sequence_completed', 'no_ready_steps' (the next step is not due yet) or 'step_failed' (with error; the step stays ready and can be retried)."
    )]
    async fn execute_step(&self, Parameters(params): Parameters<Id>) -> McpResult {
        self.handlers().execute_step(params).await
    }

    #[tool(
        name = "sequence_analytics",
        description = "Aggregate statistics over all sequences. Returns JSON {total_sequences, active_sequences, completed_sequences, conversion_rate}, where conversion_rate is the percentage of completed sequences whose lead reached qualified, proposal or won."
    )]
    async fn sequence_analytics(&self) -> McpResult {
        self.handlers().sequence_analytics().await
    }

    #[tool(
        name = "add_lead",
        description = "Register a new lead. email is required and must be unique; first_name, last_name, company, title, industry, company_size, linkedin_url and website are optional and improve personalization. Returns the new lead ID."
    )]
    async fn add_lead(&self, Parameters(params): Parameters<CreateLead>) -> McpResult {
        self.handlers().add_lead(params).await
    }

    #[tool(
        name = "show_lead",
        description = "Show a lead's details, pipeline status, sequences and recent activity by lead id."
    )]
    async fn show_lead(&self, Parameters(params): Parameters<Id>) -> McpResult {
        self.handlers().show_lead(params).await
    }

    #[tool(
        name = "list_sequences",
        description = "List sequences newest first with lead name, type, status and progress. Optional status filter: 'active' or 'completed'."
    )]
    async fn list_sequences(&self, Parameters(params): Parameters<ListSequences>) -> McpResult {
        self.handlers().list_sequences(params).await
    }

    #[tool(
        name = "show_sequence",
        description = "Show a sequence by id with every step, its schedule, status and generated content."
    )]
    async fn show_sequence(&self, Parameters(params): Parameters<Id>) -> McpResult {
        self.handlers().show_sequence(params).await
    }
}

#[tool_handler(router = self.tool_router)]
impl ServerHandler for OutreachMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "outreach".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Default::default()
            },
            instructions: Some(r#"Outreach runs multi-step sales outreach sequences for leads.

## Core Concepts
- **Leads**: contacts with company details and a pipeline status
- **Sequences**: an ordered template of steps (email, follow-up, LinkedIn, call, research, meeting) enrolled for one lead
- **Steps**: each step is scheduled a number of days after the sequence starts and becomes ready once due

## Workflow
1. Register a contact with `add_lead`
2. Start a sequence with `create_sequence`
3. Call `execute_step` to run the next ready step; 'no_ready_steps' means wait until the next step is due
4. Review progress with `show_sequence`, `list_sequences` and `sequence_analytics`

Executing the same sequence concurrently is safe: a step is completed at most once."#
                .to_string()),
            ..Default::default()
        }
    }
}

/// Run the MCP server with stdio transport
pub async fn run_stdio_server(server: OutreachMcpServer) -> Result<()> {
    use rmcp::{transport::stdio, ServiceExt};

    info!("Starting Outreach MCP server on stdio");
    debug!(
        "Server created with {} tools",
        server.tool_router.list_all().len()
    );

    let service = server.serve(stdio()).await.inspect_err(|e| {
        error!("serving error: {e:?}");
    })?;

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;

    tokio::select! {
        result = service.waiting() => {
            match result {
                Ok(_) => info!("MCP server stopped normally"),
                Err(e) => error!("MCP server error: {e:?}"),
            }
        }
        _ = sigint.recv() => {
            info!("Received SIGINT, shutting down gracefully...");
        }
        _ = sigterm.recv() => {
            info!("Received SIGTERM, shutting down gracefully...");
        }
    }

    info!("MCP server shutdown complete");
    Ok(())
}
