//! Outreach CLI Application
//!
//! Command-line interface and MCP server for the outreach sequence engine.

mod args;
mod cli;
mod mcp;
mod renderer;

use std::sync::Arc;

use anyhow::{Context, Result};
use args::{Args, Commands};
use clap::Parser;
use cli::Cli;
use log::{info, warn};
use mcp::{run_stdio_server, OutreachMcpServer};
use outreach_core::{
    generation::{ContentGenerator, GenerationError, GrokClient, TemplateGenerator},
    params::ListSequences,
    SequenceEngineBuilder,
};
use renderer::TerminalRenderer;
use Commands::*;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let Args {
        database_file,
        no_color,
        offline,
        command,
    } = Args::parse();

    let engine = SequenceEngineBuilder::new()
        .with_database_path(database_file)
        .with_generator(select_generator(offline)?)
        .build()
        .await
        .context("Failed to initialize sequence engine")?;

    let renderer = TerminalRenderer::new(!no_color);

    info!("Outreach started with {} generator", engine.generator_name());

    match command {
        Some(Lead { command }) => {
            Cli::new(engine, renderer)
                .handle_lead_command(command)
                .await
        }
        Some(Sequence { command }) => {
            Cli::new(engine, renderer)
                .handle_sequence_command(command)
                .await
        }
        Some(Serve) => {
            info!("Starting Outreach MCP server");
            run_stdio_server(OutreachMcpServer::new(engine))
                .await
                .context("MCP server failed")
        }
        None => {
            Cli::new(engine, renderer)
                .list_sequences(&ListSequences::default())
                .await
        }
    }
}

/// The xAI client when an API key is configured, otherwise the offline
/// template generator.
fn select_generator(offline: bool) -> Result<Arc<dyn ContentGenerator>> {
    if offline {
        return Ok(Arc::new(TemplateGenerator::new()));
    }
    match GrokClient::from_env() {
        Ok(client) => Ok(Arc::new(client)),
        Err(GenerationError::MissingApiKey) => {
            warn!("XAI_API_KEY is not set; falling back to offline templates");
            Ok(Arc::new(TemplateGenerator::new()))
        }
        Err(e) => Err(e).context("Failed to configure content generator"),
    }
}
