//! Command handlers for the CLI
//!
//! Each subcommand converts its clap arguments into core parameters, calls
//! the engine and renders the markdown `Display` output of the result.

use anyhow::{bail, Context, Result};
use outreach_core::{
    display::OperationStatus,
    params::{Id, ListSequences},
    ExecutionOutcome, SequenceEngine,
};

use crate::{
    args::{LeadCommands, SequenceCommands},
    renderer::TerminalRenderer,
};

pub struct Cli {
    engine: SequenceEngine,
    renderer: TerminalRenderer,
}

impl Cli {
    pub fn new(engine: SequenceEngine, renderer: TerminalRenderer) -> Self {
        Self { engine, renderer }
    }

    pub async fn handle_lead_command(&self, command: LeadCommands) -> Result<()> {
        match command {
            LeadCommands::Add(args) => {
                let lead = self
                    .engine
                    .add_lead(&args.into())
                    .await
                    .context("Failed to add lead")?;
                self.status(format!(
                    "Added lead {} ({}) with ID: {}",
                    lead.display_name(),
                    lead.email,
                    lead.id
                ));
            }
            LeadCommands::List(args) => {
                let leads = self
                    .engine
                    .list_leads(&args.into())
                    .await
                    .context("Failed to list leads")?;
                self.renderer.render(&format!("# Leads\n\n{leads}"));
            }
            LeadCommands::Show(args) => self.show_lead(&args.into()).await?,
            LeadCommands::Status(args) => {
                let params = args.into();
                let lead = self
                    .engine
                    .update_lead_status(&params)
                    .await
                    .context("Failed to update lead status")?;
                match lead {
                    Some(lead) => self.status(format!(
                        "Lead {} is now {}",
                        lead.id, lead.status
                    )),
                    None => bail!("Lead with ID {} not found", params.id),
                }
            }
            LeadCommands::Delete(args) => {
                let params: Id = args.into();
                let removed = self
                    .engine
                    .delete_lead(&params)
                    .await
                    .context("Failed to delete lead")?;
                if !removed {
                    bail!("Lead with ID {} not found", params.id);
                }
                self.status(format!(
                    "Deleted lead {} with its sequences and history",
                    params.id
                ));
            }
        }
        Ok(())
    }

    pub async fn handle_sequence_command(&self, command: SequenceCommands) -> Result<()> {
        match command {
            SequenceCommands::Create(args) => {
                let created = self
                    .engine
                    .create_outreach_sequence(&args.into())
                    .await
                    .context("Failed to create sequence")?;
                self.status(format!(
                    "Created sequence with ID: {} ({} steps)",
                    created.sequence_id, created.total_steps
                ));
            }
            SequenceCommands::Execute(args) => {
                let params: Id = args.into();
                let outcome = self
                    .engine
                    .execute_next_step(&params)
                    .await
                    .context("Failed to execute step")?;
                self.renderer.render(&outcome.to_string());
                if let ExecutionOutcome::StepFailed { step_number, .. } = outcome {
                    bail!("Step {step_number} of sequence {} failed", params.id);
                }
            }
            SequenceCommands::List(args) => self.list_sequences(&args.into()).await?,
            SequenceCommands::Show(args) => {
                let params: Id = args.into();
                let sequence = self
                    .engine
                    .get_sequence(&params)
                    .await
                    .context("Failed to get sequence")?;
                match sequence {
                    Some(sequence) => self.renderer.render(&sequence.to_string()),
                    None => bail!("Sequence with ID {} not found", params.id),
                }
            }
            SequenceCommands::Analytics => {
                let analytics = self
                    .engine
                    .get_sequence_analytics()
                    .await
                    .context("Failed to compute analytics")?;
                self.renderer.render(&analytics.to_string());
            }
        }
        Ok(())
    }

    pub async fn list_sequences(&self, params: &ListSequences) -> Result<()> {
        let summaries = self
            .engine
            .list_sequences(params)
            .await
            .context("Failed to list sequences")?;
        let title = match params.status.as_deref() {
            Some("active") => "Active Sequences",
            Some("completed") => "Completed Sequences",
            _ => "Sequences",
        };
        self.renderer.render(&format!("# {title}\n\n{summaries}"));
        Ok(())
    }

    async fn show_lead(&self, params: &Id) -> Result<()> {
        let Some(lead) = self
            .engine
            .get_lead(params)
            .await
            .context("Failed to get lead")?
        else {
            bail!("Lead with ID {} not found", params.id);
        };
        let sequences = self
            .engine
            .lead_sequences(params)
            .await
            .context("Failed to list lead sequences")?;
        let messages = self
            .engine
            .lead_messages(params)
            .await
            .context("Failed to list messages")?;

        let mut output = format!("{lead}\n## Sequences\n\n{sequences}");
        if !messages.is_empty() {
            output.push_str("\n## Recent Messages\n\n");
            for message in &messages {
                output.push_str(&message.to_string());
            }
        }
        self.renderer.render(&output);
        Ok(())
    }

    fn status(&self, message: String) {
        self.renderer
            .render(&OperationStatus::success(message).to_string());
    }
}
