//! Command-line argument definitions using clap
//!
//! The CLI side of the parameter wrapper pattern: each command has an
//! argument struct with clap derives and a `From` conversion into the core
//! parameter type, so core params stay free of framework attributes.
//!
//! ```text
//! User Input → CLI Args (clap) → Core Params → SequenceEngine
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use outreach_core::params::*;

/// Outreach sequence engine
///
/// Enrolls leads in multi-step outreach sequences (email, follow-up,
/// LinkedIn, call, research and meeting steps), generates each step's content
/// and tracks progress. Runs as a command-line tool or as an MCP server for
/// AI assistants.
#[derive(Parser)]
#[command(version, about, name = "outreach")]
pub struct Args {
    /// Path to the SQLite database file. Defaults to
    /// $XDG_DATA_HOME/outreach/outreach.db
    #[arg(long, global = true)]
    pub database_file: Option<PathBuf>,

    /// Disable colored output and use plain text
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Use offline templates instead of the xAI API
    #[arg(long, global = true)]
    pub offline: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage leads
    #[command(alias = "l")]
    Lead {
        #[command(subcommand)]
        command: LeadCommands,
    },
    /// Manage outreach sequences
    #[command(alias = "s")]
    Sequence {
        #[command(subcommand)]
        command: SequenceCommands,
    },
    /// Start the MCP server
    Serve,
}

/// Register a new lead
#[derive(clap::Args)]
pub struct AddLeadArgs {
    /// Contact email address
    pub email: String,
    #[arg(long, help = "First name of the contact")]
    pub first_name: Option<String>,
    #[arg(long, help = "Last name of the contact")]
    pub last_name: Option<String>,
    #[arg(short, long, help = "Company the contact works for")]
    pub company: Option<String>,
    #[arg(short, long, help = "Job title of the contact")]
    pub title: Option<String>,
    #[arg(long, help = "Industry of the company")]
    pub industry: Option<String>,
    #[arg(long, help = "Company size, e.g. 50-200")]
    pub company_size: Option<String>,
    #[arg(long, help = "LinkedIn profile URL")]
    pub linkedin_url: Option<String>,
    #[arg(long, help = "Company website")]
    pub website: Option<String>,
}

impl From<AddLeadArgs> for CreateLead {
    fn from(val: AddLeadArgs) -> Self {
        CreateLead {
            email: val.email,
            first_name: val.first_name,
            last_name: val.last_name,
            company: val.company,
            title: val.title,
            industry: val.industry,
            company_size: val.company_size,
            linkedin_url: val.linkedin_url,
            website: val.website,
        }
    }
}

/// List leads
#[derive(clap::Args)]
pub struct ListLeadsArgs {
    #[arg(short, long, help = "Only show leads in this pipeline stage")]
    pub status: Option<LeadStatusArg>,
}

impl From<ListLeadsArgs> for ListLeads {
    fn from(val: ListLeadsArgs) -> Self {
        ListLeads {
            status: val.status.map(|s| s.to_string()),
        }
    }
}

/// Show or delete a lead
#[derive(clap::Args)]
pub struct LeadIdArgs {
    #[arg(help = "Unique identifier of the lead")]
    pub id: u64,
}

impl From<LeadIdArgs> for Id {
    fn from(val: LeadIdArgs) -> Self {
        Id { id: val.id }
    }
}

/// Move a lead to another pipeline stage
#[derive(clap::Args)]
pub struct UpdateLeadStatusArgs {
    #[arg(help = "Unique identifier of the lead")]
    pub id: u64,
    #[arg(help = "New pipeline stage")]
    pub status: LeadStatusArg,
}

impl From<UpdateLeadStatusArgs> for UpdateLeadStatus {
    fn from(val: UpdateLeadStatusArgs) -> Self {
        UpdateLeadStatus {
            id: val.id,
            status: val.status.to_string(),
        }
    }
}

#[derive(Subcommand)]
pub enum LeadCommands {
    /// Register a new lead
    #[command(alias = "a")]
    Add(AddLeadArgs),
    /// List leads
    #[command(aliases = ["l", "ls"])]
    List(ListLeadsArgs),
    /// Show a lead with its sequences and recent history
    #[command(alias = "s")]
    Show(LeadIdArgs),
    /// Move a lead to another pipeline stage
    #[command(alias = "st")]
    Status(UpdateLeadStatusArgs),
    /// Delete a lead and everything recorded for it
    #[command(aliases = ["d", "rm"])]
    Delete(LeadIdArgs),
}

/// Start an outreach sequence for a lead
#[derive(clap::Args)]
pub struct CreateSequenceArgs {
    #[arg(help = "Unique identifier of the lead to enroll")]
    pub lead_id: u64,
    #[arg(
        short = 't',
        long = "type",
        value_enum,
        help = "Sequence template to use (defaults to standard)"
    )]
    pub sequence_type: Option<SequenceTypeArg>,
}

impl From<CreateSequenceArgs> for CreateSequence {
    fn from(val: CreateSequenceArgs) -> Self {
        CreateSequence {
            lead_id: val.lead_id,
            sequence_type: val.sequence_type.map(|t| t.to_string()),
        }
    }
}

/// Target a single sequence
#[derive(clap::Args)]
pub struct SequenceIdArgs {
    #[arg(help = "Unique identifier of the sequence")]
    pub id: u64,
}

impl From<SequenceIdArgs> for Id {
    fn from(val: SequenceIdArgs) -> Self {
        Id { id: val.id }
    }
}

/// List sequences
#[derive(clap::Args)]
pub struct ListSequencesArgs {
    #[arg(short, long, help = "Only show sequences in this status")]
    pub status: Option<SequenceStatusArg>,
}

impl From<ListSequencesArgs> for ListSequences {
    fn from(val: ListSequencesArgs) -> Self {
        ListSequences {
            status: val.status.map(|s| s.to_string()),
        }
    }
}

#[derive(Subcommand)]
pub enum SequenceCommands {
    /// Start an outreach sequence for a lead
    #[command(alias = "c")]
    Create(CreateSequenceArgs),
    /// Execute the next ready step of a sequence
    #[command(aliases = ["x", "exec"])]
    Execute(SequenceIdArgs),
    /// List sequences
    #[command(aliases = ["l", "ls"])]
    List(ListSequencesArgs),
    /// Show a sequence with all of its steps
    #[command(alias = "s")]
    Show(SequenceIdArgs),
    /// Show aggregate sequence statistics
    #[command(alias = "a")]
    Analytics,
}

/// Pipeline stage values accepted on the command line
#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum LeadStatusArg {
    New,
    Contacted,
    Qualified,
    Proposal,
    Negotiation,
    Won,
    Lost,
}

impl std::fmt::Display for LeadStatusArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let value = match self {
            LeadStatusArg::New => "new",
            LeadStatusArg::Contacted => "contacted",
            LeadStatusArg::Qualified => "qualified",
            LeadStatusArg::Proposal => "proposal",
            LeadStatusArg::Negotiation => "negotiation",
            LeadStatusArg::Won => "won",
            LeadStatusArg::Lost => "lost",
        };
        f.write_str(value)
    }
}

/// Sequence templates accepted on the command line
#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum SequenceTypeArg {
    Standard,
    Enterprise,
    #[value(name = "quick_touch")]
    QuickTouch,
}

impl std::fmt::Display for SequenceTypeArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SequenceTypeArg::Standard => write!(f, "standard"),
            SequenceTypeArg::Enterprise => write!(f, "enterprise"),
            SequenceTypeArg::QuickTouch => write!(f, "quick_touch"),
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum SequenceStatusArg {
    Active,
    Completed,
}

impl std::fmt::Display for SequenceStatusArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SequenceStatusArg::Active => write!(f, "active"),
            SequenceStatusArg::Completed => write!(f, "completed"),
        }
    }
}
