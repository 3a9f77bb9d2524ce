//! Parameter structures for outreach operations
//!
//! Shared parameter structures used by every interface (CLI, MCP) without
//! framework-specific derives. Interface layers wrap or convert into these
//! types; JSON schema generation is enabled only with the `schema` feature.
//!
//! ```text
//! ┌─────────────────┐    ┌─────────────────┐    ┌─────────────────┐
//! │   CLI Args      │    │   MCP Params    │    │  Core Params    │
//! │  (clap derives) │───▶│ (serde derives) │───▶│ (minimal deps)  │
//! └─────────────────┘    └─────────────────┘    └─────────────────┘
//! ```

#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{
    error::{OutreachError, Result},
    models::{LeadStatus, SequenceStatus},
};

/// Generic parameters for operations requiring just an ID.
///
/// Used for show_lead, delete_lead, show_sequence and execute_step.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct Id {
    /// The ID of the resource to operate on
    pub id: u64,
}

/// Parameters for registering a new lead.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct CreateLead {
    /// Contact email (required, unique)
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub company: Option<String>,
    /// Job title of the contact
    pub title: Option<String>,
    pub industry: Option<String>,
    pub company_size: Option<String>,
    pub linkedin_url: Option<String>,
    pub website: Option<String>,
}

impl CreateLead {
    /// Reject leads without a plausible email address.
    pub fn validate(&self) -> Result<()> {
        let email = self.email.trim();
        let valid = email
            .split_once('@')
            .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
        if !valid {
            return Err(OutreachError::invalid_input("email")
                .with_reason(format!("'{}' is not a valid email address", self.email)));
        }
        Ok(())
    }
}

/// Parameters for listing leads.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct ListLeads {
    /// Only leads in this pipeline stage (new, contacted, qualified,
    /// proposal, negotiation, won, lost)
    pub status: Option<String>,
}

impl ListLeads {
    pub fn status_filter(&self) -> Result<Option<LeadStatus>> {
        parse_optional(self.status.as_deref(), "status")
    }
}

/// Parameters for moving a lead to another pipeline stage.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct UpdateLeadStatus {
    /// The ID of the lead
    pub id: u64,
    /// New pipeline stage
    pub status: String,
}

impl UpdateLeadStatus {
    pub fn parsed_status(&self) -> Result<LeadStatus> {
        self.status
            .parse()
            .map_err(|e: String| OutreachError::invalid_input("status").with_reason(e))
    }
}

/// Parameters for starting an outreach sequence.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct CreateSequence {
    /// Lead the sequence targets
    pub lead_id: u64,
    /// Catalog key: standard (default), enterprise or quick_touch
    pub sequence_type: Option<String>,
}

/// Parameters for listing sequences.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct ListSequences {
    /// Only sequences in this status (active or completed); all when absent
    pub status: Option<String>,
}

impl ListSequences {
    pub fn status_filter(&self) -> Result<Option<SequenceStatus>> {
        parse_optional(self.status.as_deref(), "status")
    }
}

fn parse_optional<T>(value: Option<&str>, field: &str) -> Result<Option<T>>
where
    T: std::str::FromStr<Err = String>,
{
    value
        .map(|raw| {
            raw.parse::<T>()
                .map_err(|e| OutreachError::invalid_input(field).with_reason(e))
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_lead_email_validation() {
        let mut lead = CreateLead {
            email: "sam@example.com".into(),
            ..Default::default()
        };
        assert!(lead.validate().is_ok());

        for bad in ["", "sam", "@example.com", "sam@localhost"] {
            lead.email = bad.into();
            assert!(lead.validate().is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn test_status_filters() {
        let params = ListSequences {
            status: Some("completed".into()),
        };
        assert_eq!(
            params.status_filter().unwrap(),
            Some(SequenceStatus::Completed)
        );
        assert_eq!(ListSequences::default().status_filter().unwrap(), None);

        let bad = ListLeads {
            status: Some("archived".into()),
        };
        assert!(matches!(
            bad.status_filter(),
            Err(OutreachError::InvalidInput { .. })
        ));
    }
}
