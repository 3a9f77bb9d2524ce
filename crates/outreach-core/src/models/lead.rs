//! Lead model definition.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use super::LeadStatus;

/// A prospect that outreach sequences are run against.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Lead {
    /// Unique identifier for the lead
    pub id: u64,

    /// Contact email, unique across leads
    pub email: String,

    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub company: Option<String>,
    pub title: Option<String>,
    pub industry: Option<String>,
    pub company_size: Option<String>,
    pub linkedin_url: Option<String>,
    pub website: Option<String>,

    /// Pipeline stage
    #[serde(default)]
    pub status: LeadStatus,

    /// Timestamp when the lead was created (UTC)
    pub created_at: Timestamp,

    /// Timestamp when the lead was last modified (UTC)
    pub updated_at: Timestamp,
}

impl Lead {
    /// Full name when known, otherwise the email address.
    pub fn display_name(&self) -> String {
        match (self.first_name.as_deref(), self.last_name.as_deref()) {
            (Some(first), Some(last)) => format!("{first} {last}"),
            (Some(name), None) | (None, Some(name)) => name.to_string(),
            (None, None) => self.email.clone(),
        }
    }

    /// Salutation name: first name, else the display name.
    pub fn greeting_name(&self) -> String {
        self.first_name
            .clone()
            .unwrap_or_else(|| self.display_name())
    }

    pub fn company_or_default(&self) -> &str {
        self.company.as_deref().unwrap_or("your company")
    }
}
