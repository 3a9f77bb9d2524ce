//! Lead operations for the SequenceEngine.

use log::info;

use super::SequenceEngine;
use crate::{
    db::run_blocking,
    display::Leads,
    error::Result,
    models::{Activity, Lead, Message},
    params::{CreateLead, Id, ListLeads, UpdateLeadStatus},
};

/// How many history entries `show` style queries return.
const HISTORY_LIMIT: u32 = 10;

impl SequenceEngine {
    /// Registers a new lead.
    pub async fn add_lead(&self, params: &CreateLead) -> Result<Lead> {
        let params = params.clone();
        let lead = run_blocking(self.db_path.clone(), move |db| db.insert_lead(&params)).await?;
        info!("Added lead {} <{}>", lead.id, lead.email);
        Ok(lead)
    }

    /// Retrieves a lead by ID.
    pub async fn get_lead(&self, params: &Id) -> Result<Option<Lead>> {
        let lead_id = params.id;
        run_blocking(self.db_path.clone(), move |db| db.get_lead(lead_id)).await
    }

    /// Lists leads, optionally filtered by pipeline stage.
    pub async fn list_leads(&self, params: &ListLeads) -> Result<Leads> {
        let status = params.status_filter()?;
        let leads = run_blocking(self.db_path.clone(), move |db| db.list_leads(status)).await?;
        Ok(Leads(leads))
    }

    /// Moves a lead to another pipeline stage. Returns `None` when the lead
    /// does not exist.
    pub async fn update_lead_status(&self, params: &UpdateLeadStatus) -> Result<Option<Lead>> {
        let status = params.parsed_status()?;
        let lead_id = params.id;
        let lead = run_blocking(self.db_path.clone(), move |db| {
            db.update_lead_status(lead_id, status)
        })
        .await?;
        if lead.is_some() {
            info!("Lead {lead_id} moved to {status}");
        }
        Ok(lead)
    }

    /// Deletes a lead along with its sequences and history.
    pub async fn delete_lead(&self, params: &Id) -> Result<bool> {
        let lead_id = params.id;
        let removed = run_blocking(self.db_path.clone(), move |db| db.delete_lead(lead_id)).await?;
        if removed {
            info!("Deleted lead {lead_id}");
        }
        Ok(removed)
    }

    /// Most recent generated messages for a lead.
    pub async fn lead_messages(&self, params: &Id) -> Result<Vec<Message>> {
        let lead_id = params.id;
        run_blocking(self.db_path.clone(), move |db| {
            db.list_messages(lead_id, HISTORY_LIMIT)
        })
        .await
    }

    /// Most recent activity-log entries for a lead.
    pub async fn lead_activities(&self, params: &Id) -> Result<Vec<Activity>> {
        let lead_id = params.id;
        run_blocking(self.db_path.clone(), move |db| {
            db.list_activities(lead_id, HISTORY_LIMIT)
        })
        .await
    }
}
