//! Lead CRUD operations and queries.

use jiff::Timestamp;
use rusqlite::{params, OptionalExtension};

use super::{content_queries, parsed_at, timestamp_at};
use crate::{
    error::{DatabaseResultExt, OutreachError, Result},
    models::{Lead, LeadStatus, NewActivity},
    params::CreateLead,
};

const INSERT_LEAD_SQL: &str = "INSERT INTO leads (email, first_name, last_name, company, title, industry, company_size, linkedin_url, website, status, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)";
const LEAD_COLUMNS: &str = "id, email, first_name, last_name, company, title, industry, company_size, linkedin_url, website, status, created_at, updated_at";
const CHECK_EMAIL_EXISTS_SQL: &str = "SELECT EXISTS(SELECT 1 FROM leads WHERE email = ?1)";
const SELECT_LEAD_STATUS_SQL: &str = "SELECT status FROM leads WHERE id = ?1";
const UPDATE_LEAD_STATUS_SQL: &str = "UPDATE leads SET status = ?1, updated_at = ?2 WHERE id = ?3";
const DELETE_LEAD_SQL: &str = "DELETE FROM leads WHERE id = ?1";

impl super::Database {
    /// Helper function to construct a Lead from a database row
    fn build_lead_from_row(row: &rusqlite::Row) -> rusqlite::Result<Lead> {
        Ok(Lead {
            id: row.get::<_, i64>(0)? as u64,
            email: row.get(1)?,
            first_name: row.get(2)?,
            last_name: row.get(3)?,
            company: row.get(4)?,
            title: row.get(5)?,
            industry: row.get(6)?,
            company_size: row.get(7)?,
            linkedin_url: row.get(8)?,
            website: row.get(9)?,
            status: parsed_at(row, 10)?,
            created_at: timestamp_at(row, 11)?,
            updated_at: timestamp_at(row, 12)?,
        })
    }

    /// Registers a new lead with status `new`.
    pub fn insert_lead(&mut self, params: &CreateLead) -> Result<Lead> {
        params.validate()?;
        let email = params.email.trim().to_lowercase();

        let tx = self
            .connection
            .transaction()
            .db_context("Failed to begin transaction")?;

        let exists: bool = tx
            .query_row(CHECK_EMAIL_EXISTS_SQL, params![&email], |row| row.get(0))
            .db_context("Failed to check lead email")?;
        if exists {
            return Err(OutreachError::invalid_input("email")
                .with_reason(format!("A lead with email '{email}' already exists")));
        }

        let now = Timestamp::now();
        let now_str = now.to_string();

        tx.execute(
            INSERT_LEAD_SQL,
            params![
                &email,
                params.first_name,
                params.last_name,
                params.company,
                params.title,
                params.industry,
                params.company_size,
                params.linkedin_url,
                params.website,
                LeadStatus::New.as_str(),
                &now_str,
                &now_str
            ],
        )
        .db_context("Failed to insert lead")?;

        let id = tx.last_insert_rowid() as u64;
        tx.commit().db_context("Failed to commit transaction")?;

        Ok(Lead {
            id,
            email,
            first_name: params.first_name.clone(),
            last_name: params.last_name.clone(),
            company: params.company.clone(),
            title: params.title.clone(),
            industry: params.industry.clone(),
            company_size: params.company_size.clone(),
            linkedin_url: params.linkedin_url.clone(),
            website: params.website.clone(),
            status: LeadStatus::New,
            created_at: now,
            updated_at: now,
        })
    }

    /// Retrieves a lead by ID.
    pub fn get_lead(&self, lead_id: u64) -> Result<Option<Lead>> {
        let sql = format!("SELECT {LEAD_COLUMNS} FROM leads WHERE id = ?1");
        self.connection
            .query_row(&sql, params![lead_id as i64], Self::build_lead_from_row)
            .optional()
            .db_context("Failed to get lead")
    }

    /// Lists leads, newest first, optionally restricted to one stage.
    pub fn list_leads(&self, status: Option<LeadStatus>) -> Result<Vec<Lead>> {
        let sql = format!(
            "SELECT {LEAD_COLUMNS} FROM leads WHERE (?1 IS NULL OR status = ?1) ORDER BY created_at DESC, id DESC"
        );
        let mut stmt = self
            .connection
            .prepare(&sql)
            .db_context("Failed to prepare query")?;

        let leads = stmt
            .query_map(
                params![status.map(|s| s.as_str())],
                Self::build_lead_from_row,
            )
            .db_context("Failed to query leads")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .db_context("Failed to fetch leads")?;

        Ok(leads)
    }

    /// Moves a lead to a new pipeline stage and logs a `status_change`
    /// activity. Returns `None` if the lead does not exist.
    pub fn update_lead_status(&mut self, lead_id: u64, status: LeadStatus) -> Result<Option<Lead>> {
        let tx = self
            .connection
            .transaction()
            .db_context("Failed to begin transaction")?;

        let current: Option<String> = tx
            .query_row(SELECT_LEAD_STATUS_SQL, params![lead_id as i64], |row| {
                row.get(0)
            })
            .optional()
            .db_context("Failed to query lead status")?;

        let Some(current) = current else {
            return Ok(None);
        };

        if current != status.as_str() {
            let now_str = Timestamp::now().to_string();
            tx.execute(
                UPDATE_LEAD_STATUS_SQL,
                params![status.as_str(), &now_str, lead_id as i64],
            )
            .db_context("Failed to update lead status")?;

            content_queries::insert_activity(
                &tx,
                &NewActivity {
                    lead_id,
                    kind: "status_change".into(),
                    subject: Some(format!("Status changed from {current} to {status}")),
                    content: None,
                },
                &now_str,
            )?;
        }

        tx.commit().db_context("Failed to commit transaction")?;

        self.get_lead(lead_id)
    }

    /// Deletes a lead together with its sequences and content history.
    /// Returns whether a lead was removed.
    pub fn delete_lead(&mut self, lead_id: u64) -> Result<bool> {
        let removed = self
            .connection
            .execute(DELETE_LEAD_SQL, params![lead_id as i64])
            .db_context("Failed to delete lead")?;
        Ok(removed > 0)
    }
}
