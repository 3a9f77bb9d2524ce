//! Content and activity store: messages, activity log and lead research.

use jiff::Timestamp;
use rusqlite::{params, Connection, OptionalExtension};

use super::{json_at, optional_timestamp_at, parsed_at, timestamp_at};
use crate::{
    error::{DatabaseResultExt, Result},
    models::{
        Activity, ContentRecord, EngagementLevel, GenerationContext, Message, NewActivity,
        NewMessage, PreviousInteractions, ResearchFindings,
    },
};

const INSERT_MESSAGE_SQL: &str = "INSERT INTO messages (lead_id, kind, subject, content, personalization_notes, generation_note, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)";
const INSERT_ACTIVITY_SQL: &str = "INSERT INTO activities (lead_id, kind, subject, content, status, completed_at, created_at) VALUES (?1, ?2, ?3, ?4, 'completed', ?5, ?5)";
const INSERT_RESEARCH_SQL: &str = "INSERT INTO lead_research (lead_id, research_data, pain_points, decision_process, outreach_strategy, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6)";
const SELECT_MESSAGES_SQL: &str = "SELECT id, lead_id, kind, subject, content, personalization_notes, generation_note, created_at FROM messages WHERE lead_id = ?1 ORDER BY id DESC LIMIT ?2";
const SELECT_ACTIVITIES_SQL: &str = "SELECT id, lead_id, kind, subject, content, status, completed_at, created_at FROM activities WHERE lead_id = ?1 ORDER BY id DESC LIMIT ?2";
const SELECT_LATEST_RESEARCH_SQL: &str =
    "SELECT research_data FROM lead_research WHERE lead_id = ?1 ORDER BY id DESC LIMIT 1";
const COUNT_MESSAGES_SQL: &str = "SELECT COUNT(*) FROM messages WHERE lead_id = ?1";
const COUNT_STATUS_CHANGES_SQL: &str =
    "SELECT COUNT(*) FROM activities WHERE lead_id = ?1 AND kind = 'status_change'";

/// Number of recent messages and activities consulted when building a
/// generation context.
const CONTEXT_WINDOW: u32 = 5;

pub(crate) fn insert_message(conn: &Connection, message: &NewMessage, now: &str) -> Result<u64> {
    let notes = serde_json::to_string(&message.personalization_notes)?;
    conn.execute(
        INSERT_MESSAGE_SQL,
        params![
            message.lead_id as i64,
            message.kind.as_str(),
            message.subject,
            message.content,
            notes,
            message.generation_note,
            now
        ],
    )
    .db_context("Failed to insert message")?;
    Ok(conn.last_insert_rowid() as u64)
}

pub(crate) fn insert_activity(conn: &Connection, activity: &NewActivity, now: &str) -> Result<u64> {
    conn.execute(
        INSERT_ACTIVITY_SQL,
        params![
            activity.lead_id as i64,
            activity.kind,
            activity.subject,
            activity.content,
            now
        ],
    )
    .db_context("Failed to insert activity")?;
    Ok(conn.last_insert_rowid() as u64)
}

pub(crate) fn insert_research(
    conn: &Connection,
    lead_id: u64,
    findings: &ResearchFindings,
    now: &str,
) -> Result<u64> {
    conn.execute(
        INSERT_RESEARCH_SQL,
        params![
            lead_id as i64,
            serde_json::to_string(findings)?,
            serde_json::to_string(&findings.pain_points)?,
            serde_json::to_string(&findings.decision_process)?,
            serde_json::to_string(&findings.outreach_strategy)?,
            now
        ],
    )
    .db_context("Failed to insert research")?;
    Ok(conn.last_insert_rowid() as u64)
}

/// Writes every row a content record consists of.
pub(crate) fn insert_record(conn: &Connection, record: &ContentRecord, now: &str) -> Result<()> {
    match record {
        ContentRecord::Message { message, activity } => {
            insert_message(conn, message, now)?;
            if let Some(activity) = activity {
                insert_activity(conn, activity, now)?;
            }
        }
        ContentRecord::Research { lead_id, findings } => {
            insert_research(conn, *lead_id, findings, now)?;
        }
    }
    Ok(())
}

impl super::Database {
    fn build_message_from_row(row: &rusqlite::Row) -> rusqlite::Result<Message> {
        Ok(Message {
            id: row.get::<_, i64>(0)? as u64,
            lead_id: row.get::<_, i64>(1)? as u64,
            kind: parsed_at(row, 2)?,
            subject: row.get(3)?,
            content: row.get(4)?,
            personalization_notes: json_at(row, 5)?.unwrap_or_default(),
            generation_note: row.get(6)?,
            created_at: timestamp_at(row, 7)?,
        })
    }

    fn build_activity_from_row(row: &rusqlite::Row) -> rusqlite::Result<Activity> {
        Ok(Activity {
            id: row.get::<_, i64>(0)? as u64,
            lead_id: row.get::<_, i64>(1)? as u64,
            kind: row.get(2)?,
            subject: row.get(3)?,
            content: row.get(4)?,
            status: row.get(5)?,
            completed_at: optional_timestamp_at(row, 6)?,
            created_at: timestamp_at(row, 7)?,
        })
    }

    /// Stores a generated message for a lead.
    pub fn record_message(&mut self, message: &NewMessage) -> Result<u64> {
        insert_message(&self.connection, message, &Timestamp::now().to_string())
    }

    /// Appends an entry to a lead's activity log.
    pub fn record_activity(&mut self, activity: &NewActivity) -> Result<u64> {
        insert_activity(&self.connection, activity, &Timestamp::now().to_string())
    }

    /// Stores research findings for a lead.
    pub fn record_research(&mut self, lead_id: u64, findings: &ResearchFindings) -> Result<u64> {
        insert_research(
            &self.connection,
            lead_id,
            findings,
            &Timestamp::now().to_string(),
        )
    }

    /// Most recent messages for a lead, newest first.
    pub fn list_messages(&self, lead_id: u64, limit: u32) -> Result<Vec<Message>> {
        let mut stmt = self
            .connection
            .prepare(SELECT_MESSAGES_SQL)
            .db_context("Failed to prepare query")?;
        let messages = stmt
            .query_map(
                params![lead_id as i64, i64::from(limit)],
                Self::build_message_from_row,
            )
            .db_context("Failed to query messages")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .db_context("Failed to fetch messages")?;
        Ok(messages)
    }

    /// Most recent activity-log entries for a lead, newest first.
    pub fn list_activities(&self, lead_id: u64, limit: u32) -> Result<Vec<Activity>> {
        let mut stmt = self
            .connection
            .prepare(SELECT_ACTIVITIES_SQL)
            .db_context("Failed to prepare query")?;
        let activities = stmt
            .query_map(
                params![lead_id as i64, i64::from(limit)],
                Self::build_activity_from_row,
            )
            .db_context("Failed to query activities")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .db_context("Failed to fetch activities")?;
        Ok(activities)
    }

    /// Latest research findings recorded for a lead.
    pub fn latest_research(&self, lead_id: u64) -> Result<Option<ResearchFindings>> {
        let findings = self
            .connection
            .query_row(SELECT_LATEST_RESEARCH_SQL, params![lead_id as i64], |row| {
                json_at::<ResearchFindings>(row, 0)
            })
            .optional()
            .db_context("Failed to get lead research")?;
        Ok(findings.flatten())
    }

    /// Builds the personalisation context for a lead from its history.
    pub fn lead_context(&self, lead_id: u64, now: Timestamp) -> Result<GenerationContext> {
        let messages = self.list_messages(lead_id, CONTEXT_WINDOW)?;
        let activities = self.list_activities(lead_id, CONTEXT_WINDOW)?;

        let message_count: i64 = self
            .connection
            .query_row(COUNT_MESSAGES_SQL, params![lead_id as i64], |row| row.get(0))
            .db_context("Failed to count messages")?;
        let status_changes: i64 = self
            .connection
            .query_row(COUNT_STATUS_CHANGES_SQL, params![lead_id as i64], |row| {
                row.get(0)
            })
            .db_context("Failed to count status changes")?;

        let engagement_level = EngagementLevel::from_interactions(
            messages
                .iter()
                .map(|m| m.created_at)
                .chain(activities.iter().map(|a| a.created_at)),
            now,
        );

        Ok(GenerationContext {
            previous_interactions: PreviousInteractions {
                messages: message_count as u32,
                last_message_at: messages.first().map(|m| m.created_at),
                last_activity: activities.first().map(|a| a.kind.clone()),
            },
            status_changes: status_changes as u32,
            engagement_level,
            research_insights: self.latest_research(lead_id)?,
        })
    }
}
