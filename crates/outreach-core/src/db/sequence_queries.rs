//! Sequence CRUD operations, state transitions and analytics queries.

use jiff::Timestamp;
use rusqlite::{params, Connection, OptionalExtension};

use super::{optional_timestamp_at, parsed_at, step_queries, timestamp_at};
use crate::{
    error::{DatabaseResultExt, OutreachError, Result},
    models::{
        CreatedSequence, LeadStatus, Sequence, SequenceAnalytics, SequenceStatus, SequenceSummary,
        SequenceType,
    },
};

const CHECK_LEAD_EXISTS_SQL: &str = "SELECT EXISTS(SELECT 1 FROM leads WHERE id = ?1)";
const CHECK_SEQUENCE_EXISTS_SQL: &str = "SELECT EXISTS(SELECT 1 FROM sequences WHERE id = ?1)";
const INSERT_SEQUENCE_SQL: &str = "INSERT INTO sequences (lead_id, sequence_type, status, current_step, total_steps, created_at) VALUES (?1, ?2, ?3, 1, ?4, ?5)";
const SELECT_SEQUENCE_SQL: &str = "SELECT id, lead_id, sequence_type, status, current_step, total_steps, created_at, completed_at FROM sequences WHERE id = ?1";
const ADVANCE_SEQUENCE_SQL: &str = "UPDATE sequences SET current_step = ?1 WHERE id = ?2 AND current_step = ?3 AND status = 'active'";
const COMPLETE_SEQUENCE_SQL: &str = "UPDATE sequences SET status = 'completed', completed_at = ?1 WHERE id = ?2 AND status = 'active'";
const LIST_SEQUENCES_SQL: &str = "SELECT s.id, s.lead_id, l.first_name, l.last_name, l.email, l.company, s.sequence_type, s.status, s.current_step, s.total_steps, \
     (SELECT COUNT(*) FROM sequence_steps st WHERE st.sequence_id = s.id AND st.status = 'completed'), s.created_at \
     FROM sequences s JOIN leads l ON l.id = s.lead_id \
     WHERE (?1 IS NULL OR s.status = ?1) AND (?2 IS NULL OR s.lead_id = ?2) \
     ORDER BY s.created_at DESC, s.id DESC";
const SEQUENCE_ANALYTICS_SQL: &str = "SELECT COUNT(*), \
     COALESCE(SUM(CASE WHEN s.status = 'active' THEN 1 ELSE 0 END), 0), \
     COALESCE(SUM(CASE WHEN s.status = 'completed' THEN 1 ELSE 0 END), 0), \
     COALESCE(SUM(CASE WHEN s.status = 'completed' AND l.status IN (?1, ?2, ?3) THEN 1 ELSE 0 END), 0) \
     FROM sequences s JOIN leads l ON l.id = s.lead_id";

pub(crate) fn insert_sequence(
    conn: &Connection,
    lead_id: u64,
    sequence_type: SequenceType,
    total_steps: u32,
    now: &str,
) -> Result<u64> {
    conn.execute(
        INSERT_SEQUENCE_SQL,
        params![
            lead_id as i64,
            sequence_type.as_str(),
            SequenceStatus::Active.as_str(),
            i64::from(total_steps),
            now
        ],
    )
    .db_context("Failed to insert sequence")?;
    Ok(conn.last_insert_rowid() as u64)
}

pub(crate) fn sequence_exists(conn: &Connection, sequence_id: u64) -> Result<bool> {
    conn.query_row(
        CHECK_SEQUENCE_EXISTS_SQL,
        params![sequence_id as i64],
        |row| row.get(0),
    )
    .db_context("Failed to check sequence existence")
}

/// Maps a compare-and-set that touched no rows onto the matching error.
fn missing_or_conflict(
    conn: &Connection,
    sequence_id: u64,
    conflict: impl FnOnce() -> String,
) -> OutreachError {
    match sequence_exists(conn, sequence_id) {
        Ok(true) => OutreachError::conflict(conflict()),
        Ok(false) => OutreachError::SequenceNotFound { id: sequence_id },
        Err(e) => e,
    }
}

impl super::Database {
    /// Helper function to construct a Sequence from a database row
    fn build_sequence_from_row(row: &rusqlite::Row) -> rusqlite::Result<Sequence> {
        Ok(Sequence {
            id: row.get::<_, i64>(0)? as u64,
            lead_id: row.get::<_, i64>(1)? as u64,
            sequence_type: parsed_at(row, 2)?,
            status: parsed_at(row, 3)?,
            current_step: row.get::<_, i64>(4)? as u32,
            total_steps: row.get::<_, i64>(5)? as u32,
            created_at: timestamp_at(row, 6)?,
            completed_at: optional_timestamp_at(row, 7)?,
            steps: Vec::new(),
        })
    }

    fn build_summary_from_row(row: &rusqlite::Row) -> rusqlite::Result<SequenceSummary> {
        let first: Option<String> = row.get(2)?;
        let last: Option<String> = row.get(3)?;
        let email: String = row.get(4)?;
        let lead_name = match (first, last) {
            (Some(first), Some(last)) => format!("{first} {last}"),
            (Some(name), None) | (None, Some(name)) => name,
            (None, None) => email,
        };

        Ok(SequenceSummary {
            id: row.get::<_, i64>(0)? as u64,
            lead_id: row.get::<_, i64>(1)? as u64,
            lead_name,
            company: row.get(5)?,
            sequence_type: parsed_at(row, 6)?,
            status: parsed_at(row, 7)?,
            current_step: row.get::<_, i64>(8)? as u32,
            total_steps: row.get::<_, i64>(9)? as u32,
            completed_steps: row.get::<_, i64>(10)? as u32,
            created_at: timestamp_at(row, 11)?,
        })
    }

    /// Creates a sequence and all of its catalog steps in one transaction.
    ///
    /// Step 1 starts `ready`; the rest start `pending` and are scheduled
    /// `delay_days` after `now`.
    pub fn create_sequence_with_steps(
        &mut self,
        lead_id: u64,
        sequence_type: SequenceType,
        now: Timestamp,
    ) -> Result<CreatedSequence> {
        let tx = self
            .connection
            .transaction()
            .db_context("Failed to begin transaction")?;

        let lead_exists: bool = tx
            .query_row(CHECK_LEAD_EXISTS_SQL, params![lead_id as i64], |row| {
                row.get(0)
            })
            .db_context("Failed to check lead existence")?;
        if !lead_exists {
            return Err(OutreachError::LeadNotFound { id: lead_id });
        }

        let now_str = now.to_string();
        let total_steps = sequence_type.total_steps();
        let sequence_id = insert_sequence(&tx, lead_id, sequence_type, total_steps, &now_str)?;

        for blueprint in sequence_type.blueprints() {
            step_queries::insert_step(
                &tx,
                sequence_id,
                blueprint.step_number,
                blueprint.step_type,
                blueprint.template_key,
                blueprint.initial_status(),
                blueprint.scheduled_at(now)?,
            )?;
        }

        tx.commit().db_context("Failed to commit transaction")?;

        Ok(CreatedSequence {
            sequence_id,
            total_steps,
        })
    }

    /// Retrieves a sequence by ID without its steps.
    pub fn get_sequence(&self, sequence_id: u64) -> Result<Option<Sequence>> {
        self.connection
            .query_row(
                SELECT_SEQUENCE_SQL,
                params![sequence_id as i64],
                Self::build_sequence_from_row,
            )
            .optional()
            .db_context("Failed to get sequence")
    }

    /// Retrieves a sequence by ID with its steps loaded in order.
    pub fn get_sequence_with_steps(&self, sequence_id: u64) -> Result<Option<Sequence>> {
        let Some(mut sequence) = self.get_sequence(sequence_id)? else {
            return Ok(None);
        };
        sequence.steps = self.get_sequence_steps(sequence_id)?;
        Ok(Some(sequence))
    }

    /// Moves `current_step` from `expected` to `next` on an active sequence.
    ///
    /// Fails with `Conflict` when another writer moved it first.
    pub fn advance_sequence(&mut self, sequence_id: u64, expected: u32, next: u32) -> Result<()> {
        let updated = self
            .connection
            .execute(
                ADVANCE_SEQUENCE_SQL,
                params![i64::from(next), sequence_id as i64, i64::from(expected)],
            )
            .db_context("Failed to advance sequence")?;

        if updated == 0 {
            return Err(missing_or_conflict(&self.connection, sequence_id, || {
                format!("Sequence {sequence_id} is no longer active at step {expected}")
            }));
        }
        Ok(())
    }

    /// Marks an active sequence completed.
    pub fn complete_sequence(&mut self, sequence_id: u64, completed_at: Timestamp) -> Result<()> {
        let updated = self
            .connection
            .execute(
                COMPLETE_SEQUENCE_SQL,
                params![completed_at.to_string(), sequence_id as i64],
            )
            .db_context("Failed to complete sequence")?;

        if updated == 0 {
            return Err(missing_or_conflict(&self.connection, sequence_id, || {
                format!("Sequence {sequence_id} is already completed")
            }));
        }
        Ok(())
    }

    /// Lists sequences, newest first, with lead names and progress.
    pub fn list_sequences(
        &self,
        status: Option<SequenceStatus>,
        lead_id: Option<u64>,
    ) -> Result<Vec<SequenceSummary>> {
        let mut stmt = self
            .connection
            .prepare(LIST_SEQUENCES_SQL)
            .db_context("Failed to prepare query")?;

        let summaries = stmt
            .query_map(
                params![status.map(|s| s.as_str()), lead_id.map(|id| id as i64)],
                Self::build_summary_from_row,
            )
            .db_context("Failed to query sequences")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .db_context("Failed to fetch sequences")?;

        Ok(summaries)
    }

    /// Counts sequences by status and the conversion rate of completed ones.
    ///
    /// Every count comes from one statement so they agree with each other.
    pub fn sequence_analytics(&self) -> Result<SequenceAnalytics> {
        let [a, b, c] = LeadStatus::CONVERTED;
        let (total, active, completed, converted): (i64, i64, i64, i64) = self
            .connection
            .query_row(
                SEQUENCE_ANALYTICS_SQL,
                params![a.as_str(), b.as_str(), c.as_str()],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
            )
            .db_context("Failed to compute sequence analytics")?;

        Ok(SequenceAnalytics {
            total_sequences: total as u64,
            active_sequences: active as u64,
            completed_sequences: completed as u64,
            conversion_rate: SequenceAnalytics::conversion_rate(
                converted as u64,
                completed as u64,
            ),
        })
    }
}
