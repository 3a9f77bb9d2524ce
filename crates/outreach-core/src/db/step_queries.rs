//! Step queries and the two step transitions: activation and completion.

use jiff::Timestamp;
use log::debug;
use rusqlite::{params, Connection, OptionalExtension};

use super::{
    content_queries, json_at, millis_at, optional_timestamp_at, parsed_at, sequence_queries,
};
use crate::{
    error::{DatabaseResultExt, OutreachError, Result},
    models::{ContentRecord, Step, StepKind, StepResult, StepStatus},
};

const STEP_COLUMNS: &str = "id, sequence_id, step_number, step_type, template_key, status, scheduled_at, completed_at, result";
const INSERT_STEP_SQL: &str = "INSERT INTO sequence_steps (sequence_id, step_number, step_type, template_key, status, scheduled_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6)";
const CHECK_STEP_EXISTS_SQL: &str = "SELECT EXISTS(SELECT 1 FROM sequence_steps WHERE id = ?1)";
const COMPLETE_STEP_SQL: &str = "UPDATE sequence_steps SET status = 'completed', completed_at = ?1, result = ?2 WHERE id = ?3 AND status = 'ready'";
const ACTIVATE_STEP_SQL: &str = "UPDATE sequence_steps SET status = 'ready' WHERE sequence_id = ?1 AND step_number = ?2 AND status = 'pending' AND scheduled_at <= ?3";
const ADVANCE_PAST_STEP_SQL: &str = "UPDATE sequences SET current_step = current_step + 1 \
     WHERE status = 'active' AND current_step < total_steps \
     AND (id, current_step) = (SELECT sequence_id, step_number FROM sequence_steps WHERE id = ?1)";
const ACTIVATE_FOLLOWING_STEP_SQL: &str = "UPDATE sequence_steps SET status = 'ready' \
     WHERE status = 'pending' AND scheduled_at <= ?2 \
     AND (sequence_id, step_number) = (SELECT sequence_id, step_number + 1 FROM sequence_steps WHERE id = ?1)";
const COUNT_STEPS_BY_STATUS_SQL: &str =
    "SELECT status, COUNT(*) FROM sequence_steps WHERE sequence_id = ?1 GROUP BY status";

pub(crate) fn insert_step(
    conn: &Connection,
    sequence_id: u64,
    step_number: u32,
    step_type: StepKind,
    template_key: &str,
    status: StepStatus,
    scheduled_at: Timestamp,
) -> Result<u64> {
    conn.execute(
        INSERT_STEP_SQL,
        params![
            sequence_id as i64,
            i64::from(step_number),
            step_type.as_str(),
            template_key,
            status.as_str(),
            scheduled_at.as_millisecond()
        ],
    )
    .db_context("Failed to insert step")?;
    Ok(conn.last_insert_rowid() as u64)
}

impl super::Database {
    /// Helper function to construct a Step from a database row
    fn build_step_from_row(row: &rusqlite::Row) -> rusqlite::Result<Step> {
        Ok(Step {
            id: row.get::<_, i64>(0)? as u64,
            sequence_id: row.get::<_, i64>(1)? as u64,
            step_number: row.get::<_, i64>(2)? as u32,
            step_type: parsed_at(row, 3)?,
            template_key: row.get(4)?,
            status: parsed_at(row, 5)?,
            scheduled_at: millis_at(row, 6)?,
            completed_at: optional_timestamp_at(row, 7)?,
            result: json_at(row, 8)?,
        })
    }

    /// Retrieves a step by ID.
    pub fn get_step(&self, step_id: u64) -> Result<Option<Step>> {
        let sql = format!("SELECT {STEP_COLUMNS} FROM sequence_steps WHERE id = ?1");
        self.connection
            .query_row(&sql, params![step_id as i64], Self::build_step_from_row)
            .optional()
            .db_context("Failed to get step")
    }

    /// All steps of a sequence ordered by step number.
    pub fn get_sequence_steps(&self, sequence_id: u64) -> Result<Vec<Step>> {
        let sql = format!(
            "SELECT {STEP_COLUMNS} FROM sequence_steps WHERE sequence_id = ?1 ORDER BY step_number"
        );
        let mut stmt = self
            .connection
            .prepare(&sql)
            .db_context("Failed to prepare query")?;

        let steps = stmt
            .query_map(params![sequence_id as i64], Self::build_step_from_row)
            .db_context("Failed to query steps")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .db_context("Failed to fetch steps")?;

        Ok(steps)
    }

    /// The step at `step_number` if its status is exactly `ready`.
    pub fn get_ready_step(&self, sequence_id: u64, step_number: u32) -> Result<Option<Step>> {
        let sql = format!(
            "SELECT {STEP_COLUMNS} FROM sequence_steps WHERE sequence_id = ?1 AND step_number = ?2 AND status = 'ready'"
        );
        self.connection
            .query_row(
                &sql,
                params![sequence_id as i64, i64::from(step_number)],
                Self::build_step_from_row,
            )
            .optional()
            .db_context("Failed to get ready step")
    }

    /// Number of the sequence's steps whose status is one of `statuses`.
    pub fn count_steps_by_status(&self, sequence_id: u64, statuses: &[StepStatus]) -> Result<u32> {
        let mut stmt = self
            .connection
            .prepare(COUNT_STEPS_BY_STATUS_SQL)
            .db_context("Failed to prepare query")?;

        let counts = stmt
            .query_map(params![sequence_id as i64], |row| {
                Ok((parsed_at::<StepStatus>(row, 0)?, row.get::<_, i64>(1)?))
            })
            .db_context("Failed to count steps")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .db_context("Failed to fetch step counts")?;

        Ok(counts
            .into_iter()
            .filter(|(status, _)| statuses.contains(status))
            .map(|(_, count)| count as u32)
            .sum())
    }

    /// Completes a ready step, persists its content record and moves the
    /// sequence past it, all in one transaction.
    ///
    /// The `ready → completed` update is conditional: if another writer got
    /// there first the call fails with `Conflict` and nothing is written.
    /// The sequence only advances while its `current_step` is this step and
    /// a later step exists; the last step leaves `current_step` in place.
    /// The following step becomes `ready` at once if it is already due.
    pub fn complete_step(
        &mut self,
        step_id: u64,
        record: &ContentRecord,
        result: &StepResult,
        completed_at: Timestamp,
    ) -> Result<()> {
        let tx = self
            .connection
            .transaction()
            .db_context("Failed to begin transaction")?;

        let now_str = completed_at.to_string();
        let payload = serde_json::to_string(result)?;

        let updated = tx
            .execute(COMPLETE_STEP_SQL, params![&now_str, payload, step_id as i64])
            .db_context("Failed to complete step")?;

        if updated == 0 {
            let exists: bool = tx
                .query_row(CHECK_STEP_EXISTS_SQL, params![step_id as i64], |row| {
                    row.get(0)
                })
                .db_context("Failed to check step existence")?;
            return Err(if exists {
                OutreachError::conflict(format!("Step {step_id} is no longer ready"))
            } else {
                OutreachError::StepNotFound { id: step_id }
            });
        }

        content_queries::insert_record(&tx, record, &now_str)?;

        let advanced = tx
            .execute(ADVANCE_PAST_STEP_SQL, params![step_id as i64])
            .db_context("Failed to advance sequence")?;
        let activated = if advanced > 0 {
            tx.execute(
                ACTIVATE_FOLLOWING_STEP_SQL,
                params![step_id as i64, completed_at.as_millisecond()],
            )
            .db_context("Failed to activate next step")?
        } else {
            0
        };

        tx.commit().db_context("Failed to commit transaction")?;
        debug!("Completed step {step_id} (advanced: {advanced}, activated: {activated})");
        Ok(())
    }

    /// Promotes a pending step to `ready` once its scheduled time has been
    /// reached by `not_before`.
    ///
    /// Returns whether the step changed. Steps that are already ready or
    /// completed, not yet due, or absent are left alone.
    pub fn activate_step(
        &mut self,
        sequence_id: u64,
        step_number: u32,
        not_before: Timestamp,
    ) -> Result<bool> {
        let updated = self
            .connection
            .execute(
                ACTIVATE_STEP_SQL,
                params![
                    sequence_id as i64,
                    i64::from(step_number),
                    not_before.as_millisecond()
                ],
            )
            .db_context("Failed to activate step")?;

        if updated == 0 && !sequence_queries::sequence_exists(&self.connection, sequence_id)? {
            return Err(OutreachError::SequenceNotFound { id: sequence_id });
        }
        Ok(updated > 0)
    }
}
