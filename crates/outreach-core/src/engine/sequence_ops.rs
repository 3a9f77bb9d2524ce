//! Sequence operations for the SequenceEngine.

use log::{debug, info, warn};

use super::SequenceEngine;
use crate::{
    catalog,
    db::run_blocking,
    display::SequenceSummaries,
    error::{OutreachError, Result},
    models::{
        CreatedSequence, ExecutionOutcome, Lead, Sequence, SequenceAnalytics, SequenceStatus,
        Step, StepStatus,
    },
    params::{CreateSequence, Id, ListSequences},
};

/// What the controller found at the sequence's current position.
enum Position {
    Ready {
        sequence: Sequence,
        step: Step,
        lead: Lead,
    },
    Waiting,
    Finished,
}

impl SequenceEngine {
    /// Creates a sequence for a lead from the template catalog.
    ///
    /// The sequence type defaults to `standard`; unknown types are rejected.
    pub async fn create_outreach_sequence(
        &self,
        params: &CreateSequence,
    ) -> Result<CreatedSequence> {
        let sequence_type = catalog::resolve(params.sequence_type.as_deref())?;
        let lead_id = params.lead_id;
        let now = self.clock.now();

        let created = run_blocking(self.db_path.clone(), move |db| {
            db.create_sequence_with_steps(lead_id, sequence_type, now)
        })
        .await?;

        info!(
            "Created {} sequence {} for lead {lead_id} with {} steps",
            sequence_type.as_str(),
            created.sequence_id,
            created.total_steps
        );
        Ok(created)
    }

    /// Runs the step at the sequence's current position if it is ready.
    ///
    /// A pending step whose scheduled time has passed is activated first.
    /// Completing the step advances the sequence in the same transaction.
    /// When no step is ready and none remain pending, the sequence is marked
    /// completed.
    pub async fn execute_next_step(&self, params: &Id) -> Result<ExecutionOutcome> {
        let sequence_id = params.id;
        let _guard = self.locks.acquire(sequence_id).await;
        let now = self.clock.now();

        let position = run_blocking(self.db_path.clone(), move |db| {
            let sequence = db
                .get_sequence(sequence_id)?
                .ok_or(OutreachError::SequenceNotFound { id: sequence_id })?;
            if sequence.status != SequenceStatus::Active {
                return Err(OutreachError::invalid_state(format!(
                    "Sequence {sequence_id} is {}",
                    sequence.status
                )));
            }

            if db.activate_step(sequence_id, sequence.current_step, now)? {
                debug!(
                    "Activated step {} of sequence {sequence_id}",
                    sequence.current_step
                );
            }

            if let Some(step) = db.get_ready_step(sequence_id, sequence.current_step)? {
                let lead = db
                    .get_lead(sequence.lead_id)?
                    .ok_or(OutreachError::LeadNotFound {
                        id: sequence.lead_id,
                    })?;
                return Ok(Position::Ready {
                    sequence,
                    step,
                    lead,
                });
            }

            let remaining =
                db.count_steps_by_status(sequence_id, &[StepStatus::Pending, StepStatus::Ready])?;
            if remaining > 0 {
                return Ok(Position::Waiting);
            }

            match db.complete_sequence(sequence_id, now) {
                Ok(()) | Err(OutreachError::Conflict { .. }) => Ok(Position::Finished),
                Err(e) => Err(e),
            }
        })
        .await?;

        let (sequence, step, lead) = match position {
            Position::Ready {
                sequence,
                step,
                lead,
            } => (sequence, step, lead),
            Position::Waiting => return Ok(ExecutionOutcome::NoReadySteps),
            Position::Finished => {
                info!("Sequence {sequence_id} completed");
                return Ok(ExecutionOutcome::SequenceCompleted);
            }
        };

        let result = match self.executor.execute(&sequence, &step, &lead, now).await {
            Ok(result) => result,
            Err(OutreachError::GenerationFailed { message }) => {
                warn!(
                    "Step {} of sequence {sequence_id} failed: {message}",
                    step.step_number
                );
                return Ok(ExecutionOutcome::StepFailed {
                    step_number: step.step_number,
                    error: message,
                });
            }
            Err(OutreachError::Conflict { message }) => {
                warn!("Lost race on sequence {sequence_id}: {message}");
                return Ok(ExecutionOutcome::NoReadySteps);
            }
            Err(e) => return Err(e),
        };

        info!(
            "Completed step {} ({}) of sequence {sequence_id}",
            step.step_number,
            step.step_type.as_str()
        );

        Ok(ExecutionOutcome::StepCompleted {
            step_number: step.step_number,
            step_type: step.step_type,
            result,
        })
    }

    /// Retrieves a sequence with its steps.
    pub async fn get_sequence(&self, params: &Id) -> Result<Option<Sequence>> {
        let sequence_id = params.id;
        run_blocking(self.db_path.clone(), move |db| {
            db.get_sequence_with_steps(sequence_id)
        })
        .await
    }

    /// Lists sequences with lead names and step progress.
    pub async fn list_sequences(&self, params: &ListSequences) -> Result<SequenceSummaries> {
        let status = params.status_filter()?;
        let summaries = run_blocking(self.db_path.clone(), move |db| {
            db.list_sequences(status, None)
        })
        .await?;
        Ok(SequenceSummaries(summaries))
    }

    /// Sequences targeting one lead, newest first.
    pub async fn lead_sequences(&self, params: &Id) -> Result<SequenceSummaries> {
        let lead_id = params.id;
        let summaries = run_blocking(self.db_path.clone(), move |db| {
            db.list_sequences(None, Some(lead_id))
        })
        .await?;
        Ok(SequenceSummaries(summaries))
    }

    /// Counts of total, active and completed sequences and the conversion
    /// rate of completed ones.
    pub async fn get_sequence_analytics(&self) -> Result<SequenceAnalytics> {
        run_blocking(self.db_path.clone(), |db| db.sequence_analytics()).await
    }
}
