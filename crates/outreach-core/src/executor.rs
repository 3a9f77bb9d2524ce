//! Step executor: runs one ready step through the generation capability and
//! records what it produced.

use std::{path::PathBuf, sync::Arc};

use jiff::Timestamp;
use log::{debug, warn};

use crate::{
    db::run_blocking,
    error::{OutreachError, Result},
    generation::{ContentGenerator, GenerationRequest},
    models::{
        Capability, ContentRecord, GeneratedContent, Lead, MessageFormat, NewActivity, NewMessage,
        Sequence, Step, StepResult, StepStatus,
    },
};

/// Dispatches steps to the generator by capability and commits the result.
pub struct StepExecutor {
    db_path: PathBuf,
    generator: Arc<dyn ContentGenerator>,
}

impl StepExecutor {
    pub fn new(db_path: PathBuf, generator: Arc<dyn ContentGenerator>) -> Self {
        Self { db_path, generator }
    }

    /// Executes `step` of `sequence` for `lead`.
    ///
    /// The generated record and the `ready → completed` transition are
    /// written in one transaction at `now`. On generation failure nothing is
    /// written and the step stays `ready`.
    pub async fn execute(
        &self,
        sequence: &Sequence,
        step: &Step,
        lead: &Lead,
        now: Timestamp,
    ) -> Result<StepResult> {
        Self::check_preconditions(sequence, step, lead)?;

        let capability = step.step_type.capability();
        debug!(
            "Executing step {} ({}) of sequence {} with {} generator",
            step.step_number,
            step.step_type.as_str(),
            sequence.id,
            self.generator.name()
        );

        let (result, record) = match capability.message_format() {
            Some(format) => {
                let lead_id = lead.id;
                let context =
                    run_blocking(self.db_path.clone(), move |db| db.lead_context(lead_id, now))
                        .await?;
                let request = GenerationRequest {
                    lead: lead.clone(),
                    format,
                    template_key: step.template_key.clone(),
                    context,
                };
                let content = self.generator.generate(&request).await.map_err(|e| {
                    warn!("Generation failed for step {}: {e}", step.id);
                    OutreachError::from(e)
                })?;
                let (content, record) = message_record(lead, format, &step.template_key, content);
                (StepResult::Message(content), record)
            }
            None => {
                debug_assert_eq!(capability, Capability::Research);
                let findings = self.generator.research(lead).await.map_err(|e| {
                    warn!("Research failed for step {}: {e}", step.id);
                    OutreachError::from(e)
                })?;
                let record = ContentRecord::Research {
                    lead_id: lead.id,
                    findings: findings.clone(),
                };
                (StepResult::Research(findings), record)
            }
        };

        let step_id = step.id;
        let payload = result.clone();
        run_blocking(self.db_path.clone(), move |db| {
            db.complete_step(step_id, &record, &payload, now)
        })
        .await?;

        Ok(result)
    }

    fn check_preconditions(sequence: &Sequence, step: &Step, lead: &Lead) -> Result<()> {
        if step.status != StepStatus::Ready {
            return Err(OutreachError::invalid_state(format!(
                "Step {} is {}, not ready",
                step.id, step.status
            )));
        }
        if step.sequence_id != sequence.id {
            return Err(OutreachError::invalid_state(format!(
                "Step {} does not belong to sequence {}",
                step.id, sequence.id
            )));
        }
        if sequence.lead_id != lead.id {
            return Err(OutreachError::invalid_state(format!(
                "Sequence {} does not target lead {}",
                sequence.id, lead.id
            )));
        }
        Ok(())
    }
}

/// Builds the stored message, plus the outreach activity for emails.
fn message_record(
    lead: &Lead,
    format: MessageFormat,
    template_key: &str,
    mut content: GeneratedContent,
) -> (GeneratedContent, ContentRecord) {
    let (subject, generation_note, activity) = match format {
        MessageFormat::Email => {
            let subject = content
                .subject
                .clone()
                .unwrap_or_else(|| format!("Following up on {}", lead.company_or_default()));
            content.subject = Some(subject.clone());
            let activity = NewActivity {
                lead_id: lead.id,
                kind: "email".into(),
                subject: Some(format!("Outreach: {subject}")),
                content: Some(content.content.clone()),
            };
            (
                subject,
                format!("Generated {template_key} message"),
                Some(activity),
            )
        }
        MessageFormat::LinkedIn => (
            "LinkedIn Connection Request".to_string(),
            format!("Generated {template_key} LinkedIn message"),
            None,
        ),
        MessageFormat::CallScript => (
            "Call Script".to_string(),
            format!("Generated {template_key} call script"),
            None,
        ),
    };

    let message = NewMessage {
        lead_id: lead.id,
        kind: format,
        subject: Some(subject),
        content: content.content.clone(),
        personalization_notes: content.personalization_notes.clone(),
        generation_note,
    };

    (content, ContentRecord::Message { message, activity })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LeadStatus;

    fn lead() -> Lead {
        Lead {
            id: 7,
            email: "grace@navy.mil".into(),
            first_name: Some("Grace".into()),
            last_name: Some("Hopper".into()),
            company: Some("Navy".into()),
            title: None,
            industry: None,
            company_size: None,
            linkedin_url: None,
            website: None,
            status: LeadStatus::New,
            created_at: Timestamp::UNIX_EPOCH,
            updated_at: Timestamp::UNIX_EPOCH,
        }
    }

    fn generated(subject: Option<&str>) -> GeneratedContent {
        GeneratedContent {
            subject: subject.map(String::from),
            content: "Hello".into(),
            personalization_notes: vec!["note".into()],
            ..Default::default()
        }
    }

    #[test]
    fn test_email_record_logs_outreach_activity() {
        let (content, record) = message_record(
            &lead(),
            MessageFormat::Email,
            "initial_outreach",
            generated(Some("Hi")),
        );
        assert_eq!(content.subject.as_deref(), Some("Hi"));
        match record {
            ContentRecord::Message { message, activity } => {
                assert_eq!(message.kind, MessageFormat::Email);
                assert_eq!(message.generation_note, "Generated initial_outreach message");
                let activity = activity.expect("email logs an activity");
                assert_eq!(activity.subject.as_deref(), Some("Outreach: Hi"));
            }
            other => panic!("unexpected record: {other:?}"),
        }
    }

    #[test]
    fn test_email_without_subject_gets_fallback() {
        let (content, _) =
            message_record(&lead(), MessageFormat::Email, "follow_up_1", generated(None));
        assert_eq!(content.subject.as_deref(), Some("Following up on Navy"));
    }

    #[test]
    fn test_linkedin_and_call_records_have_fixed_subjects() {
        for (format, subject) in [
            (MessageFormat::LinkedIn, "LinkedIn Connection Request"),
            (MessageFormat::CallScript, "Call Script"),
        ] {
            let (_, record) = message_record(&lead(), format, "t", generated(None));
            match record {
                ContentRecord::Message { message, activity } => {
                    assert_eq!(message.subject.as_deref(), Some(subject));
                    assert_eq!(message.kind, format);
                    assert!(activity.is_none());
                }
                other => panic!("unexpected record: {other:?}"),
            }
        }
    }
}
