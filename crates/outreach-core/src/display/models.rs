//! Display implementations for domain models.
//!
//! Everything here renders markdown: headers for entities, bullet lists for
//! metadata and fenced blocks for generated text.

use std::fmt;

use super::datetime::LocalDateTime;
use crate::models::{
    ExecutionOutcome, GeneratedContent, Lead, LeadStatus, Message, MessageFormat,
    ResearchFindings, Sequence, SequenceAnalytics, SequenceStatus, SequenceSummary, SequenceType,
    Step, StepKind, StepResult, StepStatus,
};

macro_rules! display_as_str {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(self.as_str())
                }
            }
        )+
    };
}

display_as_str!(
    SequenceStatus,
    StepStatus,
    LeadStatus,
    SequenceType,
    StepKind,
    MessageFormat,
);

impl fmt::Display for Lead {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# {}. {}", self.id, self.display_name())?;
        writeln!(f)?;
        writeln!(f, "- Email: {}", self.email)?;
        writeln!(f, "- Status: {}", self.status)?;

        let optional = [
            ("Company", &self.company),
            ("Title", &self.title),
            ("Industry", &self.industry),
            ("Company size", &self.company_size),
            ("LinkedIn", &self.linkedin_url),
            ("Website", &self.website),
        ];
        for (label, value) in optional {
            if let Some(value) = value {
                writeln!(f, "- {label}: {value}")?;
            }
        }

        writeln!(f, "- Created: {}", LocalDateTime(&self.created_at))?;
        writeln!(f, "- Updated: {}", LocalDateTime(&self.updated_at))
    }
}

impl fmt::Display for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# Sequence {} ({})", self.id, self.sequence_type)?;
        writeln!(f)?;
        writeln!(f, "- Lead: {}", self.lead_id)?;
        writeln!(f, "- Status: {}", self.status)?;
        writeln!(
            f,
            "- Progress: step {} of {}",
            self.current_step, self.total_steps
        )?;
        writeln!(f, "- Created: {}", LocalDateTime(&self.created_at))?;
        if let Some(completed_at) = &self.completed_at {
            writeln!(f, "- Completed: {}", LocalDateTime(completed_at))?;
        }

        if !self.steps.is_empty() {
            writeln!(f, "\n## Steps")?;
            writeln!(f)?;
            for step in &self.steps {
                write!(f, "{step}")?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "### {}. {} ({})",
            self.step_number,
            self.step_type,
            self.status.with_icon()
        )?;
        writeln!(f)?;
        writeln!(f, "- Template: {}", self.template_key)?;
        writeln!(f, "- Scheduled: {}", LocalDateTime(&self.scheduled_at))?;
        if let Some(completed_at) = &self.completed_at {
            writeln!(f, "- Completed: {}", LocalDateTime(completed_at))?;
        }
        writeln!(f)?;

        if self.status == StepStatus::Completed {
            if let Some(result) = &self.result {
                match serde_json::from_value::<StepResult>(result.clone()) {
                    Ok(result) => write!(f, "{result}")?,
                    Err(_) => writeln!(f, "```json\n{result}\n```\n")?,
                }
            }
        }
        Ok(())
    }
}

impl fmt::Display for GeneratedContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(subject) = &self.subject {
            writeln!(f, "**Subject:** {subject}")?;
            writeln!(f)?;
        }
        writeln!(f, "```text\n{}\n```", self.content)?;
        if !self.personalization_notes.is_empty() {
            writeln!(f)?;
            writeln!(f, "Personalization:")?;
            for note in &self.personalization_notes {
                writeln!(f, "- {note}")?;
            }
        }
        writeln!(f)
    }
}

impl fmt::Display for ResearchFindings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sections = [
            ("Pain points", &self.pain_points),
            ("Company challenges", &self.company_challenges),
            ("Stakeholders", &self.decision_process.likely_stakeholders),
            ("Channels", &self.outreach_strategy.preferred_channels),
            ("Discovery questions", &self.discovery_questions),
        ];
        for (title, items) in sections {
            if items.is_empty() {
                continue;
            }
            writeln!(f, "**{title}:**")?;
            for item in items {
                writeln!(f, "- {item}")?;
            }
            writeln!(f)?;
        }
        if let Some(timeline) = &self.decision_process.typical_timeline {
            writeln!(f, "**Typical timeline:** {timeline}")?;
            writeln!(f)?;
        }
        Ok(())
    }
}

impl fmt::Display for StepResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepResult::Message(content) => write!(f, "{content}"),
            StepResult::Research(findings) => write!(f, "{findings}"),
        }
    }
}

impl fmt::Display for ExecutionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionOutcome::StepCompleted {
                step_number,
                step_type,
                result,
            } => {
                writeln!(f, "## Step {step_number} ({step_type}) completed")?;
                writeln!(f)?;
                write!(f, "{result}")
            }
            ExecutionOutcome::SequenceCompleted => {
                writeln!(f, "Sequence completed: every step has been executed.")
            }
            ExecutionOutcome::NoReadySteps => {
                writeln!(f, "No step is ready yet; the next one is still scheduled.")
            }
            ExecutionOutcome::StepFailed { step_number, error } => {
                writeln!(f, "Step {step_number} failed: {error}")?;
                writeln!(f, "The step is still ready and can be retried.")
            }
        }
    }
}

impl fmt::Display for SequenceSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "## Sequence {} for {} ({}/{})",
            self.id, self.lead_name, self.completed_steps, self.total_steps
        )?;
        writeln!(f)?;
        writeln!(f, "- **Type**: {}", self.sequence_type)?;
        writeln!(f, "- **Status**: {}", self.status)?;
        if let Some(company) = &self.company {
            writeln!(f, "- **Company**: {company}")?;
        }
        writeln!(f, "- **Current step**: {}", self.current_step)?;
        writeln!(f, "- **Created**: {}", LocalDateTime(&self.created_at))?;
        writeln!(f)
    }
}

impl fmt::Display for SequenceAnalytics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# Sequence Analytics")?;
        writeln!(f)?;
        writeln!(f, "- Total sequences: {}", self.total_sequences)?;
        writeln!(f, "- Active: {}", self.active_sequences)?;
        writeln!(f, "- Completed: {}", self.completed_sequences)?;
        writeln!(f, "- Conversion rate: {:.1}%", self.conversion_rate)
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "- {} [{}]", LocalDateTime(&self.created_at), self.kind)?;
        if let Some(subject) = &self.subject {
            write!(f, " {subject}")?;
        }
        writeln!(f)
    }
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;

    use super::*;

    #[test]
    fn test_outcome_display() {
        let outcome = ExecutionOutcome::StepCompleted {
            step_number: 2,
            step_type: StepKind::FollowUp,
            result: StepResult::Message(GeneratedContent {
                subject: Some("Checking in".into()),
                content: "Hi again".into(),
                ..Default::default()
            }),
        };
        let output = outcome.to_string();
        assert!(output.starts_with("## Step 2 (follow_up) completed"));
        assert!(output.contains("**Subject:** Checking in"));
        assert!(output.contains("Hi again"));

        let failed = ExecutionOutcome::StepFailed {
            step_number: 1,
            error: "request timed out".into(),
        };
        assert!(failed.to_string().contains("Step 1 failed: request timed out"));
    }

    #[test]
    fn test_analytics_display() {
        let analytics = SequenceAnalytics {
            total_sequences: 4,
            active_sequences: 1,
            completed_sequences: 3,
            conversion_rate: 66.7,
        };
        let output = analytics.to_string();
        assert!(output.contains("- Completed: 3"));
        assert!(output.contains("- Conversion rate: 66.7%"));
    }

    #[test]
    fn test_step_display_renders_completed_result() {
        let step = Step {
            id: 9,
            sequence_id: 1,
            step_number: 1,
            step_type: StepKind::Research,
            template_key: "company_research".into(),
            status: StepStatus::Completed,
            scheduled_at: Timestamp::UNIX_EPOCH,
            completed_at: Some(Timestamp::UNIX_EPOCH),
            result: Some(serde_json::json!({"pain_points": ["Churn"]})),
        };
        let output = step.to_string();
        assert!(output.contains("### 1. research (✓ Completed)"));
        assert!(output.contains("- Churn"));
    }
}
