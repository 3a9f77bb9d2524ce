//! Offline generator that fills canned templates from lead fields.

use async_trait::async_trait;

use super::{ContentGenerator, GenerationError, GenerationRequest};
use crate::models::{
    DecisionProcess, GeneratedContent, Lead, MessageFormat, OutreachStrategy, ResearchFindings,
};

/// Deterministic generator used when no API key is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateGenerator;

impl TemplateGenerator {
    pub fn new() -> Self {
        Self
    }

    fn email(lead: &Lead, template_key: &str) -> (String, String) {
        let name = lead.greeting_name();
        let company = lead.company_or_default();
        match template_key {
            key if key.contains("follow_up") => (
                format!("Following up on {company}"),
                format!(
                    "Hi {name},\n\nI wanted to follow up on my earlier note. \
                     If improving how {company} runs outreach is on your list this quarter, \
                     I'd be glad to share what has worked for similar teams.\n\n\
                     Would a short call next week be useful?"
                ),
            ),
            "final_email" | "final_touch" => (
                format!("Closing the loop with {company}"),
                format!(
                    "Hi {name},\n\nI haven't heard back, so I'll assume the timing isn't right. \
                     If that changes, just reply to this email and I'll pick things up from here."
                ),
            ),
            "demo_request" => (
                format!("A short demo for {company}?"),
                format!(
                    "Hi {name},\n\nBased on our conversations so far, a 20-minute demo tailored \
                     to {company} seems like the natural next step. Which day works best for you?"
                ),
            ),
            _ => (
                format!("Idea for {company}"),
                format!(
                    "Hi {name},\n\nI've been looking at how teams like {company} approach growth \
                     and had a few ideas that might be relevant to your role. \
                     What does your current process look like?"
                ),
            ),
        }
    }
}

#[async_trait]
impl ContentGenerator for TemplateGenerator {
    fn name(&self) -> &str {
        "template"
    }

    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GeneratedContent, GenerationError> {
        let lead = &request.lead;
        let name = lead.greeting_name();
        let company = lead.company_or_default();

        let (subject, content) = match request.format {
            MessageFormat::Email => {
                let (subject, content) = Self::email(lead, &request.template_key);
                (Some(subject), content)
            }
            MessageFormat::LinkedIn => (
                None,
                format!("Hi {name}, I enjoy following what {company} is building. Would be great to connect."),
            ),
            MessageFormat::CallScript => (
                None,
                format!(
                    "Hi {name}, this is a quick call about outreach at {company}. [pause] \
                     Do you have two minutes? [pause] \
                     I'm curious how your team handles prospecting today."
                ),
            ),
        };

        let mut personalization_notes = vec![format!("Addressed to {name}")];
        if let Some(title) = &lead.title {
            personalization_notes.push(format!("Written for a {title}"));
        }

        Ok(GeneratedContent {
            subject,
            content,
            personalization_notes,
            follow_up_suggestions: Vec::new(),
            key_hooks: Vec::new(),
        })
    }

    async fn research(&self, lead: &Lead) -> Result<ResearchFindings, GenerationError> {
        let industry = lead.industry.as_deref().unwrap_or("their industry");
        Ok(ResearchFindings {
            pain_points: vec![
                "Budget constraints".into(),
                "Operational efficiency".into(),
                "Technology adoption".into(),
            ],
            company_challenges: vec![format!("Staying competitive in {industry}")],
            decision_process: DecisionProcess {
                likely_stakeholders: lead.title.iter().cloned().collect(),
                typical_timeline: Some("1-3 months".into()),
                key_factors: vec!["Return on investment".into()],
            },
            outreach_strategy: OutreachStrategy {
                best_times: vec!["Tuesday to Thursday mornings".into()],
                preferred_channels: vec!["email".into(), "linkedin".into()],
                topics_of_interest: vec![industry.to_string()],
            },
            discovery_questions: vec![format!(
                "What is the biggest obstacle for {} this year?",
                lead.company_or_default()
            )],
        })
    }
}
