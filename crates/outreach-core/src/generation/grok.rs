//! xAI Grok chat-completions client.

use std::{env, time::Duration};

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use super::{ContentGenerator, GenerationError, GenerationRequest};
use crate::models::{GeneratedContent, Lead, MessageFormat, ResearchFindings};

pub const DEFAULT_MODEL: &str = "grok-3-mini";
pub const DEFAULT_BASE_URL: &str = "https://api.x.ai/v1";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const MESSAGE_TEMPERATURE: f32 = 0.7;
const RESEARCH_TEMPERATURE: f32 = 0.6;
const MESSAGE_MAX_TOKENS: u32 = 800;
const RESEARCH_MAX_TOKENS: u32 = 1000;

/// Connection settings for the xAI API.
#[derive(Debug, Clone)]
pub struct GrokConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl GrokConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: REQUEST_TIMEOUT,
        }
    }

    /// Reads `XAI_API_KEY`, `XAI_MODEL` and `XAI_BASE_URL`.
    pub fn from_env() -> Result<Self, GenerationError> {
        let api_key = env::var("XAI_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or(GenerationError::MissingApiKey)?;

        let mut config = Self::new(api_key);
        if let Ok(model) = env::var("XAI_MODEL") {
            config.model = model;
        }
        if let Ok(base_url) = env::var("XAI_BASE_URL") {
            config.base_url = base_url.trim_end_matches('/').to_string();
        }
        Ok(config)
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

/// Generator backed by the xAI chat completions endpoint.
#[derive(Debug, Clone)]
pub struct GrokClient {
    client: Client,
    config: GrokConfig,
}

impl GrokClient {
    pub fn new(config: GrokConfig) -> Result<Self, GenerationError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        debug!("Creating Grok client for model {}", config.model);
        Ok(Self { client, config })
    }

    pub fn from_env() -> Result<Self, GenerationError> {
        Self::new(GrokConfig::from_env()?)
    }

    async fn complete(
        &self,
        prompt: String,
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String, GenerationError> {
        let url = format!("{}/chat/completions", self.config.base_url);
        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![ChatMessage {
                role: "user".into(),
                content: prompt,
            }],
            temperature,
            max_tokens,
            stream: false,
        };

        debug!("Sending chat completion request to {url}");
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("xAI API returned {status}");
            return Err(GenerationError::from_status(status.as_u16(), body));
        }

        let completion: ChatResponse = response.json().await?;
        completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| GenerationError::MalformedResponse("no choices returned".into()))
    }
}

#[async_trait]
impl ContentGenerator for GrokClient {
    fn name(&self) -> &str {
        "grok"
    }

    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GeneratedContent, GenerationError> {
        let text = self
            .complete(
                message_prompt(request),
                MESSAGE_TEMPERATURE,
                MESSAGE_MAX_TOKENS,
            )
            .await?;
        parse_message_response(&text, request.format)
    }

    async fn research(&self, lead: &Lead) -> Result<ResearchFindings, GenerationError> {
        let text = self
            .complete(research_prompt(lead), RESEARCH_TEMPERATURE, RESEARCH_MAX_TOKENS)
            .await?;
        parse_research_response(&text)
    }
}

/// Tone and length guidance for one output format.
struct Style {
    description: &'static str,
    tone: &'static str,
    max_words: u32,
}

fn style_for(format: MessageFormat, template_key: &str) -> Style {
    match format {
        MessageFormat::Email if template_key.contains("follow_up") => Style {
            description: "Follow-up email that references the previous interaction and adds new value",
            tone: "persistent but respectful and helpful",
            max_words: 180,
        },
        MessageFormat::Email => Style {
            description: "Professional outreach email that establishes credibility and offers clear value",
            tone: "professional, conversational, and genuinely helpful",
            max_words: 200,
        },
        MessageFormat::LinkedIn => Style {
            description: "LinkedIn connection request or message",
            tone: "professional, personal, and authentic",
            max_words: 150,
        },
        MessageFormat::CallScript => Style {
            description: "Phone call opening script (30-45 seconds)",
            tone: "conversational, confident, and natural",
            max_words: 120,
        },
    }
}

fn or_unknown(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("Unknown")
}

fn lead_profile(lead: &Lead) -> String {
    format!(
        "Name: {}\nCompany: {}\nTitle: {}\nIndustry: {}\nCompany Size: {}",
        lead.display_name(),
        or_unknown(&lead.company),
        or_unknown(&lead.title),
        or_unknown(&lead.industry),
        or_unknown(&lead.company_size),
    )
}

pub(crate) fn message_prompt(request: &GenerationRequest) -> String {
    let style = style_for(request.format, &request.template_key);
    let context = &request.context;
    let history = &context.previous_interactions;

    let mut insights = format!(
        "Previous messages: {}\nEngagement level: {}\nStatus changes: {}",
        history.messages,
        context.engagement_level.as_str(),
        context.status_changes
    );
    if let Some(activity) = &history.last_activity {
        insights.push_str(&format!("\nLast activity: {activity}"));
    }
    if let Some(research) = &context.research_insights {
        if !research.pain_points.is_empty() {
            insights.push_str(&format!(
                "\nLikely pain points: {}",
                research.pain_points.join("; ")
            ));
        }
    }

    let format_note = match request.format {
        MessageFormat::LinkedIn => "\nIMPORTANT: Keep connection requests under 200 characters.",
        MessageFormat::CallScript => {
            "\nIMPORTANT: Structure it as a natural conversation opener with pause points."
        }
        MessageFormat::Email => "",
    };
    let subject = match request.format {
        MessageFormat::Email => "Compelling subject line",
        _ => "N/A",
    };

    format!(
        r#"You are writing a professional business outreach message ({description}) as a person who has researched the prospect and wants to start a genuine business conversation.

PROSPECT INFORMATION:
{profile}

TEMPLATE: {template}

RESEARCH INSIGHTS (use selectively and naturally):
{insights}

MESSAGE REQUIREMENTS:
- Tone: {tone}
- Maximum length: {max_words} words
- Focus on their challenges and opportunities, not on what you offer
- Pick one or two relevant details and weave them in naturally
- End with a thoughtful question or a specific call to action{format_note}

Return ONLY valid JSON with plain-text fields:
{{
  "subject": "{subject}",
  "content": "The message text",
  "personalization_notes": ["..."],
  "follow_up_suggestions": ["..."],
  "key_hooks": ["..."]
}}"#,
        description = style.description,
        profile = lead_profile(&request.lead),
        template = request.template_key,
        tone = style.tone,
        max_words = style.max_words,
    )
}

pub(crate) fn research_prompt(lead: &Lead) -> String {
    format!(
        r#"You are a research specialist enriching lead data for sales outreach. Based on the information below, provide educated insights.

{profile}

Provide likely pain points for the role and industry, common company challenges, the probable decision-making process, the best times and channels for outreach, topics of interest and discovery-call questions.

Return ONLY valid JSON:
{{
  "pain_points": ["..."],
  "company_challenges": ["..."],
  "decision_process": {{
    "likely_stakeholders": ["..."],
    "typical_timeline": "...",
    "key_factors": ["..."]
  }},
  "outreach_strategy": {{
    "best_times": ["..."],
    "preferred_channels": ["..."],
    "topics_of_interest": ["..."]
  }},
  "discovery_questions": ["..."]
}}"#,
        profile = lead_profile(lead),
    )
}

/// Parse `text` as JSON, falling back to the outermost `{...}` object when
/// the model wrapped it in prose or code fences.
fn parse_json_object<T: DeserializeOwned>(text: &str) -> Result<T, GenerationError> {
    let text = text.trim();
    match serde_json::from_str(text) {
        Ok(value) => Ok(value),
        Err(first) => {
            let object = text
                .find('{')
                .zip(text.rfind('}'))
                .filter(|(start, end)| start < end)
                .map(|(start, end)| &text[start..=end]);
            object
                .and_then(|object| serde_json::from_str(object).ok())
                .ok_or_else(|| GenerationError::MalformedResponse(first.to_string()))
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct RawMessage {
    #[serde(default)]
    subject: Option<String>,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    personalization_notes: Vec<String>,
    #[serde(default)]
    follow_up_suggestions: Vec<String>,
    #[serde(default)]
    key_hooks: Vec<String>,
}

pub(crate) fn parse_message_response(
    text: &str,
    format: MessageFormat,
) -> Result<GeneratedContent, GenerationError> {
    let mut raw: RawMessage = parse_json_object(text)?;

    // Models sometimes return the whole object again inside `content`
    if let Some(nested) = raw
        .content
        .as_deref()
        .filter(|content| content.trim_start().starts_with('{'))
        .and_then(|content| serde_json::from_str::<RawMessage>(content).ok())
        .filter(|nested| nested.content.is_some())
    {
        raw = RawMessage {
            subject: nested.subject.or(raw.subject),
            ..nested
        };
    }

    let content = raw
        .content
        .map(|content| content.trim().to_string())
        .filter(|content| !content.is_empty())
        .ok_or_else(|| GenerationError::MalformedResponse("response has no content".into()))?;

    let subject = match format {
        MessageFormat::Email => raw
            .subject
            .map(|subject| subject.trim().to_string())
            .filter(|subject| !subject.is_empty() && subject != "N/A"),
        _ => None,
    };

    Ok(GeneratedContent {
        subject,
        content,
        personalization_notes: raw.personalization_notes,
        follow_up_suggestions: raw.follow_up_suggestions,
        key_hooks: raw.key_hooks,
    })
}

pub(crate) fn parse_research_response(text: &str) -> Result<ResearchFindings, GenerationError> {
    parse_json_object(text)
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;

    use super::*;
    use crate::models::{GenerationContext, LeadStatus};

    fn lead() -> Lead {
        Lead {
            id: 1,
            email: "ada@analytical.io".into(),
            first_name: Some("Ada".into()),
            last_name: Some("Lovelace".into()),
            company: Some("Analytical Engines".into()),
            title: Some("CTO".into()),
            industry: Some("Computing".into()),
            company_size: None,
            linkedin_url: None,
            website: None,
            status: LeadStatus::New,
            created_at: Timestamp::UNIX_EPOCH,
            updated_at: Timestamp::UNIX_EPOCH,
        }
    }

    #[test]
    fn test_parse_plain_json() {
        let text = r#"{"subject": "Quick question", "content": "Hi Ada", "personalization_notes": ["CTO"]}"#;
        let parsed = parse_message_response(text, MessageFormat::Email).unwrap();
        assert_eq!(parsed.subject.as_deref(), Some("Quick question"));
        assert_eq!(parsed.content, "Hi Ada");
        assert_eq!(parsed.personalization_notes, vec!["CTO".to_string()]);
    }

    #[test]
    fn test_parse_json_wrapped_in_prose() {
        let text = "Sure! Here it is:\n```json\n{\"subject\": \"N/A\", \"content\": \"Let's connect\"}\n```";
        let parsed = parse_message_response(text, MessageFormat::LinkedIn).unwrap();
        assert_eq!(parsed.subject, None);
        assert_eq!(parsed.content, "Let's connect");
    }

    #[test]
    fn test_parse_nested_content_object() {
        let text = r#"{"subject": "Outer", "content": "{\"content\": \"Inner body\", \"key_hooks\": [\"hook\"]}"}"#;
        let parsed = parse_message_response(text, MessageFormat::Email).unwrap();
        assert_eq!(parsed.content, "Inner body");
        assert_eq!(parsed.subject.as_deref(), Some("Outer"));
        assert_eq!(parsed.key_hooks, vec!["hook".to_string()]);
    }

    #[test]
    fn test_parse_rejects_missing_content() {
        assert!(matches!(
            parse_message_response(r#"{"subject": "Only"}"#, MessageFormat::Email),
            Err(GenerationError::MalformedResponse(_))
        ));
        assert!(matches!(
            parse_message_response("no json here", MessageFormat::Email),
            Err(GenerationError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_parse_research_defaults_missing_sections() {
        let findings =
            parse_research_response(r#"{"pain_points": ["Legacy tooling"]}"#).unwrap();
        assert_eq!(findings.pain_points, vec!["Legacy tooling".to_string()]);
        assert!(findings.decision_process.likely_stakeholders.is_empty());
    }

    #[test]
    fn test_message_prompt_carries_lead_and_style() {
        let request = GenerationRequest {
            lead: lead(),
            format: MessageFormat::CallScript,
            template_key: "discovery_call".into(),
            context: GenerationContext::default(),
        };
        let prompt = message_prompt(&request);
        assert!(prompt.contains("Ada Lovelace"));
        assert!(prompt.contains("discovery_call"));
        assert!(prompt.contains("120 words"));
        assert!(prompt.contains("pause points"));
    }

    #[test]
    fn test_follow_up_templates_use_follow_up_style() {
        let style = style_for(MessageFormat::Email, "proposal_follow_up");
        assert_eq!(style.max_words, 180);
    }
}
