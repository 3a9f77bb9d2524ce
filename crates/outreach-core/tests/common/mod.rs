#![allow(dead_code)]

use std::{
    path::PathBuf,
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use async_trait::async_trait;
use jiff::Timestamp;
use outreach_core::{
    generation::{ContentGenerator, GenerationError, GenerationRequest},
    models::{GeneratedContent, Lead, MessageFormat, ResearchFindings},
    params::CreateLead,
    ManualClock, SequenceEngine, SequenceEngineBuilder,
};
use tempfile::TempDir;

/// Generator with canned output, a failure switch and a call counter.
#[derive(Default)]
pub struct ScriptedGenerator {
    failing: AtomicBool,
    calls: AtomicUsize,
    delay: Option<Duration>,
    last_request: Mutex<Option<GenerationRequest>>,
}

impl ScriptedGenerator {
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Default::default()
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<GenerationRequest> {
        self.last_request.lock().expect("request lock").clone()
    }

    async fn enter(&self) -> Result<(), GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(GenerationError::Timeout);
        }
        Ok(())
    }
}

#[async_trait]
impl ContentGenerator for ScriptedGenerator {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GeneratedContent, GenerationError> {
        *self.last_request.lock().expect("request lock") = Some(request.clone());
        self.enter().await?;
        Ok(GeneratedContent {
            subject: (request.format == MessageFormat::Email)
                .then(|| format!("About {}", request.template_key)),
            content: format!(
                "{} for {} ({})",
                request.format.as_str(),
                request.lead.greeting_name(),
                request.template_key
            ),
            personalization_notes: vec![request.template_key.clone()],
            ..Default::default()
        })
    }

    async fn research(&self, lead: &Lead) -> Result<ResearchFindings, GenerationError> {
        self.enter().await?;
        Ok(ResearchFindings {
            pain_points: vec![format!("Scaling {}", lead.company_or_default())],
            ..Default::default()
        })
    }
}

pub struct TestEnv {
    pub temp_dir: TempDir,
    pub db_path: PathBuf,
    pub engine: SequenceEngine,
    pub clock: Arc<ManualClock>,
    pub generator: Arc<ScriptedGenerator>,
}

/// Engine on a temporary database with a scripted generator and a manual
/// clock starting at the current time.
pub async fn create_test_engine() -> TestEnv {
    create_test_engine_with(ScriptedGenerator::default()).await
}

pub async fn create_test_engine_with(generator: ScriptedGenerator) -> TestEnv {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("test.db");
    let clock = Arc::new(ManualClock::new(Timestamp::now()));
    let generator = Arc::new(generator);

    let engine = SequenceEngineBuilder::new()
        .with_database_path(Some(&db_path))
        .with_generator(generator.clone())
        .with_clock(clock.clone())
        .build()
        .await
        .expect("Failed to create engine");

    TestEnv {
        temp_dir,
        db_path,
        engine,
        clock,
        generator,
    }
}

/// Second engine sharing the database but with its own lock table.
pub async fn second_engine(env: &TestEnv) -> SequenceEngine {
    SequenceEngineBuilder::new()
        .with_database_path(Some(&env.db_path))
        .with_generator(env.generator.clone())
        .with_clock(env.clock.clone())
        .build()
        .await
        .expect("Failed to create engine")
}

pub async fn add_test_lead(engine: &SequenceEngine, email: &str) -> Lead {
    engine
        .add_lead(&CreateLead {
            email: email.to_string(),
            first_name: Some("Test".into()),
            last_name: Some("Lead".into()),
            company: Some("Acme".into()),
            title: Some("VP Sales".into()),
            ..Default::default()
        })
        .await
        .expect("Failed to add lead")
}
