use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Semaphore;

use crate::{
    config::AppConfig,
    engine::{Engine, EngineSettings},
    service::{
        feed::{FeedEntry, FeedError, FeedFetcher},
        generator::{GenerationError, TextGenerator},
        render::{DocumentKind, DocumentRenderer, RenderError},
        Language, ServiceRegistry,
    },
};

pub const ADMIN_ID: u64 = 777;

/// Generator that answers `answer #<n>` and records every prompt it sees.
#[derive(Default)]
pub struct MockGenerator {
    pub calls: AtomicUsize,
    pub prompts: Mutex<Vec<(String, String)>>,
    pub fail: AtomicBool,
    /// When set, each call waits for one permit before answering.
    pub gate: Option<Arc<Semaphore>>,
}

impl MockGenerator {
    pub fn gated(gate: Arc<Semaphore>) -> Self {
        Self {
            gate: Some(gate),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_prompt(&self) -> Option<(String, String)> {
        self.prompts.lock().unwrap().last().cloned()
    }

    async fn answer(&self, system_prompt: &str, user_prompt: &str) -> Result<String, GenerationError> {
        self.prompts
            .lock()
            .unwrap()
            .push((system_prompt.to_string(), user_prompt.to_string()));
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;

        if let Some(gate) = &self.gate {
            gate.acquire().await.unwrap().forget();
        }
        if self.fail.load(Ordering::SeqCst) {
            return Err(GenerationError::Upstream {
                status: 503,
                body: "unavailable".into(),
            });
        }
        Ok(format!("answer #{}", n))
    }
}

#[async_trait]
impl TextGenerator for MockGenerator {
    async fn generate(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        _language: Language,
    ) -> Result<String, GenerationError> {
        self.answer(system_prompt, user_prompt).await
    }

    async fn analyze_image(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        _image: &[u8],
        _language: Language,
    ) -> Result<String, GenerationError> {
        self.answer(system_prompt, user_prompt).await
    }
}

#[derive(Default)]
pub struct MockRenderer {
    pub calls: AtomicUsize,
    pub texts: Mutex<Vec<String>>,
}

impl DocumentRenderer for MockRenderer {
    fn render(&self, _title: &str, text: &str, kind: DocumentKind) -> Result<Vec<u8>, RenderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.texts.lock().unwrap().push(text.to_string());
        Ok(format!("{}:{}", kind, text).into_bytes())
    }
}

#[derive(Default)]
pub struct MockFeed {
    pub entries: Vec<FeedEntry>,
}

#[async_trait]
impl FeedFetcher for MockFeed {
    async fn fetch_latest(&self, _url: &str, limit: usize) -> Result<Vec<FeedEntry>, FeedError> {
        Ok(self.entries.iter().take(limit).cloned().collect())
    }
}

pub fn test_config(extra: &[(&str, &str)]) -> AppConfig {
    let mut values: HashMap<String, String> = HashMap::from([
        ("TELEGRAM_TOKEN".to_string(), "test-token".to_string()),
        ("OPENAI_API_KEY".to_string(), "test-key".to_string()),
        ("ADMIN_IDS".to_string(), ADMIN_ID.to_string()),
    ]);
    for (key, value) in extra {
        values.insert(key.to_string(), value.to_string());
    }
    AppConfig::from_source(|key| values.get(key).cloned()).expect("valid test config")
}

pub struct TestEngine {
    pub engine: Engine,
    pub generator: Arc<MockGenerator>,
    pub renderer: Arc<MockRenderer>,
}

pub fn test_engine_with(config: &AppConfig, generator: MockGenerator, feed: MockFeed) -> TestEngine {
    let generator = Arc::new(generator);
    let renderer = Arc::new(MockRenderer::default());
    let services = ServiceRegistry::with_collaborators(
        config,
        generator.clone(),
        renderer.clone(),
        Arc::new(feed),
    );

    TestEngine {
        engine: Engine::new(services, EngineSettings::from(&config.content)),
        generator,
        renderer,
    }
}

/// Engine over mocks. `tiers` seeds user tiers like `TIER_OVERRIDES`.
pub fn test_engine(tiers: &str) -> TestEngine {
    let config = test_config(&[("TIER_OVERRIDES", tiers)]);
    test_engine_with(&config, MockGenerator::default(), MockFeed::default())
}
