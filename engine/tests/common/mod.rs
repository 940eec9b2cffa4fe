//! Shared fixtures for the engine integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use roleplay_engine::catalog::Catalog;
use roleplay_engine::config::{Config, DataConfig, TranscriptScope};
use roleplay_engine::llm::{LLMError, LLMProvider, Message, Result};
use roleplay_engine::state::AppState;
use sdk::types::{ProductRecord, Role, RoleScript};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Opening words of every classification instruction
pub const CLASSIFY_PREFIX: &str = "You are a role-play assistant";

/// A Mock LLM Provider with canned classification and reply behaviour.
///
/// `None` makes the corresponding call fail.
pub struct MockLLMProvider {
    classification: Option<String>,
    reply: Option<String>,
    classify_calls: AtomicUsize,
    generations: Mutex<Vec<Vec<Message>>>,
}

impl MockLLMProvider {
    pub fn new(classification: Option<&str>, reply: Option<&str>) -> Self {
        Self {
            classification: classification.map(String::from),
            reply: reply.map(String::from),
            classify_calls: AtomicUsize::new(0),
            generations: Mutex::new(Vec::new()),
        }
    }

    /// Replies "Sure, let's talk." and classifies everything as `closing`
    pub fn happy() -> Self {
        Self::new(Some("closing"), Some("Sure, let's talk."))
    }

    pub fn classify_calls(&self) -> usize {
        self.classify_calls.load(Ordering::SeqCst)
    }

    /// Transcripts sent for reply generation, in call order
    pub fn generations(&self) -> Vec<Vec<Message>> {
        self.generations.lock().unwrap().clone()
    }

    pub fn total_calls(&self) -> usize {
        self.classify_calls() + self.generations().len()
    }
}

#[async_trait]
impl LLMProvider for MockLLMProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn generate(&self, messages: &[Message]) -> Result<String> {
        let is_classification =
            messages.len() == 1 && messages[0].content.starts_with(CLASSIFY_PREFIX);

        if is_classification {
            self.classify_calls.fetch_add(1, Ordering::SeqCst);
            return self
                .classification
                .clone()
                .ok_or_else(|| LLMError::NetworkError("classifier offline".to_string()));
        }

        self.generations.lock().unwrap().push(messages.to_vec());
        self.reply
            .clone()
            .ok_or_else(|| LLMError::ProviderUnavailable("quota exhausted".to_string()))
    }
}

/// Data sources that point nowhere, so reloads always find nothing
pub fn missing_sources() -> DataConfig {
    let dir = PathBuf::from("/nonexistent/roleplay-test-data");
    DataConfig {
        products_json: dir.join("products.json"),
        products_csv: dir.join("products.csv"),
        script_dir: dir,
        ..DataConfig::default()
    }
}

pub fn sample_products() -> Vec<ProductRecord> {
    serde_json::from_str(
        r#"[
            {"name": "Standing Desk", "price": 499, "description": "Electric height adjustment"},
            {"name": "Ergo Chair", "price": "289.00", "description": "Mesh back"}
        ]"#,
    )
    .unwrap()
}

pub fn sample_scripts() -> HashMap<Role, RoleScript> {
    let mut scripts = HashMap::new();
    scripts.insert(
        Role::Seller,
        RoleScript::from_text("Greet the customer\nAsk about their workspace"),
    );
    scripts
}

/// Application state around `provider` with in-memory catalog data
pub fn app_state(provider: Arc<MockLLMProvider>, scope: TranscriptScope) -> AppState {
    let mut config = Config::default();
    config.transcript.scope = scope;
    config.data = missing_sources();

    let catalog = Arc::new(Catalog::from_parts(
        missing_sources(),
        sample_products(),
        sample_scripts(),
    ));
    AppState::with_provider(&config, catalog, provider)
}
