//! Application state
//!
//! Everything the HTTP handlers share lives here and is built once at startup.
//! There is no teardown: nothing is persisted, so dropping the state on exit
//! is all the cleanup there is.

use crate::catalog::Catalog;
use crate::composer::ResponseComposer;
use crate::config::Config;
use crate::llm::gemini::GeminiProvider;
use crate::llm::LLMProvider;
use crate::session::SessionStore;
use crate::transcript::ChatTranscript;
use std::sync::Arc;

/// Process-scoped context handed to every request handler
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SessionStore>,
    pub catalog: Arc<Catalog>,
    pub transcript: Arc<ChatTranscript>,
    pub composer: Arc<ResponseComposer>,
}

impl AppState {
    /// Load data files and construct the Gemini provider from `config`
    pub fn from_config(config: &Config) -> Self {
        let provider: Arc<dyn LLMProvider> =
            Arc::new(GeminiProvider::from_env(config.llm.gemini.clone()));
        let catalog = Arc::new(Catalog::load(config.data.clone()));
        Self::with_provider(config, catalog, provider)
    }

    /// Assemble state around an existing catalog and provider
    pub fn with_provider(
        config: &Config,
        catalog: Arc<Catalog>,
        provider: Arc<dyn LLMProvider>,
    ) -> Self {
        let sessions = Arc::new(SessionStore::new());
        let transcript = Arc::new(ChatTranscript::new(config.transcript.scope));
        let composer = Arc::new(ResponseComposer::new(
            Arc::clone(&catalog),
            Arc::clone(&sessions),
            Arc::clone(&transcript),
            provider,
            config.data.catalog_excerpt,
        ));

        Self {
            sessions,
            catalog,
            transcript,
            composer,
        }
    }
}
