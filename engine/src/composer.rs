//! Response Composer
//!
//! Turns one chat request into one model reply:
//!
//! 1. reload the catalog if it is empty
//! 2. resolve `auto` to a concrete stage through the classifier
//! 3. bump that stage on the session's scoreboard
//! 4. build the context block (role, stage, catalog excerpt, role script)
//! 5. append it with the user's prompt to the transcript as a user turn
//! 6. send the whole transcript to the model
//! 7. append the reply as a model turn
//! 8. return the reply, or an error marker string if the call failed
//!
//! Only an unknown session is reported as an error, and only by [`ResponseComposer::chat`].

use crate::catalog::Catalog;
use crate::classifier::StageClassifier;
use crate::llm::{LLMProvider, Message};
use crate::secrets::scrub_secrets;
use crate::session::SessionStore;
use crate::transcript::ChatTranscript;
use sdk::errors::EngineError;
use sdk::types::{ProductRecord, Role, Stage, StageRequest, StageScoreboard};
use std::sync::Arc;

/// Prefix of the reply text returned when generation fails
pub const RESPONSE_ERROR_MARKER: &str = "❌ Response error:";

/// Result of one chat turn as reported to the client
#[derive(Debug, Clone)]
pub struct ChatOutcome {
    /// Stage label the turn was attributed to
    pub stage: String,

    /// Model reply or error marker text
    pub response: String,

    /// Session scoreboard after this turn
    pub scores: StageScoreboard,
}

/// Render the user turn sent to the model
pub fn compose_prompt(
    role: Role,
    stage_label: &str,
    products: &[ProductRecord],
    script: &[String],
    prompt: &str,
) -> String {
    let context = format!(
        "You are a {}. You are in the {} stage of the role-play.",
        role, stage_label
    );

    let products_text = if products.is_empty() {
        "No product data.".to_string()
    } else {
        products
            .iter()
            .map(ProductRecord::render)
            .collect::<Vec<_>>()
            .join("\n\n")
    };

    let script_section = if script.is_empty() {
        String::new()
    } else {
        format!("\n\nScript:\n{}", script.join("\n"))
    };

    format!(
        "{}\n\nProducts:\n{}{}\n\nUser: {}\nRespond naturally.",
        context, products_text, script_section, prompt
    )
}

pub struct ResponseComposer {
    catalog: Arc<Catalog>,
    sessions: Arc<SessionStore>,
    transcript: Arc<ChatTranscript>,
    classifier: StageClassifier,
    provider: Arc<dyn LLMProvider>,
    catalog_excerpt: usize,
}

impl ResponseComposer {
    pub fn new(
        catalog: Arc<Catalog>,
        sessions: Arc<SessionStore>,
        transcript: Arc<ChatTranscript>,
        provider: Arc<dyn LLMProvider>,
        catalog_excerpt: usize,
    ) -> Self {
        Self {
            catalog,
            sessions,
            transcript,
            classifier: StageClassifier::new(Arc::clone(&provider)),
            provider,
            catalog_excerpt,
        }
    }

    /// Handle a chat turn for a known session
    ///
    /// # Errors
    /// `EngineError::InvalidSession` before any model call when the session
    /// was never created.
    pub async fn chat(
        &self,
        prompt: &str,
        stage: &StageRequest,
        role: Role,
        session_id: &str,
    ) -> Result<ChatOutcome, EngineError> {
        if !self.sessions.contains(session_id) {
            return Err(EngineError::InvalidSession(session_id.to_string()));
        }

        let (stage, response) = self.compose_turn(prompt, stage, role, session_id).await;
        let scores = self.sessions.scoreboard(session_id)?;

        Ok(ChatOutcome {
            stage,
            response,
            scores,
        })
    }

    /// Produce the reply text for one turn
    ///
    /// Never fails: model errors come back as text starting with
    /// [`RESPONSE_ERROR_MARKER`].
    pub async fn compose(
        &self,
        prompt: &str,
        stage: &StageRequest,
        role: Role,
        session_id: &str,
    ) -> String {
        self.compose_turn(prompt, stage, role, session_id).await.1
    }

    async fn compose_turn(
        &self,
        prompt: &str,
        stage: &StageRequest,
        role: Role,
        session_id: &str,
    ) -> (String, String) {
        self.catalog.ensure_loaded();

        let stage_label = self.resolve_stage(prompt, stage, role).await;
        self.record_stage(session_id, &stage_label);

        let full_prompt = compose_prompt(
            role,
            &stage_label,
            &self.catalog.excerpt(self.catalog_excerpt),
            self.catalog.script(role),
            prompt,
        );

        let history = self
            .transcript
            .append_and_snapshot(session_id, Message::user(full_prompt));

        tracing::debug!(
            session_id = %session_id,
            stage = %stage_label,
            turns = history.len(),
            "Requesting reply"
        );

        let response = match self.provider.generate(&history).await {
            Ok(reply) => {
                self.transcript.append(session_id, Message::model(reply.clone()));
                reply
            }
            Err(e) => {
                let reason = scrub_secrets(&e.to_string());
                tracing::error!(
                    session_id = %session_id,
                    provider = self.provider.name(),
                    error = %reason,
                    "Reply generation failed"
                );
                format!("{} {}", RESPONSE_ERROR_MARKER, reason)
            }
        };

        (stage_label, response)
    }

    async fn resolve_stage(&self, prompt: &str, stage: &StageRequest, role: Role) -> String {
        match stage {
            StageRequest::Auto => self.classifier.classify(prompt, role).await.to_string(),
            StageRequest::Label(label) => label.clone(),
        }
    }

    /// Count the turn unless the label is not one of the known stages
    fn record_stage(&self, session_id: &str, stage_label: &str) {
        match Stage::ALL.into_iter().find(|s| s.as_str() == stage_label) {
            Some(stage) => {
                if !self.sessions.record(session_id, stage) {
                    tracing::warn!(
                        session_id = %session_id,
                        "Score update for unknown session skipped"
                    );
                }
            }
            None => {
                tracing::warn!(
                    session_id = %session_id,
                    stage = %stage_label,
                    "Unknown stage label, score not updated"
                );
            }
        }
    }
}
