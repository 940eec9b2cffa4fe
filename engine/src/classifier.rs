//! Stage Classifier
//!
//! Asks the text-generation collaborator which of the seven stages a prompt
//! belongs to. The answer is trimmed, lowercased and checked against the known
//! labels. A failed call or an answer outside the label set both resolve to
//! [`Stage::General`]; the caller never sees an error.

use crate::llm::LLMProvider;
use crate::secrets::scrub_secrets;
use sdk::types::{Role, Stage};
use std::sync::Arc;

/// Build the instruction sent to the model for classification
pub fn classification_prompt(prompt: &str, role: Role) -> String {
    format!(
        "You are a role-play assistant in a {} scenario. Based on the following input, identify the stage:\n\
         Options: {}\n\
         Input: \"{}\"\n\
         Return only the stage name.",
        role,
        Stage::options(),
        prompt
    )
}

pub struct StageClassifier {
    provider: Arc<dyn LLMProvider>,
}

impl StageClassifier {
    pub fn new(provider: Arc<dyn LLMProvider>) -> Self {
        Self { provider }
    }

    /// Resolve the stage of `prompt`, falling back to `general`
    pub async fn classify(&self, prompt: &str, role: Role) -> Stage {
        let instruction = classification_prompt(prompt, role);

        match self.provider.generate_text(&instruction).await {
            Ok(answer) => match Stage::parse_label(&answer) {
                Some(stage) => {
                    tracing::debug!(stage = %stage, role = %role, "Stage classified");
                    stage
                }
                None => {
                    tracing::debug!(
                        answer = %answer.trim(),
                        "Classifier answer is not a stage label, using general"
                    );
                    Stage::General
                }
            },
            Err(e) => {
                tracing::warn!(
                    provider = self.provider.name(),
                    error = %scrub_secrets(&e.to_string()),
                    "Stage classification failed, using general"
                );
                Stage::General
            }
        }
    }
}
