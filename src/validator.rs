use std::sync::Arc;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::llm::client::LlmClient;
use crate::llm::prompts;

/// Declared versus detected language for one submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    pub expected_language: String,
    pub detected_language: String,
}

/// Asks the model which language a snippet is written in and checks the
/// answer against what the user declared.
pub struct LanguageValidator {
    client: Arc<dyn LlmClient>,
    custom_instructions: Option<String>,
}

impl LanguageValidator {
    pub fn new(client: Arc<dyn LlmClient>) -> Self {
        Self {
            client,
            custom_instructions: None,
        }
    }

    pub fn with_custom_instructions(mut self, custom: Option<String>) -> Self {
        self.custom_instructions = custom;
        self
    }

    /// Detected language, trimmed and lower-cased. The model's answer is
    /// trusted as-is otherwise.
    pub async fn detect_language(&self, code: &str) -> Result<String> {
        let prompt = prompts::detect_language(code, self.custom_instructions.as_deref());
        let answer = self
            .client
            .complete(&prompt)
            .await
            .map_err(|e| Error::Detection(e.into()))?;
        let detected = answer.trim().to_lowercase();
        debug!("Model detected language: {:?}", detected);
        Ok(detected)
    }

    /// Returns the normalized detected language, or `LanguageMismatch` when it
    /// differs from `expected` ignoring case.
    pub async fn validate_language(&self, expected: &str, code: &str) -> Result<String> {
        Ok(self.validate(expected, code).await?.detected_language)
    }

    pub async fn validate(&self, expected: &str, code: &str) -> Result<ValidationResult> {
        let detected = self.detect_language(code).await?;
        if detected != expected.trim().to_lowercase() {
            return Err(Error::LanguageMismatch {
                expected: expected.to_string(),
                detected,
            });
        }
        info!("Language confirmed: {}", detected);
        Ok(ValidationResult {
            expected_language: expected.to_string(),
            detected_language: detected,
        })
    }
}
