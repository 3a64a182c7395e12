use std::sync::Arc;
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::llm::client::LlmClient;
use crate::llm::prompts;

/// Test-case descriptions in the order the model produced them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TestCaseBatch(Vec<String>);

impl TestCaseBatch {
    /// Split a model answer into lines and keep the first `count`.
    pub fn from_response(response: &str, count: usize) -> Self {
        Self(
            response
                .trim()
                .lines()
                .take(count)
                .map(str::to_string)
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }

    pub fn joined(&self) -> String {
        self.0.join("\n")
    }
}

pub struct TestCaseGenerator {
    client: Arc<dyn LlmClient>,
    max_test_cases: usize,
    prompt_ceiling: usize,
    custom_instructions: Option<String>,
}

impl TestCaseGenerator {
    pub fn new(client: Arc<dyn LlmClient>, max_test_cases: usize) -> Self {
        Self {
            client,
            max_test_cases,
            prompt_ceiling: 20,
            custom_instructions: None,
        }
    }

    pub fn with_prompt_ceiling(mut self, ceiling: usize) -> Self {
        self.prompt_ceiling = ceiling;
        self
    }

    pub fn with_custom_instructions(mut self, custom: Option<String>) -> Self {
        self.custom_instructions = custom;
        self
    }

    pub fn max_test_cases(&self) -> usize {
        self.max_test_cases
    }

    /// Reject counts outside `1..=max_test_cases`.
    pub fn check_count(&self, count: usize) -> Result<()> {
        if count == 0 || count > self.max_test_cases {
            return Err(Error::CountOutOfRange {
                requested: count,
                max: self.max_test_cases,
            });
        }
        Ok(())
    }

    pub async fn generate_test_cases(
        &self,
        language: &str,
        code: &str,
        count: usize,
    ) -> Result<TestCaseBatch> {
        self.check_count(count)?;

        info!(
            "Generating up to {} test cases for {} code",
            count, language
        );
        let prompt = prompts::generate_test_cases(
            language,
            code,
            self.prompt_ceiling,
            self.custom_instructions.as_deref(),
        );
        let response = self
            .client
            .complete(&prompt)
            .await
            .map_err(|e| Error::Generation(e.into()))?;

        let batch = TestCaseBatch::from_response(&response, count);
        if batch.len() < count {
            warn!(
                "Model returned {} lines, fewer than the {} requested",
                batch.len(),
                count
            );
        }
        Ok(batch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_truncates() {
        let batch = TestCaseBatch::from_response("a\nb\nc\nd", 2);
        assert_eq!(batch.as_slice(), &["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_batch_trims_surrounding_whitespace_only() {
        let batch = TestCaseBatch::from_response("\n\n  1. first\n\n2. second\n\n", 10);
        // Interior blank lines are kept verbatim
        assert_eq!(batch.into_vec(), vec!["1. first", "", "2. second"]);
    }

    #[test]
    fn test_batch_handles_crlf() {
        let batch = TestCaseBatch::from_response("one\r\ntwo\r\n", 5);
        assert_eq!(batch.joined(), "one\ntwo");
    }

    #[test]
    fn test_empty_response_gives_empty_batch() {
        let batch = TestCaseBatch::from_response("   ", 3);
        assert!(batch.is_empty());
    }
}
