use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::client::LlmClient;
use crate::config::LlmSettings;
use crate::util::SecretString;

// ============================================================================
// Deployment chat client (OpenAI-style chat completions behind a gateway)
// ============================================================================

/// One completion handle bound to a single bearer token.
pub struct DeploymentChatClient {
    token: SecretString,
    model: String,
    endpoint_url: String,
    temperature: f32,
    max_tokens: u32,
    resource_group: String,
    client: Client,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

impl DeploymentChatClient {
    /// `client` is shared across handles so connections are pooled.
    pub fn new(token: SecretString, settings: &LlmSettings, client: Client) -> Self {
        Self {
            token,
            model: settings.model.clone(),
            endpoint_url: settings.endpoint_url.clone(),
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
            resource_group: settings.resource_group.clone(),
            client,
        }
    }

    pub fn endpoint_url(&self) -> &str {
        &self.endpoint_url
    }
}

#[async_trait]
impl LlmClient for DeploymentChatClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        debug!(
            "Calling chat completions at {} with model: {}",
            self.endpoint_url, self.model
        );

        let response = self
            .client
            .post(&self.endpoint_url)
            .header("content-type", "application/json")
            .header("authorization", format!("Bearer {}", self.token.expose()))
            .header("AI-Resource-Group", &self.resource_group)
            .json(&request)
            .send()
            .await
            .context("Failed to send request to completion endpoint")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            bail!("Completion API error {}: {}", status, error_text);
        }

        let api_response: ChatResponse = response
            .json()
            .await
            .context("Failed to parse completion response")?;

        api_response
            .choices
            .first()
            .map(|c| c.message.content.clone())
            .context("No choices in completion response")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> LlmSettings {
        LlmSettings {
            model: "gpt-4o".to_string(),
            temperature: 0.0,
            max_tokens: 512,
            api_version: "2023-05-15".to_string(),
            endpoint_url: "http://localhost/v2/inference/deployments/d1/chat/completions?api-version=2023-05-15".to_string(),
            resource_group: "default".to_string(),
            timeout_secs: 5,
        }
    }

    #[test]
    fn test_client_creation() {
        let client = DeploymentChatClient::new("tok".into(), &settings(), Client::new());
        assert_eq!(client.token.expose(), "tok");
        assert_eq!(client.model, "gpt-4o");
        assert_eq!(client.max_tokens, 512);
        assert!(client.endpoint_url().contains("/deployments/d1/"));
    }

    #[test]
    fn test_request_structure() {
        let request = ChatRequest {
            model: "gpt-4o".to_string(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: "test".to_string(),
            }],
            temperature: 0.7,
            max_tokens: 256,
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "gpt-4o");
        assert_eq!(json["max_tokens"], 256);
        let temp = json["temperature"].as_f64().unwrap();
        assert!((temp - 0.7).abs() < 0.0001);
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"], "test");
    }

    #[test]
    fn test_response_parsing() {
        let json = r#"{
            "id": "chatcmpl-1",
            "choices": [
                {"index": 0, "message": {"role": "assistant", "content": "Python"}, "finish_reason": "stop"}
            ]
        }"#;
        let response: ChatResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.choices[0].message.content, "Python");
    }

    #[test]
    fn test_response_empty_choices() {
        let response: ChatResponse = serde_json::from_str(r#"{"choices": []}"#).unwrap();
        assert!(response.choices.is_empty());
    }
}
