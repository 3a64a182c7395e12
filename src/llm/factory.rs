use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;

use super::client::{LlmClient, MockLlmClient};
use super::client_impl::DeploymentChatClient;
use crate::auth::{ClientCredentialsExchange, CredentialGate};
use crate::config::{Config, LlmSettings};

/// Completion client that asks the credential gate for a token on every call
/// and builds a fresh [`DeploymentChatClient`] with it.
pub struct CompletionClient {
    gate: Arc<CredentialGate>,
    settings: LlmSettings,
    http: Client,
}

impl CompletionClient {
    pub fn new(gate: Arc<CredentialGate>, settings: LlmSettings) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self::with_http_client(gate, settings, http))
    }

    pub fn with_http_client(gate: Arc<CredentialGate>, settings: LlmSettings, http: Client) -> Self {
        Self {
            gate,
            settings,
            http,
        }
    }

    /// Resolve the current token and bind a handle to it.
    pub async fn get_client(&self) -> Result<DeploymentChatClient> {
        let token = self.gate.get_token().await?;
        Ok(DeploymentChatClient::new(
            token,
            &self.settings,
            self.http.clone(),
        ))
    }
}

#[async_trait]
impl LlmClient for CompletionClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        self.get_client().await?.complete(prompt).await
    }
}

/// Build the credential gate from configuration.
pub fn create_gate(config: &Config) -> Result<Arc<CredentialGate>> {
    let auth = config.auth_settings()?;
    let exchange = ClientCredentialsExchange::new(&auth)?;
    Ok(Arc::new(CredentialGate::new(
        Box::new(exchange),
        auth.leeway_secs,
    )))
}

/// Create the completion client the workflow talks to
pub fn create_client(config: &Config, dry_run: bool) -> Result<Arc<dyn LlmClient>> {
    if dry_run {
        return Ok(Arc::new(MockLlmClient::new()));
    }

    let settings = config.llm_settings()?;
    let gate = create_gate(config)?;
    Ok(Arc::new(CompletionClient::new(gate, settings)?))
}
