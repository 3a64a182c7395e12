//! OAuth2 client-credentials grant.
//!
//! Posts `grant_type=client_credentials` with the client id and secret in the
//! form body to the provider's token endpoint and hands the answer back as a
//! [`TokenGrant`]. Turning that into a cached credential is the gate's job.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use super::gate::{TokenGrant, TokenSource};
use crate::config::AuthSettings;
use crate::error::{Error, Result};
use crate::util::SecretString;

pub struct ClientCredentialsExchange {
    token_url: String,
    client_id: String,
    client_secret: SecretString,
    client: Client,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
    /// Some providers answer with an absolute expiry; accept both int and float
    #[serde(default)]
    expires_at: Option<f64>,
}

impl ClientCredentialsExchange {
    pub fn new(settings: &AuthSettings) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| Error::TokenExchange(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self::with_client(settings, client))
    }

    pub fn with_client(settings: &AuthSettings, client: Client) -> Self {
        Self {
            token_url: settings.token_url.clone(),
            client_id: settings.client_id.clone(),
            client_secret: settings.client_secret.clone(),
            client,
        }
    }
}

#[async_trait]
impl TokenSource for ClientCredentialsExchange {
    async fn fetch(&self) -> Result<TokenGrant> {
        debug!("Creating a new token for {}", self.token_url);

        let form = [
            ("grant_type", "client_credentials"),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.expose()),
        ];

        let response = self
            .client
            .post(&self.token_url)
            .header("accept", "application/json")
            .form(&form)
            .send()
            .await
            .map_err(|e| Error::TokenExchange(format!("request to {} failed: {}", self.token_url, e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, "Token endpoint rejected client credentials");
            return Err(Error::TokenExchange(format!(
                "token endpoint returned {}: {}",
                status, body
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| Error::TokenExchange(format!("unparsable token response: {}", e)))?;

        if token.access_token.trim().is_empty() {
            return Err(Error::TokenExchange(
                "token response has an empty access_token".to_string(),
            ));
        }

        Ok(TokenGrant {
            access_token: SecretString::new(token.access_token),
            expires_in: token.expires_in,
            expires_at: token.expires_at.map(|t| t as i64),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_response_parsing_expires_in() {
        let json = r#"{"access_token": "eyJ0eXAi", "token_type": "bearer", "expires_in": 43199, "scope": "uaa.resource"}"#;
        let response: TokenResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.access_token, "eyJ0eXAi");
        assert_eq!(response.expires_in, Some(43199));
        assert!(response.expires_at.is_none());
    }

    #[test]
    fn test_token_response_parsing_float_expires_at() {
        let json = r#"{"access_token": "abc", "expires_at": 1700000000.5}"#;
        let response: TokenResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.expires_at.map(|t| t as i64), Some(1_700_000_000));
    }

    #[test]
    fn test_token_response_without_access_token_fails() {
        let json = r#"{"expires_in": 10}"#;
        assert!(serde_json::from_str::<TokenResponse>(json).is_err());
    }
}
