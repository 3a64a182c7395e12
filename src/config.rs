use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, warn};

use crate::error::Error;
use crate::util::SecretString;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
    #[serde(default)]
    pub prompts: PromptsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Model identifier, also used as the deployment model name (env: MODEL)
    #[serde(default)]
    pub model: Option<String>,
    /// Sampling temperature (env: TEMPERATURE)
    #[serde(default)]
    pub temperature: Option<f32>,
    /// Completion token budget (env: MAX_TOKENS)
    #[serde(default)]
    pub max_tokens: Option<u32>,
    #[serde(default = "default_api_version")]
    pub api_version: String,
    /// Base URL of the inference API (env: AI_API_URL)
    #[serde(default)]
    pub api_url: Option<String>,
    /// Deployment the chat completions are routed to (env: AI_DEPLOYMENT_ID)
    #[serde(default)]
    pub deployment_id: Option<String>,
    #[serde(default = "default_resource_group")]
    pub resource_group: String,
    /// HTTP timeout for every external call, in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: None,
            temperature: None,
            max_tokens: None,
            api_version: default_api_version(),
            api_url: None,
            deployment_id: None,
            resource_group: default_resource_group(),
            timeout_secs: default_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// OAuth2 provider base URL; `/oauth/token` is appended (env: AI_PROVIDER_URL)
    #[serde(default)]
    pub provider_url: Option<String>,
    #[serde(default)]
    pub client_id: Option<String>,
    /// Prefer the AI_CLIENT_SECRET environment variable over the config file
    #[serde(default)]
    pub client_secret: Option<SecretString>,
    /// Seconds before the declared expiry at which a token is renewed (env: LEEWAY)
    #[serde(default = "default_leeway")]
    pub leeway_secs: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            provider_url: None,
            client_id: None,
            client_secret: None,
            leeway_secs: default_leeway(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Largest count a user may request (env: MAX_TEST_CASES)
    #[serde(default = "default_max_test_cases")]
    pub max_test_cases: usize,

    /// Upper bound written into the generation prompt. Independent of
    /// `max_test_cases` but never smaller than it.
    #[serde(default = "default_prompt_ceiling")]
    pub prompt_ceiling: usize,

    /// Count used when the user does not choose one
    #[serde(default = "default_count")]
    pub default_count: usize,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_test_cases: default_max_test_cases(),
            prompt_ceiling: default_prompt_ceiling(),
            default_count: default_count(),
        }
    }
}

/// Extra instructions appended to the fixed prompts
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PromptsConfig {
    #[serde(default)]
    pub detect_custom: Option<String>,
    #[serde(default)]
    pub generate_custom: Option<String>,
}

fn default_api_version() -> String {
    "2023-05-15".to_string()
}

fn default_resource_group() -> String {
    "default".to_string()
}

fn default_timeout() -> u64 {
    120
}

fn default_leeway() -> i64 {
    100
}

fn default_max_test_cases() -> usize {
    10
}

fn default_prompt_ceiling() -> usize {
    20
}

fn default_count() -> usize {
    3
}

/// Everything the completion client needs, fully resolved.
#[derive(Debug, Clone)]
pub struct LlmSettings {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub api_version: String,
    pub endpoint_url: String,
    pub resource_group: String,
    pub timeout_secs: u64,
}

/// Everything the credential gate needs, fully resolved.
#[derive(Debug, Clone)]
pub struct AuthSettings {
    pub token_url: String,
    pub client_id: String,
    pub client_secret: SecretString,
    pub leeway_secs: i64,
    pub timeout_secs: u64,
}

/// Service instance looked up when `AICORE_SERVICE_NAME` is not set
pub const DEFAULT_SERVICE_NAME: &str = "aicore";

#[derive(Debug, Deserialize)]
struct ServiceBinding {
    #[serde(default)]
    credentials: ServiceCredentials,
}

#[derive(Debug, Default, Deserialize)]
struct ServiceCredentials {
    url: Option<String>,
    clientid: Option<String>,
    clientsecret: Option<String>,
    #[serde(default)]
    serviceurls: ServiceUrls,
}

#[derive(Debug, Default, Deserialize)]
struct ServiceUrls {
    #[serde(rename = "AI_API_URL")]
    ai_api_url: Option<String>,
}

fn parse_env<T: FromStr>(key: &str, value: &str) -> crate::error::Result<T> {
    value.trim().parse::<T>().map_err(|_| Error::ConfigInvalid {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn require<T: Clone>(value: &Option<T>, key: &str) -> crate::error::Result<T> {
    value
        .clone()
        .ok_or_else(|| Error::ConfigMissing(key.to_string()))
}

fn require_str(value: &Option<String>, key: &str) -> crate::error::Result<String> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(Error::ConfigMissing(key.to_string())),
    }
}

impl Config {
    /// Load configuration from a specific path, or use default search paths
    pub fn load_with_path(path: Option<String>) -> Result<Self> {
        if let Some(config_path) = path {
            debug!("Loading config from explicit path: {}", config_path);
            return Self::load_from_path(&config_path);
        }

        let mut candidates = vec![PathBuf::from("casegen.toml")];
        if let Some(config_dir) = dirs::config_dir() {
            candidates.push(config_dir.join("casegen").join("config.toml"));
        }

        match Self::load_first_existing(&candidates)? {
            Some(config) => Ok(config),
            None => {
                debug!("Using default config");
                Ok(Self::default())
            }
        }
    }

    /// Load the first candidate that exists. A file that exists but cannot be
    /// read or parsed is an error, not a reason to try the next one.
    pub fn load_first_existing(candidates: &[PathBuf]) -> Result<Option<Self>> {
        for candidate in candidates {
            if !candidate.is_file() {
                continue;
            }
            let config = Self::load_from_path(candidate)?;
            debug!("Loaded config from {:?}", candidate);
            return Ok(Some(config));
        }
        Ok(None)
    }

    fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    /// Overlay values from the process environment
    pub fn apply_env(&mut self) -> crate::error::Result<()> {
        self.apply_env_from(|key| env::var(key).ok())
    }

    /// Overlay values from an arbitrary key lookup. Blank values are ignored.
    pub fn apply_env_from<F>(&mut self, lookup: F) -> crate::error::Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        // Platform service binding first, so explicit variables still win.
        // ENV=LOCAL skips it.
        let local = get("ENV").is_some_and(|v| v.trim().eq_ignore_ascii_case("local"));
        if let Some(vcap) = get("VCAP_SERVICES").filter(|_| !local) {
            let name = get("AICORE_SERVICE_NAME").unwrap_or_else(|| DEFAULT_SERVICE_NAME.to_string());
            self.apply_service_binding(&vcap, name.trim())?;
        }

        if let Some(v) = get("MODEL") {
            self.llm.model = Some(v);
        }
        if let Some(v) = get("TEMPERATURE") {
            self.llm.temperature = Some(parse_env("TEMPERATURE", &v)?);
        }
        if let Some(v) = get("MAX_TOKENS") {
            self.llm.max_tokens = Some(parse_env("MAX_TOKENS", &v)?);
        }
        if let Some(v) = get("API_VERSION") {
            self.llm.api_version = v;
        }
        if let Some(v) = get("AI_API_URL") {
            self.llm.api_url = Some(v);
        }
        if let Some(v) = get("AI_DEPLOYMENT_ID") {
            self.llm.deployment_id = Some(v);
        }
        if let Some(v) = get("AI_RESOURCE_GROUP") {
            self.llm.resource_group = v;
        }
        if let Some(v) = get("AI_PROVIDER_URL") {
            self.auth.provider_url = Some(v);
        }
        if let Some(v) = get("AI_CLIENT_ID") {
            self.auth.client_id = Some(v);
        }
        if let Some(v) = get("AI_CLIENT_SECRET") {
            self.auth.client_secret = Some(SecretString::new(v));
        }
        if let Some(v) = get("LEEWAY") {
            self.auth.leeway_secs = parse_env("LEEWAY", &v)?;
        }
        if let Some(v) = get("MAX_TEST_CASES") {
            self.generation.max_test_cases = parse_env("MAX_TEST_CASES", &v)?;
        }
        Ok(())
    }

    /// Fill the credentials and API URL from the AI service instance named
    /// `service_name` in a `VCAP_SERVICES` document. Fields the binding lacks
    /// are left alone; a missing instance only logs a warning.
    pub fn apply_service_binding(&mut self, vcap_services: &str, service_name: &str) -> crate::error::Result<()> {
        let services: HashMap<String, Vec<serde_json::Value>> = serde_json::from_str(vcap_services)
            .map_err(|e| Error::ConfigInvalid {
                key: "VCAP_SERVICES".to_string(),
                value: e.to_string(),
            })?;

        let Some(instance) = services
            .into_values()
            .flatten()
            .find(|svc| svc.get("name").and_then(|n| n.as_str()) == Some(service_name))
        else {
            warn!("No service named '{}' in VCAP_SERVICES", service_name);
            return Ok(());
        };

        let binding: ServiceBinding = serde_json::from_value(instance).map_err(|e| Error::ConfigInvalid {
            key: format!("VCAP_SERVICES.{}", service_name),
            value: e.to_string(),
        })?;
        let creds = binding.credentials;

        if let Some(url) = creds.url {
            self.auth.provider_url = Some(url);
        }
        if let Some(id) = creds.clientid {
            self.auth.client_id = Some(id);
        }
        if let Some(secret) = creds.clientsecret {
            self.auth.client_secret = Some(SecretString::new(secret));
        }
        if let Some(api_url) = creds.serviceurls.ai_api_url {
            self.llm.api_url = Some(api_url);
        }
        debug!("Applied service binding '{}'", service_name);
        Ok(())
    }

    /// Check the values that have defaults and so cannot be "missing"
    pub fn validate(&self) -> crate::error::Result<()> {
        let gen = &self.generation;
        if gen.max_test_cases == 0 {
            return Err(Error::ConfigInvalid {
                key: "generation.max_test_cases".to_string(),
                value: "0".to_string(),
            });
        }
        if gen.prompt_ceiling < gen.max_test_cases {
            return Err(Error::ConfigInvalid {
                key: "generation.prompt_ceiling".to_string(),
                value: format!(
                    "{} (must be at least max_test_cases = {})",
                    gen.prompt_ceiling, gen.max_test_cases
                ),
            });
        }
        if gen.default_count == 0 || gen.default_count > gen.max_test_cases {
            return Err(Error::ConfigInvalid {
                key: "generation.default_count".to_string(),
                value: format!(
                    "{} (must be within 1..={})",
                    gen.default_count, gen.max_test_cases
                ),
            });
        }
        if self.auth.leeway_secs < 0 {
            return Err(Error::ConfigInvalid {
                key: "auth.leeway_secs".to_string(),
                value: self.auth.leeway_secs.to_string(),
            });
        }
        Ok(())
    }

    pub fn llm_settings(&self) -> crate::error::Result<LlmSettings> {
        let llm = &self.llm;
        let model = require_str(&llm.model, "MODEL")?;
        let temperature = require(&llm.temperature, "TEMPERATURE")?;
        let max_tokens = require(&llm.max_tokens, "MAX_TOKENS")?;
        let api_url = require_str(&llm.api_url, "AI_API_URL")?;
        let deployment_id = require_str(&llm.deployment_id, "AI_DEPLOYMENT_ID")?;

        let endpoint_url = format!(
            "{}/v2/inference/deployments/{}/chat/completions?api-version={}",
            api_url.trim_end_matches('/'),
            deployment_id,
            llm.api_version
        );

        Ok(LlmSettings {
            model,
            temperature,
            max_tokens,
            api_version: llm.api_version.clone(),
            endpoint_url,
            resource_group: llm.resource_group.clone(),
            timeout_secs: llm.timeout_secs,
        })
    }

    pub fn auth_settings(&self) -> crate::error::Result<AuthSettings> {
        let auth = &self.auth;
        let provider_url = require_str(&auth.provider_url, "AI_PROVIDER_URL")?;
        let client_id = require_str(&auth.client_id, "AI_CLIENT_ID")?;
        let client_secret = match &auth.client_secret {
            Some(secret) if !secret.is_empty() => secret.clone(),
            _ => return Err(Error::ConfigMissing("AI_CLIENT_SECRET".to_string())),
        };

        let base = provider_url.trim_end_matches('/');
        let token_url = if base.ends_with("/oauth/token") {
            base.to_string()
        } else {
            format!("{}/oauth/token", base)
        };

        Ok(AuthSettings {
            token_url,
            client_id,
            client_secret,
            leeway_secs: auth.leeway_secs,
            timeout_secs: self.llm.timeout_secs,
        })
    }
}
