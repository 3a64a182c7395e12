use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::util::SecretString;

/// Seconds since the Unix epoch.
pub trait Clock: Send + Sync {
    fn now(&self) -> i64;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> i64 {
        Utc::now().timestamp()
    }
}

/// Raw answer of a token endpoint, before an absolute expiry is fixed.
#[derive(Debug, Clone)]
pub struct TokenGrant {
    pub access_token: SecretString,
    pub expires_in: Option<i64>,
    pub expires_at: Option<i64>,
}

/// Anything that can mint a fresh bearer token.
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn fetch(&self) -> Result<TokenGrant>;
}

#[derive(Debug, Clone)]
pub struct Credential {
    pub token: SecretString,
    pub expires_at: i64,
}

impl Credential {
    /// Usable while `now + leeway` has not passed the declared expiry.
    pub fn is_fresh(&self, now: i64, leeway_secs: i64) -> bool {
        now.saturating_add(leeway_secs) <= self.expires_at
    }

    fn from_grant(grant: TokenGrant, now: i64) -> Result<Self> {
        let expires_at = grant
            .expires_at
            .or_else(|| grant.expires_in.map(|secs| now.saturating_add(secs)))
            .ok_or_else(|| {
                Error::TokenExchange("token response carries neither expires_at nor expires_in".to_string())
            })?;
        Ok(Self {
            token: grant.access_token,
            expires_at,
        })
    }
}

/// Caches one credential and renews it through a [`TokenSource`].
///
/// The cache lock is held across the exchange, so concurrent callers that all
/// find a stale token wait for a single renewal instead of racing.
pub struct CredentialGate {
    source: Box<dyn TokenSource>,
    clock: Box<dyn Clock>,
    leeway_secs: i64,
    cached: Mutex<Option<Credential>>,
}

impl CredentialGate {
    pub fn new(source: Box<dyn TokenSource>, leeway_secs: i64) -> Self {
        Self {
            source,
            clock: Box::new(SystemClock),
            leeway_secs,
            cached: Mutex::new(None),
        }
    }

    pub fn with_clock(mut self, clock: Box<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Return the cached token, renewing it first when it is within the leeway
    /// of its expiry. Exchange failures propagate; nothing is retried.
    pub async fn get_token(&self) -> Result<SecretString> {
        let mut cached = self.cached.lock().await;
        let now = self.clock.now();

        if let Some(ref credential) = *cached {
            if credential.is_fresh(now, self.leeway_secs) {
                debug!(
                    "Using cached token (expires in {} seconds)",
                    credential.expires_at - now
                );
                return Ok(credential.token.clone());
            }
            debug!("Cached token is within the renewal leeway, exchanging");
        }

        let grant = self.source.fetch().await?;
        // Re-read the clock: the exchange may have taken a while.
        let credential = Credential::from_grant(grant, self.clock.now())?;
        info!(
            expires_at = credential.expires_at,
            token_preview = %credential.token.preview(),
            "Obtained new access token"
        );

        let token = credential.token.clone();
        *cached = Some(credential);
        Ok(token)
    }

    /// Currently cached credential, without triggering a renewal.
    pub async fn cached(&self) -> Option<Credential> {
        self.cached.lock().await.clone()
    }
}
