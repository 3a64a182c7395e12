use anyhow::{bail, Result};
use chrono::{TimeZone, Utc};

use super::Overrides;
use crate::config::Config;
use crate::llm::factory;

/// One line of the config-check report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub item: &'static str,
    pub ok: bool,
    pub detail: String,
}

impl Finding {
    fn from_result<T>(item: &'static str, result: crate::error::Result<T>, ok_detail: impl FnOnce(T) -> String) -> Self {
        match result {
            Ok(v) => Finding {
                item,
                ok: true,
                detail: ok_detail(v),
            },
            Err(e) => Finding {
                item,
                ok: false,
                detail: e.to_string(),
            },
        }
    }
}

/// Check every section a live run needs
pub fn inspect(config: &Config) -> Vec<Finding> {
    vec![
        Finding::from_result("generation", config.validate(), |_| {
            format!(
                "max_test_cases = {}, prompt_ceiling = {}, default_count = {}",
                config.generation.max_test_cases,
                config.generation.prompt_ceiling,
                config.generation.default_count
            )
        }),
        Finding::from_result("llm", config.llm_settings(), |s| {
            format!("model {} at {}", s.model, s.endpoint_url)
        }),
        Finding::from_result("auth", config.auth_settings(), |s| {
            format!(
                "client {} via {} (leeway {}s)",
                s.client_id, s.token_url, s.leeway_secs
            )
        }),
    ]
}

pub async fn run(config_path: Option<String>, overrides: Overrides, check_auth: bool) -> Result<()> {
    // Unvalidated, so bad bounds show up as a finding instead of an early exit
    let config = super::resolve_config(config_path, &overrides)?;

    println!("Resolved configuration (secrets masked):\n");
    println!("{}", toml::to_string(&config)?);

    let findings = inspect(&config);
    for f in &findings {
        println!("[{}] {}: {}", if f.ok { "ok" } else { "FAIL" }, f.item, f.detail);
    }
    let failed = findings.iter().filter(|f| !f.ok).count();

    if check_auth && failed == 0 {
        let gate = factory::create_gate(&config)?;
        gate.get_token().await?;
        if let Some(credential) = gate.cached().await {
            let expiry = Utc
                .timestamp_opt(credential.expires_at, 0)
                .single()
                .map(|t| t.to_rfc3339())
                .unwrap_or_else(|| credential.expires_at.to_string());
            println!(
                "[ok] token: {} (expires {})",
                credential.token.preview(),
                expiry
            );
        }
    }

    if failed > 0 {
        bail!("{} configuration check(s) failed", failed);
    }
    Ok(())
}
