use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::llm_client::{CredentialMap, ProviderEndpoint, ProviderId};

const DEFAULT_ATTEMPT_TIMEOUT_SECS: u64 = 60;
const MAX_ATTEMPT_TIMEOUT_SECS: u64 = 600;

/// Application configuration loaded from environment variables.
/// Every provider key is optional; requests may bring their own.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// Ceiling on a single provider attempt.
    pub attempt_timeout: Duration,
    /// Preferred provider when a request names none.
    pub default_provider: Option<ProviderId>,
    /// Server-side keys, overlaid by per-request keys.
    pub credentials: CredentialMap,
    /// One resolved endpoint per catalogue row, in declared order.
    pub endpoints: Vec<ProviderEndpoint>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = get("PORT")
            .unwrap_or_else(|| "8080".to_string())
            .trim()
            .parse::<u16>()
            .context("PORT must be a valid port number")?;

        let timeout_secs = match get("LLM_TIMEOUT_SECS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .context("LLM_TIMEOUT_SECS must be a whole number of seconds")?,
            None => DEFAULT_ATTEMPT_TIMEOUT_SECS,
        };
        if !(1..=MAX_ATTEMPT_TIMEOUT_SECS).contains(&timeout_secs) {
            bail!("LLM_TIMEOUT_SECS must be between 1 and {MAX_ATTEMPT_TIMEOUT_SECS}");
        }

        let default_provider = get("DEFAULT_PROVIDER")
            .map(|raw| raw.parse::<ProviderId>())
            .transpose()
            .context("DEFAULT_PROVIDER must name a known provider")?;

        let mut credentials = CredentialMap::new();
        let mut endpoints = Vec::with_capacity(ProviderId::ALL.len());
        for provider in ProviderId::ALL {
            let descriptor = provider.descriptor();
            if let Some(key) = get(descriptor.key_env) {
                credentials.insert(provider, key);
            }

            let mut endpoint = ProviderEndpoint::from(descriptor);
            if let Some(base_url) = get(descriptor.base_url_env) {
                endpoint = endpoint.with_base_url(base_url.trim());
            }
            if let Some(model) = get(descriptor.model_env) {
                endpoint = endpoint.with_model(model.trim());
            }
            endpoints.push(endpoint);
        }

        Ok(Config {
            port,
            rust_log: get("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            attempt_timeout: Duration::from_secs(timeout_secs),
            default_provider,
            credentials,
            endpoints,
        })
    }
}
