//! Provider credentials. Secrets stay inside `secrecy` wrappers and are only
//! exposed at the moment an adapter builds its outbound request.

use std::collections::HashMap;
use std::fmt;

use secrecy::{ExposeSecret, Secret, SecretString};

use crate::llm_client::ProviderId;

/// An API key for exactly one provider. Never blank.
#[derive(Clone)]
pub struct Credential(SecretString);

impl Credential {
    /// Returns `None` for blank input — a blank key means "unavailable".
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(Self(Secret::new(trimmed.to_string())))
    }

    pub fn from_secret(secret: &SecretString) -> Option<Self> {
        Self::new(secret.expose_secret().as_str())
    }

    pub(crate) fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential([REDACTED])")
    }
}

/// The credential set for one run. A provider absent from the map is unavailable.
#[derive(Debug, Clone, Default)]
pub struct CredentialMap {
    inner: HashMap<ProviderId, Credential>,
}

impl CredentialMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores the key for `provider`. Blank keys are ignored; returns whether it was stored.
    pub fn insert(&mut self, provider: ProviderId, raw: impl Into<String>) -> bool {
        match Credential::new(raw) {
            Some(credential) => {
                self.inner.insert(provider, credential);
                true
            }
            None => false,
        }
    }

    pub fn insert_credential(&mut self, provider: ProviderId, credential: Credential) {
        self.inner.insert(provider, credential);
    }

    pub fn get(&self, provider: ProviderId) -> Option<&Credential> {
        self.inner.get(&provider)
    }

    pub fn contains(&self, provider: ProviderId) -> bool {
        self.inner.contains_key(&provider)
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Configured providers in declared priority order.
    pub fn providers(&self) -> Vec<ProviderId> {
        ProviderId::ALL
            .into_iter()
            .filter(|p| self.contains(*p))
            .collect()
    }

    /// Overlays `other` on top of `self`; keys in `other` win.
    pub fn merged_with(&self, other: &CredentialMap) -> CredentialMap {
        let mut merged = self.clone();
        for (provider, credential) in &other.inner {
            merged.inner.insert(*provider, credential.clone());
        }
        merged
    }
}
