//! Attempt ordering — preferred provider first, then the rest in declared order.

use crate::llm_client::{CredentialMap, ProviderId};

/// The authoritative priority for one run. Never contains duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttemptOrder(Vec<ProviderId>);

impl AttemptOrder {
    /// Builds an order from an explicit sequence, keeping the first occurrence of each provider.
    pub fn new(providers: impl IntoIterator<Item = ProviderId>) -> Self {
        let mut order = Vec::new();
        for provider in providers {
            if !order.contains(&provider) {
                order.push(provider);
            }
        }
        Self(order)
    }

    /// Orders every credentialed provider: `preferred` first when it has a
    /// credential, then the remaining ones in declared order. A preference
    /// without a credential is ignored.
    pub fn for_credentials(preferred: Option<ProviderId>, credentials: &CredentialMap) -> Self {
        let head = preferred.filter(|p| credentials.contains(*p));
        Self::new(head.into_iter().chain(credentials.providers()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = ProviderId> + '_ {
        self.0.iter().copied()
    }

    pub fn as_slice(&self) -> &[ProviderId] {
        &self.0
    }
}
