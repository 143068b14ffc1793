/// LLM Client — the single point of entry for every provider call in the service.
///
/// ARCHITECTURAL RULE: No other module may talk to an LLM backend directly.
/// Provider differences live in the descriptor table (`providers.rs`); the
/// request/response plumbing lives in one generic adapter (`http_adapter.rs`).
///
/// Adapters make exactly one outbound call per `generate`. There is no retry
/// or backoff anywhere in this module — fallthrough is the sequencer's job.
use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use thiserror::Error;

pub mod credentials;
pub mod http_adapter;
pub mod providers;

pub use credentials::{Credential, CredentialMap};
pub use http_adapter::HttpAdapter;
pub use providers::{ProviderEndpoint, ProviderId, WireFormat};

/// Upper bound on establishing a connection. The overall per-attempt ceiling
/// is enforced by the sequencer.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Why a single provider attempt failed. All kinds are recoverable from the
/// sequencer's point of view; the kind is kept for diagnostics only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Credential rejected (401 / 403).
    Auth,
    /// Rate limit, exhausted quota or unpaid account (429 / 402).
    Quota,
    /// Connection failure or upstream server error.
    Transport,
    /// Malformed, unexpected or empty response.
    Protocol,
    /// The attempt exceeded its time ceiling.
    Timeout,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ErrorKind::Auth => "authentication rejected",
            ErrorKind::Quota => "quota exceeded",
            ErrorKind::Transport => "transport failure",
            ErrorKind::Protocol => "malformed response",
            ErrorKind::Timeout => "timed out",
        };
        f.write_str(label)
    }
}

/// A failed provider attempt. Never carries the credential.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{provider}: {kind}: {message}")]
pub struct AdapterError {
    pub provider: ProviderId,
    pub kind: ErrorKind,
    pub message: String,
}

impl AdapterError {
    pub fn new(provider: ProviderId, kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            provider,
            kind,
            message: message.into(),
        }
    }
}

/// Uniform call contract over one LLM backend.
///
/// Implementations return the generated text verbatim (no trimming, no
/// markdown post-processing) and never retry.
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    fn provider(&self) -> ProviderId;

    async fn generate(&self, prompt: &str, credential: &Credential) -> Result<String, AdapterError>;
}

/// Builds the shared HTTP client used by every `HttpAdapter`.
pub fn build_http_client() -> Result<Client, reqwest::Error> {
    Client::builder().connect_timeout(CONNECT_TIMEOUT).build()
}
