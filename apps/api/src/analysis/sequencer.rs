//! Failover Sequencer — runs an `AttemptOrder` against one `AnalysisRequest`.
//!
//! Algorithm (single pass, no backtracking):
//! 1. Walk the order left to right.
//! 2. Call the provider's adapter once, bounded by `attempt_timeout`.
//! 3. First success wins; nothing after it is attempted.
//! 4. Failures are recorded in attempt order and the walk continues.
//! 5. Exhausting the order with no success yields `TotalFailure` with every cause.
//!
//! An empty credential set is a precondition failure, reported before any attempt.
//! Per-run state lives on the stack of `run`, so a failed run leaves nothing behind.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::Client;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::analysis::order::AttemptOrder;
use crate::analysis::request::AnalysisRequest;
use crate::llm_client::{
    AdapterError, Credential, CredentialMap, ErrorKind, HttpAdapter, ProviderAdapter,
    ProviderEndpoint, ProviderId,
};

/// Outcome of one provider attempt.
pub type AttemptResult = Result<String, AdapterError>;

/// A successful run: the report, who produced it, and who failed before it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub provider: ProviderId,
    pub report: String,
    pub failed_attempts: Vec<AdapterError>,
}

/// Terminal state of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SequencerOutcome {
    Rendered(Rendered),
    /// Every attempted provider failed. Causes are in attempt order.
    TotalFailure(Vec<AdapterError>),
    /// Nothing could be attempted: no provider had a credential.
    PreconditionFailed,
}

impl SequencerOutcome {
    pub fn into_result(self) -> Result<Rendered, AnalysisError> {
        match self {
            SequencerOutcome::Rendered(rendered) => Ok(rendered),
            SequencerOutcome::TotalFailure(causes) => Err(AnalysisError::TotalFailure(causes)),
            SequencerOutcome::PreconditionFailed => Err(AnalysisError::PreconditionFailed),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    #[error("no provider credential configured")]
    PreconditionFailed,

    #[error("all providers failed:\n{}", render_causes(.0))]
    TotalFailure(Vec<AdapterError>),
}

/// One line per attempted provider, in attempt order.
pub fn render_causes(causes: &[AdapterError]) -> String {
    causes
        .iter()
        .map(|cause| format!("- {cause}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Owns one adapter per provider and the per-attempt time ceiling.
pub struct Sequencer {
    adapters: HashMap<ProviderId, Arc<dyn ProviderAdapter>>,
    attempt_timeout: Duration,
}

impl Sequencer {
    pub fn new(attempt_timeout: Duration) -> Self {
        Self {
            adapters: HashMap::new(),
            attempt_timeout,
        }
    }

    /// Registers (or replaces) the adapter for `adapter.provider()`.
    pub fn with_adapter(mut self, adapter: Arc<dyn ProviderAdapter>) -> Self {
        self.adapters.insert(adapter.provider(), adapter);
        self
    }

    /// One `HttpAdapter` per endpoint, all sharing `client`.
    pub fn from_endpoints(
        client: Client,
        endpoints: impl IntoIterator<Item = ProviderEndpoint>,
        attempt_timeout: Duration,
    ) -> Self {
        endpoints
            .into_iter()
            .fold(Self::new(attempt_timeout), |sequencer, endpoint| {
                sequencer.with_adapter(Arc::new(HttpAdapter::new(client.clone(), endpoint)))
            })
    }

    /// Builds the attempt order from `preferred` and `credentials`, then runs it.
    pub async fn run_analysis(
        &self,
        request: &AnalysisRequest,
        preferred: Option<ProviderId>,
        credentials: &CredentialMap,
    ) -> SequencerOutcome {
        if credentials.is_empty() {
            warn!("Analysis rejected: no provider credential configured");
            return SequencerOutcome::PreconditionFailed;
        }

        let order = AttemptOrder::for_credentials(preferred, credentials);
        self.run(request, &order, credentials).await
    }

    /// Runs `order` to its first success or to exhaustion.
    ///
    /// Entries without a credential or without a registered adapter are skipped
    /// and never reach an adapter.
    pub async fn run(
        &self,
        request: &AnalysisRequest,
        order: &AttemptOrder,
        credentials: &CredentialMap,
    ) -> SequencerOutcome {
        info!(
            "Starting analysis: order={:?}, jd={} chars, resume={} chars",
            order.as_slice(),
            request.jd_text().len(),
            request.resume_text().len()
        );

        if order.is_empty() {
            warn!("Analysis rejected: empty attempt order");
            return SequencerOutcome::PreconditionFailed;
        }

        let mut causes: Vec<AdapterError> = Vec::new();
        let mut attempted = 0usize;
        let mut skipped = 0usize;

        for provider in order.iter() {
            let Some(credential) = credentials.get(provider) else {
                warn!("Skipping {provider}: no credential");
                skipped += 1;
                continue;
            };
            let Some(adapter) = self.adapters.get(&provider) else {
                warn!("Skipping {provider}: no adapter registered");
                skipped += 1;
                continue;
            };

            attempted += 1;
            let started = Instant::now();

            match self.attempt(adapter.as_ref(), request.prompt(), credential).await {
                Ok(report) => {
                    info!(
                        "Analysis rendered by {provider} (attempt {attempted}, {} skipped, {}ms)",
                        skipped,
                        started.elapsed().as_millis()
                    );
                    return SequencerOutcome::Rendered(Rendered {
                        provider,
                        report,
                        failed_attempts: causes,
                    });
                }
                Err(cause) => {
                    warn!(
                        "{provider} failed ({}) after {}ms, falling through: {}",
                        cause.kind,
                        started.elapsed().as_millis(),
                        cause.message
                    );
                    causes.push(cause);
                }
            }
        }

        if attempted == 0 {
            warn!("Analysis rejected: no attemptable provider in {:?}", order.as_slice());
            return SequencerOutcome::PreconditionFailed;
        }

        error!(
            "All {} provider(s) failed:\n{}",
            causes.len(),
            render_causes(&causes)
        );
        SequencerOutcome::TotalFailure(causes)
    }

    /// A single bounded call. Exceeding the ceiling is a `Timeout` failure.
    async fn attempt(
        &self,
        adapter: &dyn ProviderAdapter,
        prompt: &str,
        credential: &Credential,
    ) -> AttemptResult {
        match tokio::time::timeout(self.attempt_timeout, adapter.generate(prompt, credential)).await
        {
            Ok(result) => result,
            Err(_) => Err(AdapterError::new(
                adapter.provider(),
                ErrorKind::Timeout,
                format!("no response within {}s", self.attempt_timeout.as_secs()),
            )),
        }
    }
}
