use std::sync::Arc;

use anyhow::{Context, Result};

use crate::analysis::sequencer::Sequencer;
use crate::config::Config;
use crate::llm_client::build_http_client;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// One adapter per provider endpoint. Runs never share per-run state.
    pub sequencer: Arc<Sequencer>,
    pub config: Config,
}

impl AppState {
    /// Wires one HTTP adapter per configured endpoint behind a shared client.
    pub fn from_config(config: Config) -> Result<Self> {
        let client = build_http_client().context("Failed to build HTTP client")?;
        let sequencer = Sequencer::from_endpoints(
            client,
            config.endpoints.iter().cloned(),
            config.attempt_timeout,
        );

        Ok(Self {
            sequencer: Arc::new(sequencer),
            config,
        })
    }
}
