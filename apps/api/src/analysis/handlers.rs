//! Axum route handlers for the Analysis API.

use std::collections::{HashMap, HashSet};

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use tracing::{info_span, Instrument};
use uuid::Uuid;

use crate::analysis::request::AnalysisRequest;
use crate::errors::AppError;
use crate::llm_client::{AdapterError, Credential, CredentialMap, ProviderId, WireFormat};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RunAnalysisRequest {
    pub jd_text: String,
    pub resume_text: String,
    #[serde(default)]
    pub preferred_provider: Option<String>,
    /// Per-request keys keyed by provider id. Overlay the server's keys.
    #[serde(default)]
    pub api_keys: HashMap<String, SecretString>,
}

#[derive(Debug, Serialize)]
pub struct RunAnalysisResponse {
    pub run_id: Uuid,
    pub provider: ProviderId,
    pub provider_name: &'static str,
    pub report: String,
    pub failed_attempts: Vec<AdapterError>,
    pub completed_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ProviderInfo {
    pub id: ProviderId,
    pub name: &'static str,
    pub wire_format: WireFormat,
    pub model: String,
    pub configured: bool,
}

#[derive(Debug, Serialize)]
pub struct ProvidersResponse {
    pub providers: Vec<ProviderInfo>,
    pub default_provider: Option<ProviderId>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/analysis
///
/// Runs the fit analysis with provider failover and returns the first report produced.
pub async fn handle_run_analysis(
    State(state): State<AppState>,
    Json(request): Json<RunAnalysisRequest>,
) -> Result<Json<RunAnalysisResponse>, AppError> {
    if request.jd_text.trim().is_empty() {
        return Err(AppError::Validation("jd_text cannot be empty".to_string()));
    }
    if request.resume_text.trim().is_empty() {
        return Err(AppError::Validation("resume_text cannot be empty".to_string()));
    }

    let preferred = match request.preferred_provider.as_deref().map(str::trim) {
        None | Some("") => state.config.default_provider,
        Some(raw) => Some(
            raw.parse::<ProviderId>()
                .map_err(|e| AppError::Validation(e.to_string()))?,
        ),
    };

    let request_keys = parse_api_keys(&request.api_keys)?;
    let credentials = state.config.credentials.merged_with(&request_keys);

    let analysis = AnalysisRequest::new(request.jd_text, request.resume_text);
    let run_id = Uuid::new_v4();

    let rendered = state
        .sequencer
        .run_analysis(&analysis, preferred, &credentials)
        .instrument(info_span!("analysis", %run_id))
        .await
        .into_result()?;

    Ok(Json(RunAnalysisResponse {
        run_id,
        provider: rendered.provider,
        provider_name: rendered.provider.descriptor().display_name,
        report: rendered.report,
        failed_attempts: rendered.failed_attempts,
        completed_at: Utc::now(),
    }))
}

/// GET /api/v1/providers
///
/// Lists the provider catalogue and which providers have a server-side key.
pub async fn handle_list_providers(State(state): State<AppState>) -> Json<ProvidersResponse> {
    let providers = state
        .config
        .endpoints
        .iter()
        .map(|endpoint| ProviderInfo {
            id: endpoint.provider,
            name: endpoint.provider.descriptor().display_name,
            wire_format: endpoint.wire_format,
            model: endpoint.model.clone(),
            configured: state.config.credentials.contains(endpoint.provider),
        })
        .collect();

    Json(ProvidersResponse {
        providers,
        default_provider: state.config.default_provider,
    })
}

/// Turns `{provider_id: key}` into a credential map. Blank keys are dropped;
/// unknown provider ids and two names for the same provider are rejected.
fn parse_api_keys(raw: &HashMap<String, SecretString>) -> Result<CredentialMap, AppError> {
    let mut credentials = CredentialMap::new();
    let mut seen = HashSet::new();
    for (name, secret) in raw {
        let provider = name
            .parse::<ProviderId>()
            .map_err(|e| AppError::Validation(e.to_string()))?;
        if !seen.insert(provider) {
            return Err(AppError::Validation(format!(
                "api_keys names provider '{}' more than once",
                provider.as_str()
            )));
        }
        if let Some(credential) = Credential::from_secret(secret) {
            credentials.insert_credential(provider, credential);
        }
    }
    Ok(credentials)
}
