pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::analysis::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/providers", get(handlers::handle_list_providers))
        .route("/api/v1/analysis", post(handlers::handle_run_analysis))
        .with_state(state)
}
