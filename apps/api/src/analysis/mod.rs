// Fit analysis: request construction, attempt ordering and provider failover.
// All LLM calls go through llm_client — no direct HTTP calls here.

pub mod handlers;
pub mod order;
pub mod prompts;
pub mod request;
pub mod sequencer;
