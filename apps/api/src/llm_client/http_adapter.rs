//! Generic HTTP adapter. One implementation serves every provider; the
//! `ProviderEndpoint` decides URL, auth header, body shape and text extraction.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::llm_client::{
    AdapterError, Credential, ErrorKind, ProviderAdapter, ProviderEndpoint, ProviderId, WireFormat,
};

/// Longest slice of a raw error body echoed back in a diagnostic.
const MAX_ERROR_BODY_CHARS: usize = 200;

// ── OpenAI-compatible chat completions ──────────────────────────────────────

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

// ── Gemini generateContent ──────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct GeminiRequest<'a> {
    contents: Vec<GeminiContent<'a>>,
}

#[derive(Debug, Serialize)]
struct GeminiContent<'a> {
    parts: Vec<GeminiPart<'a>>,
}

#[derive(Debug, Serialize)]
struct GeminiPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiCandidateContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidateContent {
    #[serde(default)]
    parts: Vec<GeminiCandidatePart>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidatePart {
    text: Option<String>,
}

/// `{"error": {"message": "..."}}` — shared by OpenAI-style backends and Gemini.
#[derive(Debug, Deserialize)]
struct ProviderErrorEnvelope {
    error: ProviderErrorBody,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    message: String,
}

/// Adapter for one configured provider endpoint.
#[derive(Clone)]
pub struct HttpAdapter {
    client: Client,
    endpoint: ProviderEndpoint,
}

impl HttpAdapter {
    pub fn new(client: Client, endpoint: ProviderEndpoint) -> Self {
        Self { client, endpoint }
    }

    fn build_request(&self, prompt: &str, credential: &Credential) -> RequestBuilder {
        let request = self.client.post(self.endpoint.url());
        match self.endpoint.wire_format {
            WireFormat::OpenAiChat => request.bearer_auth(credential.expose()).json(&ChatRequest {
                model: &self.endpoint.model,
                messages: vec![ChatMessage {
                    role: "user",
                    content: prompt,
                }],
            }),
            WireFormat::GeminiGenerate => request
                .header("x-goog-api-key", credential.expose())
                .json(&GeminiRequest {
                    contents: vec![GeminiContent {
                        parts: vec![GeminiPart { text: prompt }],
                    }],
                }),
        }
    }

    fn error(&self, kind: ErrorKind, message: impl Into<String>) -> AdapterError {
        AdapterError::new(self.endpoint.provider, kind, message)
    }

    fn transport_error(&self, err: reqwest::Error) -> AdapterError {
        let kind = if err.is_timeout() {
            ErrorKind::Timeout
        } else {
            ErrorKind::Transport
        };
        // Strip the URL so query strings never leak into diagnostics.
        self.error(kind, err.without_url().to_string())
    }
}

#[async_trait]
impl ProviderAdapter for HttpAdapter {
    fn provider(&self) -> ProviderId {
        self.endpoint.provider
    }

    async fn generate(&self, prompt: &str, credential: &Credential) -> Result<String, AdapterError> {
        let response = self
            .build_request(prompt, credential)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| self.transport_error(e))?;

        if !status.is_success() {
            return Err(self.error(kind_for_status(status), describe_failure(status, &body)));
        }

        let text = extract_text(self.endpoint.wire_format, &body)
            .map_err(|message| self.error(ErrorKind::Protocol, message))?;

        debug!(
            "{} returned {} chars (model: {})",
            self.endpoint.provider,
            text.len(),
            self.endpoint.model
        );

        Ok(text)
    }
}

/// Maps a non-success HTTP status onto the failure taxonomy.
fn kind_for_status(status: StatusCode) -> ErrorKind {
    match status.as_u16() {
        401 | 403 => ErrorKind::Auth,
        402 | 429 => ErrorKind::Quota,
        408 => ErrorKind::Timeout,
        s if s >= 500 => ErrorKind::Transport,
        _ => ErrorKind::Protocol,
    }
}

/// Prefers the provider's own error message over the raw body. Either is clipped.
fn describe_failure(status: StatusCode, body: &str) -> String {
    let message: String = serde_json::from_str::<ProviderErrorEnvelope>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.to_string())
        .trim()
        .chars()
        .take(MAX_ERROR_BODY_CHARS)
        .collect();

    if message.is_empty() {
        format!("HTTP {}", status.as_u16())
    } else {
        format!("HTTP {}: {message}", status.as_u16())
    }
}

/// Pulls the generated text out of a success body. The text is returned verbatim.
fn extract_text(format: WireFormat, body: &str) -> Result<String, String> {
    let text = match format {
        WireFormat::OpenAiChat => {
            let parsed: ChatResponse = serde_json::from_str(body)
                .map_err(|e| format!("undecodable chat completion: {e}"))?;
            parsed
                .choices
                .into_iter()
                .next()
                .and_then(|c| c.message.content)
                .ok_or_else(|| "response contained no choices".to_string())?
        }
        WireFormat::GeminiGenerate => {
            let parsed: GeminiResponse = serde_json::from_str(body)
                .map_err(|e| format!("undecodable generateContent response: {e}"))?;
            let content = parsed
                .candidates
                .into_iter()
                .next()
                .and_then(|c| c.content)
                .ok_or_else(|| "response contained no candidates".to_string())?;
            content
                .parts
                .into_iter()
                .filter_map(|p| p.text)
                .collect::<String>()
        }
    };

    if text.trim().is_empty() {
        return Err("provider returned empty text".to_string());
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credential() -> Credential {
        Credential::new("sk-test").unwrap()
    }

    fn adapter_for(provider: ProviderId, base_url: &str) -> HttpAdapter {
        let endpoint = ProviderEndpoint::from(provider.descriptor()).with_base_url(base_url);
        HttpAdapter::new(Client::new(), endpoint)
    }

    #[test]
    fn test_kind_for_status_mapping() {
        assert_eq!(kind_for_status(StatusCode::UNAUTHORIZED), ErrorKind::Auth);
        assert_eq!(kind_for_status(StatusCode::FORBIDDEN), ErrorKind::Auth);
        assert_eq!(kind_for_status(StatusCode::PAYMENT_REQUIRED), ErrorKind::Quota);
        assert_eq!(kind_for_status(StatusCode::TOO_MANY_REQUESTS), ErrorKind::Quota);
        assert_eq!(kind_for_status(StatusCode::REQUEST_TIMEOUT), ErrorKind::Timeout);
        assert_eq!(kind_for_status(StatusCode::BAD_GATEWAY), ErrorKind::Transport);
        assert_eq!(kind_for_status(StatusCode::BAD_REQUEST), ErrorKind::Protocol);
        assert_eq!(kind_for_status(StatusCode::NOT_FOUND), ErrorKind::Protocol);
    }

    #[test]
    fn test_describe_failure_uses_provider_message() {
        let body = r#"{"error": {"message": "Invalid API Key", "type": "invalid_request_error"}}"#;
        assert_eq!(
            describe_failure(StatusCode::UNAUTHORIZED, body),
            "HTTP 401: Invalid API Key"
        );
    }

    #[test]
    fn test_describe_failure_clips_raw_body() {
        let body = "x".repeat(1000);
        let message = describe_failure(StatusCode::INTERNAL_SERVER_ERROR, &body);
        assert_eq!(message.len(), "HTTP 500: ".len() + MAX_ERROR_BODY_CHARS);
    }

    #[test]
    fn test_describe_failure_clips_provider_message() {
        let body = serde_json::json!({"error": {"message": "y".repeat(1000)}}).to_string();
        let message = describe_failure(StatusCode::TOO_MANY_REQUESTS, &body);
        assert_eq!(message.len(), "HTTP 429: ".len() + MAX_ERROR_BODY_CHARS);
        assert!(message.starts_with("HTTP 429: yyy"));
    }

    #[test]
    fn test_describe_failure_empty_body() {
        assert_eq!(describe_failure(StatusCode::BAD_GATEWAY, ""), "HTTP 502");
    }

    #[test]
    fn test_extract_chat_text_is_verbatim() {
        let body = r#"{"choices": [{"message": {"role": "assistant", "content": "  **Score: 82**\n"}}]}"#;
        assert_eq!(
            extract_text(WireFormat::OpenAiChat, body).unwrap(),
            "  **Score: 82**\n"
        );
    }

    #[test]
    fn test_extract_gemini_text_joins_parts() {
        let body = r#"{"candidates": [{"content": {"parts": [{"text": "Fit: "}, {"text": "strong"}]}}]}"#;
        assert_eq!(
            extract_text(WireFormat::GeminiGenerate, body).unwrap(),
            "Fit: strong"
        );
    }

    #[test]
    fn test_extract_rejects_empty_and_missing_text() {
        assert!(extract_text(WireFormat::OpenAiChat, r#"{"choices": []}"#).is_err());
        assert!(extract_text(
            WireFormat::OpenAiChat,
            r#"{"choices": [{"message": {"content": "   "}}]}"#
        )
        .is_err());
        assert!(extract_text(WireFormat::GeminiGenerate, r#"{"candidates": [{}]}"#).is_err());
        assert!(extract_text(WireFormat::GeminiGenerate, "not json").is_err());
    }

    #[tokio::test]
    async fn test_openai_chat_round_trip() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer sk-test")
            .match_body(mockito::Matcher::PartialJsonString(
                r#"{"model": "llama-3.3-70b-versatile", "messages": [{"role": "user", "content": "evaluate"}]}"#
                    .to_string(),
            ))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"choices": [{"message": {"content": "Score: 90"}}]}"#)
            .create_async()
            .await;

        let adapter = adapter_for(ProviderId::Groq, &server.url());
        let text = adapter.generate("evaluate", &credential()).await.unwrap();

        assert_eq!(text, "Score: 90");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_gemini_round_trip() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/models/gemini-3-flash-preview:generateContent")
            .match_header("x-goog-api-key", "sk-test")
            .match_body(mockito::Matcher::PartialJsonString(
                r#"{"contents": [{"parts": [{"text": "evaluate"}]}]}"#.to_string(),
            ))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"candidates": [{"content": {"parts": [{"text": "Score: 71"}]}}]}"#)
            .create_async()
            .await;

        let adapter = adapter_for(ProviderId::Gemini, &server.url());
        let text = adapter.generate("evaluate", &credential()).await.unwrap();

        assert_eq!(text, "Score: 71");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_quota_status_becomes_quota_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(429)
            .with_body(r#"{"error": {"message": "Rate limit reached"}}"#)
            .create_async()
            .await;

        let adapter = adapter_for(ProviderId::OpenAi, &server.url());
        let err = adapter.generate("evaluate", &credential()).await.unwrap_err();

        assert_eq!(err.provider, ProviderId::OpenAi);
        assert_eq!(err.kind, ErrorKind::Quota);
        assert!(err.message.contains("Rate limit reached"));
    }

    #[tokio::test]
    async fn test_auth_failure_never_echoes_credential() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(401)
            .with_body(r#"{"error": {"message": "Invalid API Key"}}"#)
            .create_async()
            .await;

        let adapter = adapter_for(ProviderId::DeepInfra, &server.url());
        let err = adapter.generate("evaluate", &credential()).await.unwrap_err();

        assert_eq!(err.kind, ErrorKind::Auth);
        assert!(!err.to_string().contains("sk-test"));
    }

    #[tokio::test]
    async fn test_malformed_success_body_is_protocol_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body("<html>gateway</html>")
            .create_async()
            .await;

        let adapter = adapter_for(ProviderId::OpenRouter, &server.url());
        let err = adapter.generate("evaluate", &credential()).await.unwrap_err();

        assert_eq!(err.kind, ErrorKind::Protocol);
    }

    #[tokio::test]
    async fn test_single_request_per_generate() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .with_status(503)
            .expect(1)
            .create_async()
            .await;

        let adapter = adapter_for(ProviderId::Groq, &server.url());
        let err = adapter.generate("evaluate", &credential()).await.unwrap_err();

        assert_eq!(err.kind, ErrorKind::Transport);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_unreachable_host_is_transport_error() {
        let adapter = adapter_for(ProviderId::Groq, "http://127.0.0.1:1");
        let err = adapter.generate("evaluate", &credential()).await.unwrap_err();
        assert!(matches!(err.kind, ErrorKind::Transport | ErrorKind::Timeout));
    }
}
