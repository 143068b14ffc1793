//! Provider catalogue — one descriptor row per supported backend.
//!
//! Adding a provider means adding a `ProviderId` variant and one row in
//! `CATALOGUE`. Declared order is the fallback priority after the user's
//! preferred provider.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Known LLM backends, in declared priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    Gemini,
    Groq,
    DeepInfra,
    OpenAi,
    OpenRouter,
}

/// Request/response shape spoken by a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WireFormat {
    /// `POST {base}/chat/completions`, bearer auth, text at `choices[0].message.content`.
    OpenAiChat,
    /// `POST {base}/models/{model}:generateContent`, `x-goog-api-key` auth,
    /// text at `candidates[0].content.parts[*].text`.
    GeminiGenerate,
}

/// Static configuration for one provider.
#[derive(Debug)]
pub struct ProviderDescriptor {
    pub id: ProviderId,
    pub display_name: &'static str,
    pub wire_format: WireFormat,
    pub base_url: &'static str,
    pub model: &'static str,
    pub key_env: &'static str,
    pub base_url_env: &'static str,
    pub model_env: &'static str,
}

static CATALOGUE: [ProviderDescriptor; 5] = [
    ProviderDescriptor {
        id: ProviderId::Gemini,
        display_name: "Gemini",
        wire_format: WireFormat::GeminiGenerate,
        base_url: "https://generativelanguage.googleapis.com/v1beta",
        model: "gemini-3-flash-preview",
        key_env: "GEMINI_API_KEY",
        base_url_env: "GEMINI_BASE_URL",
        model_env: "GEMINI_MODEL",
    },
    ProviderDescriptor {
        id: ProviderId::Groq,
        display_name: "Groq",
        wire_format: WireFormat::OpenAiChat,
        base_url: "https://api.groq.com/openai/v1",
        model: "llama-3.3-70b-versatile",
        key_env: "GROQ_API_KEY",
        base_url_env: "GROQ_BASE_URL",
        model_env: "GROQ_MODEL",
    },
    ProviderDescriptor {
        id: ProviderId::DeepInfra,
        display_name: "DeepInfra",
        wire_format: WireFormat::OpenAiChat,
        base_url: "https://api.deepinfra.com/v1/openai",
        model: "meta-llama/Llama-3.3-70B-Instruct",
        key_env: "DEEPINFRA_API_KEY",
        base_url_env: "DEEPINFRA_BASE_URL",
        model_env: "DEEPINFRA_MODEL",
    },
    ProviderDescriptor {
        id: ProviderId::OpenAi,
        display_name: "OpenAI",
        wire_format: WireFormat::OpenAiChat,
        base_url: "https://api.openai.com/v1",
        model: "gpt-4o-mini",
        key_env: "OPENAI_API_KEY",
        base_url_env: "OPENAI_BASE_URL",
        model_env: "OPENAI_MODEL",
    },
    ProviderDescriptor {
        id: ProviderId::OpenRouter,
        display_name: "OpenRouter",
        wire_format: WireFormat::OpenAiChat,
        base_url: "https://openrouter.ai/api/v1",
        model: "meta-llama/llama-3.3-70b-instruct",
        key_env: "OPENROUTER_API_KEY",
        base_url_env: "OPENROUTER_BASE_URL",
        model_env: "OPENROUTER_MODEL",
    },
];

impl ProviderId {
    /// Every provider in declared priority order.
    pub const ALL: [ProviderId; 5] = [
        ProviderId::Gemini,
        ProviderId::Groq,
        ProviderId::DeepInfra,
        ProviderId::OpenAi,
        ProviderId::OpenRouter,
    ];

    pub fn descriptor(self) -> &'static ProviderDescriptor {
        // Rows are declared in variant order.
        &CATALOGUE[self as usize]
    }

    /// Stable lowercase identifier used in JSON bodies.
    pub fn as_str(self) -> &'static str {
        match self {
            ProviderId::Gemini => "gemini",
            ProviderId::Groq => "groq",
            ProviderId::DeepInfra => "deepinfra",
            ProviderId::OpenAi => "openai",
            ProviderId::OpenRouter => "openrouter",
        }
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.descriptor().display_name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown provider '{0}'")]
pub struct UnknownProvider(pub String);

impl FromStr for ProviderId {
    type Err = UnknownProvider;

    /// Accepts the identifier or the display name, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        ProviderId::ALL
            .into_iter()
            .find(|p| {
                p.as_str().eq_ignore_ascii_case(needle)
                    || p.descriptor().display_name.eq_ignore_ascii_case(needle)
            })
            .ok_or_else(|| UnknownProvider(s.to_string()))
    }
}

/// Resolved target for one adapter: the descriptor plus any configured overrides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderEndpoint {
    pub provider: ProviderId,
    pub wire_format: WireFormat,
    pub base_url: String,
    pub model: String,
}

impl ProviderEndpoint {
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Full URL of the generation call.
    pub fn url(&self) -> String {
        match self.wire_format {
            WireFormat::OpenAiChat => format!("{}/chat/completions", self.base_url),
            WireFormat::GeminiGenerate => {
                format!("{}/models/{}:generateContent", self.base_url, self.model)
            }
        }
    }
}

impl From<&ProviderDescriptor> for ProviderEndpoint {
    fn from(d: &ProviderDescriptor) -> Self {
        Self {
            provider: d.id,
            wire_format: d.wire_format,
            base_url: d.base_url.to_string(),
            model: d.model.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_provider_has_a_catalogue_row() {
        for provider in ProviderId::ALL {
            assert_eq!(provider.descriptor().id, provider);
        }
    }

    #[test]
    fn test_declared_order_starts_gemini_groq_deepinfra() {
        assert_eq!(ProviderId::ALL[0], ProviderId::Gemini);
        assert_eq!(ProviderId::ALL[1], ProviderId::Groq);
        assert_eq!(ProviderId::ALL[2], ProviderId::DeepInfra);
    }

    #[test]
    fn test_from_str_accepts_id_and_display_name() {
        assert_eq!("groq".parse::<ProviderId>().unwrap(), ProviderId::Groq);
        assert_eq!("OpenAI".parse::<ProviderId>().unwrap(), ProviderId::OpenAi);
        assert_eq!(" DEEPINFRA ".parse::<ProviderId>().unwrap(), ProviderId::DeepInfra);
        assert!("anthropic".parse::<ProviderId>().is_err());
    }

    #[test]
    fn test_serde_id_matches_as_str() {
        for provider in ProviderId::ALL {
            let json = serde_json::to_string(&provider).unwrap();
            assert_eq!(json, format!("\"{}\"", provider.as_str()));
        }
    }

    #[test]
    fn test_openai_chat_url() {
        let endpoint = ProviderEndpoint::from(ProviderId::DeepInfra.descriptor());
        assert_eq!(
            endpoint.url(),
            "https://api.deepinfra.com/v1/openai/chat/completions"
        );
    }

    #[test]
    fn test_gemini_url_embeds_model() {
        let endpoint = ProviderEndpoint::from(ProviderId::Gemini.descriptor())
            .with_base_url("http://localhost:9000/")
            .with_model("gemini-test");
        assert_eq!(
            endpoint.url(),
            "http://localhost:9000/models/gemini-test:generateContent"
        );
    }
}
