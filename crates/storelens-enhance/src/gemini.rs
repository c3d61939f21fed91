//! Client for the Gemini `generateContent` endpoint.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use storelens_core::app_config::{DEFAULT_LLM_BASE_URL, DEFAULT_LLM_MODEL};

use crate::error::EnhanceError;
use crate::TextModel;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Sampling settings used for every call.
const TEMPERATURE: f64 = 0.2;
const MAX_OUTPUT_TOKENS: u32 = 400;
const TOP_P: f64 = 0.95;
const TOP_K: u32 = 40;

/// Gemini HTTP client.
///
/// The API key is sent in the `x-goog-api-key` header so it never appears
/// in a logged URL.
#[derive(Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("api_key", &"[redacted]")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    system_instruction: Content<'a>,
    contents: [Content<'a>; 1],
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: [Part<'a>; 1],
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f64,
    max_output_tokens: u32,
    top_p: f64,
    top_k: u32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    #[serde(default)]
    message: String,
}

impl GeminiClient {
    /// # Errors
    ///
    /// Returns [`EnhanceError::Http`] if the HTTP client cannot be built.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Result<Self, EnhanceError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            model: model.into(),
            base_url: DEFAULT_LLM_BASE_URL.to_owned(),
        })
    }

    /// A client for the default model.
    ///
    /// # Errors
    ///
    /// Returns [`EnhanceError::Http`] if the HTTP client cannot be built.
    pub fn with_default_model(api_key: impl Into<String>) -> Result<Self, EnhanceError> {
        Self::new(api_key, DEFAULT_LLM_MODEL)
    }

    /// Points the client at another API host, e.g. a mock server.
    #[must_use]
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_owned();
        self
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }
}

impl TextModel for GeminiClient {
    async fn complete(&self, system: &str, prompt: &str) -> Result<String, EnhanceError> {
        let request = GenerateRequest {
            system_instruction: Content {
                role: None,
                parts: [Part { text: system }],
            },
            contents: [Content {
                role: Some("user"),
                parts: [Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: TEMPERATURE,
                max_output_tokens: MAX_OUTPUT_TOKENS,
                top_p: TOP_P,
                top_k: TOP_K,
            },
        };

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .map(|b| b.error.message)
                .unwrap_or_else(|_| body.chars().take(200).collect());
            return Err(EnhanceError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: GenerateResponse =
            serde_json::from_str(&body).map_err(|e| EnhanceError::Deserialize {
                context: "generateContent response".to_owned(),
                source: e,
            })?;

        let text = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().map(|p| p.text).collect::<String>())
            .unwrap_or_default();

        let text = text.trim();
        if text.is_empty() {
            return Err(EnhanceError::EmptyResponse);
        }
        Ok(text.to_owned())
    }
}
