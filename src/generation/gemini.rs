//! `generateContent` adapter for the generation service.
//!
//! Speaks the Gemini REST protocol:
//! - `POST {base}/v1beta/models/{model}:generateContent`
//! - credential in the `x-goog-api-key` header
//! - schema-constrained JSON output via `generationConfig`

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::config::SiteGenConfig;

use super::error::{GenerationError, GenerationResult};
use super::{GenerationRequest, GenerationService};

/// Header carrying the API credential.
const API_KEY_HEADER: &str = "x-goog-api-key";
/// MIME type that switches the service to structured output.
const JSON_MIME: &str = "application/json";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig<'a>,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    response_mime_type: &'a str,
    response_schema: &'a Value,
    temperature: f32,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
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
    text: Option<String>,
}

/// HTTP client for the hosted generation service.
pub struct GeminiService {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl GeminiService {
    /// Build a service client from the process configuration.
    ///
    /// # Errors
    /// Returns an error if no API key is configured or the HTTP client
    /// cannot be built.
    pub fn new(config: &SiteGenConfig) -> GenerationResult<Self> {
        if config.api_key.trim().is_empty() {
            return Err(GenerationError::MissingApiKey);
        }

        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint_url(&config.api_base, &config.model),
            api_key: config.api_key.clone(),
        })
    }

    /// Full URL requests are posted to.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl GenerationService for GeminiService {
    async fn complete(&self, request: &GenerationRequest) -> GenerationResult<String> {
        let body = request_body(request);

        debug!("POST {} ({} prompt bytes)", self.endpoint, request.prompt.len());

        let response = self
            .client
            .post(&self.endpoint)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(GenerationError::status(status.as_u16(), &text));
        }

        extract_text(&text)
    }
}

/// Build the endpoint URL for `model` under `base`.
fn endpoint_url(base: &str, model: &str) -> String {
    let base = base.trim_end_matches('/');
    format!("{base}/v1beta/models/{model}:generateContent")
}

fn request_body(request: &GenerationRequest) -> GenerateContentRequest<'_> {
    GenerateContentRequest {
        contents: vec![Content {
            role: "user",
            parts: vec![Part {
                text: &request.prompt,
            }],
        }],
        generation_config: GenerationConfig {
            response_mime_type: JSON_MIME,
            response_schema: &request.schema,
            temperature: request.temperature,
        },
    }
}

/// Pull the generated text out of a raw `generateContent` response body.
fn extract_text(body: &str) -> GenerationResult<String> {
    let parsed: GenerateContentResponse = serde_json::from_str(body)?;

    let text: String = parsed
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|p| p.text)
                .collect()
        })
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(GenerationError::EmptyResponse);
    }
    Ok(text)
}
