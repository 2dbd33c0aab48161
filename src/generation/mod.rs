//! Generation client: turns a natural-language instruction into a site
//! artifact through one call to an external text-generation service.
//!
//! This module provides:
//! - Prompt construction for first generations and refinements
//! - The required output schema
//! - Response decoding and validation
//! - A `generateContent` HTTP adapter ([`GeminiService`])

pub mod error;
pub mod gemini;
pub mod prompt;
pub mod schema;

pub use error::{GenerationError, GenerationResult};
pub use gemini::GeminiService;

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, info};

use crate::artifact::SiteArtifact;

/// Default sampling temperature.
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// One request to the generation service.
#[derive(Clone, Debug)]
pub struct GenerationRequest {
    /// Natural-language prompt.
    pub prompt: String,
    /// Schema the response must conform to.
    pub schema: Value,
    /// Sampling temperature.
    pub temperature: f32,
}

/// Opaque request/response text-generation service.
///
/// Implementations return the raw generated text. An empty answer must be
/// reported as [`GenerationError::EmptyResponse`].
#[async_trait]
pub trait GenerationService: Send + Sync {
    /// Send one request and return the generated text.
    async fn complete(&self, request: &GenerationRequest) -> GenerationResult<String>;
}

/// Which kind of round a request belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RoundKind {
    /// First generation from scratch.
    Generate,
    /// Edit of an existing artifact.
    Refine,
}

impl RoundKind {
    /// Lower-case label used in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Generate => "generate",
            Self::Refine => "refine",
        }
    }
}

/// Builds prompts, calls the service once, and decodes the result.
///
/// No retry happens here; retrying is the caller's decision.
#[derive(Clone)]
pub struct GenerationClient {
    service: Arc<dyn GenerationService>,
    temperature: f32,
}

impl GenerationClient {
    /// Wrap a generation service.
    #[must_use]
    pub fn new(service: Arc<dyn GenerationService>) -> Self {
        Self {
            service,
            temperature: DEFAULT_TEMPERATURE,
        }
    }

    /// Set the sampling temperature.
    #[must_use]
    pub const fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Create a brand new site from `instruction`.
    ///
    /// # Errors
    /// Returns an error if the call fails or the response is empty or
    /// does not decode into a complete artifact.
    pub async fn generate(&self, instruction: &str) -> GenerationResult<SiteArtifact> {
        self.round(RoundKind::Generate, prompt::generate_prompt(instruction))
            .await
    }

    /// Produce a complete replacement for `current` that satisfies
    /// `instruction`.
    ///
    /// # Errors
    /// Same failure semantics as [`GenerationClient::generate`].
    pub async fn refine(
        &self,
        current: &SiteArtifact,
        instruction: &str,
    ) -> GenerationResult<SiteArtifact> {
        self.round(RoundKind::Refine, prompt::refine_prompt(current, instruction))
            .await
    }

    async fn round(&self, kind: RoundKind, prompt: String) -> GenerationResult<SiteArtifact> {
        let request = GenerationRequest {
            prompt,
            schema: schema::site_schema(),
            temperature: self.temperature,
        };

        debug!("{} round: {} prompt bytes", kind.as_str(), request.prompt.len());
        let text = self.service.complete(&request).await?;
        let artifact = decode_artifact(&text)?;

        info!(
            "{} round decoded: html={}B css={}B js={}B",
            kind.as_str(),
            artifact.html.len(),
            artifact.css.len(),
            artifact.javascript.len()
        );
        Ok(artifact)
    }
}

/// Decode the service's text into a validated artifact.
///
/// Surrounding Markdown code fences are tolerated. Blank required fields
/// are rejected.
///
/// # Errors
/// Returns an error if the text is blank, is not the expected object, or
/// has a blank `html`, `css` or `javascript` field.
pub fn decode_artifact(text: &str) -> GenerationResult<SiteArtifact> {
    let cleaned = strip_code_fences(text);
    if cleaned.is_empty() {
        return Err(GenerationError::EmptyResponse);
    }

    let artifact: SiteArtifact = serde_json::from_str(cleaned)?;
    if let Some(field) = artifact.first_blank_field() {
        return Err(GenerationError::BlankField(field));
    }
    Ok(artifact)
}

fn strip_code_fences(text: &str) -> &str {
    text.trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim()
}
