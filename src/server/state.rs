//! Application state shared across all request handlers.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::config::{DEFAULT_SESSION_TTL_SECS, SiteGenConfig};
use crate::generation::{GeminiService, GenerationClient, GenerationService};
use crate::preview::DocumentAssembler;
use crate::session::SessionStore;

/// Shared application state.
pub struct AppState {
    /// Open builder sessions.
    pub sessions: SessionStore,
    /// Client used for every generation round.
    pub generator: GenerationClient,
    /// Directory the builder client is served from.
    pub static_dir: PathBuf,
}

impl AppState {
    /// Create the application state from the process configuration.
    ///
    /// # Errors
    /// Returns an error if the generation service client or the document
    /// assembler cannot be created.
    pub fn new(config: &SiteGenConfig) -> Result<Arc<Self>, Box<dyn std::error::Error + Send + Sync>> {
        let service = GeminiService::new(config)
            .map_err(|e| format!("Failed to create generation client: {e}"))?;
        tracing::info!("Generation endpoint: {}", service.endpoint());

        let generator = GenerationClient::new(Arc::new(service)).with_temperature(config.temperature);
        Self::with_generator(generator, config.static_dir.clone(), config.session_ttl)
    }

    /// Create the application state around an existing generation service,
    /// with the default session TTL.
    ///
    /// # Errors
    /// Returns an error if the document assembler cannot be created.
    pub fn with_service(
        service: Arc<dyn GenerationService>,
        static_dir: PathBuf,
    ) -> Result<Arc<Self>, Box<dyn std::error::Error + Send + Sync>> {
        Self::with_generator(
            GenerationClient::new(service),
            static_dir,
            Duration::from_secs(DEFAULT_SESSION_TTL_SECS),
        )
    }

    fn with_generator(
        generator: GenerationClient,
        static_dir: PathBuf,
        session_ttl: Duration,
    ) -> Result<Arc<Self>, Box<dyn std::error::Error + Send + Sync>> {
        let assembler = DocumentAssembler::new()
            .map_err(|e| format!("Failed to compile preview patterns: {e}"))?;

        Ok(Arc::new(Self {
            sessions: SessionStore::new(Arc::new(assembler), session_ttl),
            generator,
            static_dir,
        }))
    }
}
