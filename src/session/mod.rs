//! Builder sessions: the chat log, the current artifact, and the
//! generation round-trip that ties them together.
//!
//! A session allows one round in flight at a time. A round:
//! 1. appends the user's instruction,
//! 2. sends the full current artifact (if any) with it,
//! 3. on success replaces the artifact wholesale and re-renders the preview,
//! 4. on failure leaves the artifact alone and appends an apology.

pub mod store;
pub mod types;

pub use store::SessionStore;
pub use types::{ConversationTurn, Role, SessionId, ViewMode};

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::artifact::SiteArtifact;
use crate::generation::{GenerationClient, GenerationError, RoundKind};
use crate::preview::{DocumentAssembler, PreviewPhase, PreviewRenderer};

/// Model turn after a first generation without explanation.
pub const CREATED_MESSAGE: &str = "I've created your website. How does it look?";
/// Model turn after a refinement without explanation.
pub const UPDATED_MESSAGE: &str = "I've updated the website based on your request.";
/// Model turn after any failed round.
pub const APOLOGY_MESSAGE: &str =
    "I'm sorry, I encountered an error while processing your request. Please try again.";

/// Reasons a submission is refused before any request is made.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    /// A round is already in flight for this session.
    #[error("a generation round is already in progress")]
    Busy,
    /// The instruction is blank.
    #[error("instruction is empty")]
    EmptyInstruction,
}

/// Result of a round that was accepted.
#[derive(Debug)]
pub enum RoundOutcome {
    /// The artifact was replaced.
    Applied(Arc<SiteArtifact>),
    /// The round failed; the previous artifact is still current.
    Failed(GenerationError),
}

impl RoundOutcome {
    /// Whether the artifact was replaced.
    #[must_use]
    pub const fn is_applied(&self) -> bool {
        matches!(self, Self::Applied(_))
    }
}

struct SessionState {
    turns: Vec<ConversationTurn>,
    artifact: Option<Arc<SiteArtifact>>,
    view_mode: ViewMode,
    preview: PreviewRenderer,
}

/// Serializable view of a session.
#[derive(Clone, Debug, Serialize)]
pub struct SessionSnapshot {
    /// Session identifier.
    pub id: SessionId,
    /// When the session was opened.
    pub created_at: DateTime<Utc>,
    /// Chat log in display order.
    pub turns: Vec<ConversationTurn>,
    /// Current artifact sources (for the code view and export).
    pub artifact: Option<SiteArtifact>,
    /// Whether a round is in flight.
    pub generating: bool,
    /// Workspace view mode.
    pub view_mode: ViewMode,
    /// Renderer phase.
    pub preview: PreviewPhase,
    /// Number of documents rendered so far.
    pub preview_revision: u64,
}

/// Owns the in-flight flag for one round and clears it when dropped.
///
/// If the round's future is dropped after its user turn was logged, the
/// turn is closed with the apology so every user turn keeps its reply.
struct RoundGuard<'a> {
    session: &'a BuilderSession,
    turn_open: bool,
}

impl Drop for RoundGuard<'_> {
    fn drop(&mut self) {
        if self.turn_open {
            match self.session.state.try_write() {
                Ok(mut state) => state.turns.push(ConversationTurn::model(APOLOGY_MESSAGE)),
                Err(_) => warn!(
                    "session {}: abandoned round left its instruction unanswered",
                    self.session.id
                ),
            }
        }
        self.session.in_flight.store(false, Ordering::Release);
    }
}

/// One builder view's worth of state.
pub struct BuilderSession {
    id: SessionId,
    created_at: DateTime<Utc>,
    in_flight: AtomicBool,
    state: RwLock<SessionState>,
}

impl BuilderSession {
    /// Open an empty session.
    #[must_use]
    pub fn new(assembler: Arc<DocumentAssembler>) -> Self {
        Self {
            id: SessionId::new(),
            created_at: Utc::now(),
            in_flight: AtomicBool::new(false),
            state: RwLock::new(SessionState {
                turns: Vec::new(),
                artifact: None,
                view_mode: ViewMode::Preview,
                preview: PreviewRenderer::new(assembler),
            }),
        }
    }

    /// Session identifier.
    #[must_use]
    pub const fn id(&self) -> SessionId {
        self.id
    }

    /// Whether a round is in flight.
    #[must_use]
    pub fn is_generating(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Run one generation round for `instruction`.
    ///
    /// A generation failure is not an `Err`: it is recorded in the chat log
    /// and reported as [`RoundOutcome::Failed`].
    ///
    /// # Errors
    /// Returns [`SessionError::EmptyInstruction`] for a blank instruction and
    /// [`SessionError::Busy`] while another round is in flight. Nothing is
    /// recorded in either case.
    pub async fn submit(
        &self,
        client: &GenerationClient,
        instruction: &str,
    ) -> Result<RoundOutcome, SessionError> {
        let instruction = instruction.trim();
        if instruction.is_empty() {
            return Err(SessionError::EmptyInstruction);
        }
        let mut round = self.claim()?;

        let current = {
            let mut state = self.state.write().await;
            state.turns.push(ConversationTurn::user(instruction));
            round.turn_open = true;
            state.artifact.clone()
        };

        let kind = if current.is_some() {
            RoundKind::Refine
        } else {
            RoundKind::Generate
        };
        info!("session {}: {} round started", self.id, kind.as_str());

        let result = match &current {
            None => client.generate(instruction).await,
            Some(artifact) => client.refine(artifact, instruction).await,
        };

        let mut state = self.state.write().await;
        round.turn_open = false;
        match result {
            Ok(artifact) => {
                let artifact = Arc::new(artifact);
                let message = artifact.explanation().map_or_else(
                    || match kind {
                        RoundKind::Generate => CREATED_MESSAGE.to_string(),
                        RoundKind::Refine => UPDATED_MESSAGE.to_string(),
                    },
                    str::to_string,
                );

                state.artifact = Some(Arc::clone(&artifact));
                state.preview.sync(&artifact);
                state.turns.push(ConversationTurn::model(message));
                state.view_mode = ViewMode::Preview;

                info!(
                    "session {}: {} round applied (preview revision {})",
                    self.id,
                    kind.as_str(),
                    state.preview.revision()
                );
                Ok(RoundOutcome::Applied(artifact))
            }
            Err(err) => {
                warn!("session {}: {} round failed: {err}", self.id, kind.as_str());
                state.turns.push(ConversationTurn::model(APOLOGY_MESSAGE));
                Ok(RoundOutcome::Failed(err))
            }
        }
    }

    fn claim(&self) -> Result<RoundGuard<'_>, SessionError> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| RoundGuard {
                session: self,
                turn_open: false,
            })
            .map_err(|_| SessionError::Busy)
    }

    /// Switch between the preview and the raw sources.
    pub async fn set_view_mode(&self, mode: ViewMode) {
        self.state.write().await.view_mode = mode;
    }

    /// Current view mode.
    pub async fn view_mode(&self) -> ViewMode {
        self.state.read().await.view_mode
    }

    /// Current artifact, shared rather than copied.
    pub async fn current_artifact(&self) -> Option<Arc<SiteArtifact>> {
        self.state.read().await.artifact.clone()
    }

    /// Chat log in display order.
    pub async fn turns(&self) -> Vec<ConversationTurn> {
        self.state.read().await.turns.clone()
    }

    /// Document to serve for the preview endpoint.
    pub async fn preview_document(&self) -> String {
        self.state.read().await.preview.served_document()
    }

    /// Frame markup for the host page.
    pub async fn frame_markup(&self) -> String {
        self.state.read().await.preview.frame_markup()
    }

    /// Serializable view of the whole session.
    pub async fn snapshot(&self) -> SessionSnapshot {
        let state = self.state.read().await;
        SessionSnapshot {
            id: self.id,
            created_at: self.created_at,
            turns: state.turns.clone(),
            artifact: state.artifact.as_deref().cloned(),
            generating: self.is_generating(),
            view_mode: state.view_mode,
            preview: state.preview.phase(),
            preview_revision: state.preview.revision(),
        }
    }
}
