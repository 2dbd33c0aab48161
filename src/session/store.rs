//! In-memory registry of open builder sessions.
//!
//! Sessions live as long as their builder view, or until they sit idle
//! past the configured TTL. Nothing is persisted.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tracing::{debug, info};

use crate::preview::DocumentAssembler;

use super::BuilderSession;
use super::types::SessionId;

/// Open session with its idle deadline.
struct SessionEntry {
    session: Arc<BuilderSession>,
    expires_at: Instant,
}

impl SessionEntry {
    fn new(session: Arc<BuilderSession>, ttl: Duration) -> Self {
        Self {
            session,
            expires_at: Instant::now() + ttl,
        }
    }

    fn touch(&mut self, ttl: Duration) {
        self.expires_at = Instant::now() + ttl;
    }

    /// A session with a round in flight never expires.
    fn is_expired(&self, now: Instant) -> bool {
        now > self.expires_at && !self.session.is_generating()
    }
}

/// Thread-safe map of open sessions.
pub struct SessionStore {
    assembler: Arc<DocumentAssembler>,
    ttl: Duration,
    sessions: DashMap<SessionId, SessionEntry>,
}

impl SessionStore {
    /// Create an empty store whose sessions share `assembler` and are
    /// dropped after `ttl` without use.
    #[must_use]
    pub fn new(assembler: Arc<DocumentAssembler>, ttl: Duration) -> Self {
        Self {
            assembler,
            ttl,
            sessions: DashMap::new(),
        }
    }

    /// Open a new, empty session. Expired sessions are swept first.
    pub fn create(&self) -> Arc<BuilderSession> {
        self.sweep_expired();

        let session = Arc::new(BuilderSession::new(Arc::clone(&self.assembler)));
        self.sessions
            .insert(session.id(), SessionEntry::new(Arc::clone(&session), self.ttl));
        info!("Opened session {} ({} open)", session.id(), self.sessions.len());
        session
    }

    /// Look up an open session and push its idle deadline back.
    #[must_use]
    pub fn get(&self, id: SessionId) -> Option<Arc<BuilderSession>> {
        let mut entry = self.sessions.get_mut(&id)?;
        if entry.is_expired(Instant::now()) {
            drop(entry);
            self.sessions.remove(&id);
            debug!("Session {id} expired");
            return None;
        }
        entry.touch(self.ttl);
        Some(Arc::clone(&entry.session))
    }

    /// Close a session. Returns `false` if it was not open.
    pub fn remove(&self, id: SessionId) -> bool {
        let removed = self.sessions.remove(&id).is_some();
        if removed {
            debug!("Closed session {id}");
        }
        removed
    }

    /// Drop every idle session past its deadline. Returns how many went.
    pub fn sweep_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.sessions.len();
        self.sessions.retain(|_, entry| !entry.is_expired(now));
        let swept = before.saturating_sub(self.sessions.len());
        if swept > 0 {
            info!("Dropped {swept} idle sessions");
        }
        swept
    }

    /// Number of open sessions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Whether no session is open.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
