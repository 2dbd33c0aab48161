//! Value types owned by a builder session.

use core::fmt;
use core::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier of a builder session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(transparent)]
#[serde(transparent)]
pub struct SessionId(pub Uuid);

impl Default for SessionId {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl SessionId {
    /// Create a new identifier.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        #[cfg(feature = "uuid_v7")]
        {
            Self(Uuid::now_v7())
        }
        #[cfg(not(feature = "uuid_v7"))]
        {
            Self(Uuid::new_v4())
        }
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for SessionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Author of a conversation turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The person describing the site.
    User,
    /// The generation side.
    Model,
}

/// One entry of the chat log.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    /// Who spoke.
    pub role: Role,
    /// What was said.
    pub content: String,
    /// When the turn was appended.
    pub timestamp: DateTime<Utc>,
}

impl ConversationTurn {
    /// A user turn stamped now.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self::now(Role::User, content)
    }

    /// A model turn stamped now.
    #[must_use]
    pub fn model(content: impl Into<String>) -> Self {
        Self::now(Role::Model, content)
    }

    fn now(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

/// What the workspace panel shows.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    /// Live rendered preview.
    #[default]
    Preview,
    /// Raw HTML/CSS/JS sources.
    Code,
}
