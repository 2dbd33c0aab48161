//! Preview renderer: keeps a render-ready document in step with the
//! session's current artifact.
//!
//! - `empty`: no artifact yet, the placeholder is shown
//! - `populated`: the assembled document for the current artifact
//!
//! Every artifact replacement triggers a full re-render. There is no way
//! back to `empty`.

pub mod document;
pub mod frame;

pub use document::{DocumentAssembler, DocumentShape, classify};
pub use frame::{SANDBOX_PERMISSIONS, iframe_element, placeholder_document, sandbox_policy};

use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::artifact::SiteArtifact;

/// Observable renderer state.
#[derive(Clone, Debug, Default)]
pub enum PreviewState {
    /// No artifact has arrived yet.
    #[default]
    Empty,
    /// A document is live.
    Populated {
        /// Artifact the document was built from.
        source: Arc<SiteArtifact>,
        /// Assembled document.
        document: Arc<str>,
    },
}

/// Serializable label of a [`PreviewState`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PreviewPhase {
    /// See [`PreviewState::Empty`].
    Empty,
    /// See [`PreviewState::Populated`].
    Populated,
}

/// Per-session renderer. Reads artifacts, never changes them.
pub struct PreviewRenderer {
    assembler: Arc<DocumentAssembler>,
    state: PreviewState,
    revision: u64,
}

impl PreviewRenderer {
    /// Create an empty renderer.
    #[must_use]
    pub fn new(assembler: Arc<DocumentAssembler>) -> Self {
        Self {
            assembler,
            state: PreviewState::Empty,
            revision: 0,
        }
    }

    /// Bring the rendered document in line with `artifact`.
    ///
    /// Returns `true` if a new document was assembled. Passing the artifact
    /// already on display is a no-op.
    pub fn sync(&mut self, artifact: &Arc<SiteArtifact>) -> bool {
        if let PreviewState::Populated { source, .. } = &self.state {
            if Arc::ptr_eq(source, artifact) {
                return false;
            }
        }

        let document: Arc<str> = self.assembler.assemble(artifact).into();
        self.revision += 1;
        debug!(
            "preview revision {} assembled ({} bytes)",
            self.revision,
            document.len()
        );
        self.state = PreviewState::Populated {
            source: Arc::clone(artifact),
            document,
        };
        true
    }

    /// Current phase label.
    #[must_use]
    pub const fn phase(&self) -> PreviewPhase {
        match self.state {
            PreviewState::Empty => PreviewPhase::Empty,
            PreviewState::Populated { .. } => PreviewPhase::Populated,
        }
    }

    /// Number of documents assembled so far.
    #[must_use]
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    /// Live document, if any.
    #[must_use]
    pub fn document(&self) -> Option<Arc<str>> {
        match &self.state {
            PreviewState::Empty => None,
            PreviewState::Populated { document, .. } => Some(Arc::clone(document)),
        }
    }

    /// Document to serve on its own: the live one or the placeholder.
    #[must_use]
    pub fn served_document(&self) -> String {
        self.document()
            .map_or_else(frame::placeholder_document, |d| d.to_string())
    }

    /// Host-page markup: the sandboxed frame or the placeholder block.
    #[must_use]
    pub fn frame_markup(&self) -> String {
        self.document().map_or_else(frame::placeholder_element, |d| {
            frame::iframe_element(&d)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn renderer() -> PreviewRenderer {
        PreviewRenderer::new(Arc::new(DocumentAssembler::new().expect("patterns")))
    }

    fn site(body: &str) -> Arc<SiteArtifact> {
        Arc::new(SiteArtifact::new(body, "p { margin: 0; }", "void 0;"))
    }

    #[test]
    fn test_starts_empty_with_placeholder() {
        let r = renderer();
        assert_eq!(r.phase(), PreviewPhase::Empty);
        assert_eq!(r.revision(), 0);
        assert!(r.document().is_none());
        assert!(r.served_document().contains(frame::PLACEHOLDER_TITLE));
        assert!(!r.frame_markup().contains("<iframe"));
    }

    #[test]
    fn test_empty_to_populated_to_populated() {
        let mut r = renderer();
        let first = site("<p>one</p>");
        assert!(r.sync(&first));
        assert_eq!(r.phase(), PreviewPhase::Populated);
        assert!(r.served_document().contains("<p>one</p>"));

        let second = site("<p>two</p>");
        assert!(r.sync(&second));
        assert_eq!(r.revision(), 2);
        let doc = r.document().unwrap_or_else(|| Arc::from(""));
        assert!(doc.contains("<p>two</p>"));
        assert!(!doc.contains("<p>one</p>"));
    }

    #[test]
    fn test_same_artifact_is_not_rerendered() {
        let mut r = renderer();
        let only = site("<p>one</p>");
        assert!(r.sync(&only));
        assert!(!r.sync(&only));
        assert_eq!(r.revision(), 1);

        // An equal but distinct artifact is a replacement and re-renders.
        let copy = Arc::new((*only).clone());
        assert!(r.sync(&copy));
        assert_eq!(r.revision(), 2);
    }

    #[test]
    fn test_frame_markup_is_sandboxed() {
        let mut r = renderer();
        r.sync(&site("<p>one</p>"));
        let markup = r.frame_markup();
        assert!(markup.starts_with("<iframe"));
        assert!(markup.contains("sandbox=\"allow-scripts allow-same-origin\""));
        assert!(markup.contains("&lt;p&gt;one&lt;/p&gt;"));
    }
}
