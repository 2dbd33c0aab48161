//! The generated site artifact.
//!
//! An artifact is always a complete set of the three source files. Each
//! generation round produces a brand new value; nothing in this crate edits
//! an artifact after it has been decoded.

use serde::{Deserialize, Serialize};

/// Conventional file name the generated markup links its stylesheet under.
pub const STYLESHEET_FILE: &str = "style.css";
/// Conventional file name the generated markup loads its script from.
pub const SCRIPT_FILE: &str = "script.js";
/// File name of the generated markup.
pub const DOCUMENT_FILE: &str = "index.html";

/// One generation of the target website.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteArtifact {
    /// Full source of `index.html` (or a body fragment).
    pub html: String,
    /// Full source of `style.css`.
    pub css: String,
    /// Full source of `script.js`.
    pub javascript: String,
    /// Short human-readable summary of what was built or changed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

impl SiteArtifact {
    /// Build an artifact from its three sources.
    #[must_use]
    pub fn new(
        html: impl Into<String>,
        css: impl Into<String>,
        javascript: impl Into<String>,
    ) -> Self {
        Self {
            html: html.into(),
            css: css.into(),
            javascript: javascript.into(),
            explanation: None,
        }
    }

    /// Attach an explanation.
    #[must_use]
    pub fn with_explanation(mut self, explanation: impl Into<String>) -> Self {
        self.explanation = Some(explanation.into());
        self
    }

    /// Explanation, if the model gave a non-blank one.
    #[must_use]
    pub fn explanation(&self) -> Option<&str> {
        self.explanation
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Name of the first required field that is blank, if any.
    #[must_use]
    pub fn first_blank_field(&self) -> Option<&'static str> {
        [
            ("html", &self.html),
            ("css", &self.css),
            ("javascript", &self.javascript),
        ]
        .into_iter()
        .find(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explanation_optional_in_json() {
        let artifact: SiteArtifact =
            serde_json::from_str(r#"{"html":"<p>x</p>","css":"p{}","javascript":"1;"}"#)
                .unwrap_or_else(|_| SiteArtifact::new("", "", ""));
        assert_eq!(artifact.html, "<p>x</p>");
        assert!(artifact.explanation.is_none());

        let json = serde_json::to_string(&artifact).unwrap_or_default();
        assert!(!json.contains("explanation"));
    }

    #[test]
    fn test_blank_explanation_is_none() {
        let artifact = SiteArtifact::new("a", "b", "c").with_explanation("   ");
        assert_eq!(artifact.explanation(), None);

        let artifact = SiteArtifact::new("a", "b", "c").with_explanation(" Added a footer. ");
        assert_eq!(artifact.explanation(), Some("Added a footer."));
    }

    #[test]
    fn test_first_blank_field() {
        assert_eq!(SiteArtifact::new("a", "b", "c").first_blank_field(), None);
        assert_eq!(SiteArtifact::new(" ", "b", "c").first_blank_field(), Some("html"));
        assert_eq!(SiteArtifact::new("a", "", "").first_blank_field(), Some("css"));
        assert_eq!(SiteArtifact::new("a", "b", "\n").first_blank_field(), Some("javascript"));
    }
}
