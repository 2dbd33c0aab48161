//! Artifact export as the three conventional site files.

use crate::artifact::{DOCUMENT_FILE, SCRIPT_FILE, STYLESHEET_FILE, SiteArtifact};

/// One downloadable file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExportFile<'a> {
    /// File name offered to the browser.
    pub name: &'static str,
    /// MIME type.
    pub mime: &'static str,
    /// Exact contents of the matching artifact field.
    pub contents: &'a str,
}

/// The three files making up `artifact`, contents untouched.
#[must_use]
pub fn export_files(artifact: &SiteArtifact) -> [ExportFile<'_>; 3] {
    [
        ExportFile {
            name: DOCUMENT_FILE,
            mime: "text/html",
            contents: &artifact.html,
        },
        ExportFile {
            name: STYLESHEET_FILE,
            mime: "text/css",
            contents: &artifact.css,
        },
        ExportFile {
            name: SCRIPT_FILE,
            mime: "text/javascript",
            contents: &artifact.javascript,
        },
    ]
}

/// Look up a single export by file name.
#[must_use]
pub fn export_file<'a>(artifact: &'a SiteArtifact, name: &str) -> Option<ExportFile<'a>> {
    export_files(artifact).into_iter().find(|f| f.name == name)
}
