//! Document assembly: artifact in, self-contained HTML document out.
//!
//! The classification and tag replacement are heuristics over raw text.
//! Markup is never validated; the browser's lenient parser deals with
//! whatever comes out.

use regex::{NoExpand, Regex};

use crate::artifact::SiteArtifact;

/// Shape of an artifact's `html` field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DocumentShape {
    /// Body content without a document shell.
    Fragment,
    /// Carries its own `<!DOCTYPE html>` or `<html>` shell.
    FullDocument,
}

/// Classify markup as a fragment or a full document.
#[must_use]
pub fn classify(html: &str) -> DocumentShape {
    let lower = html.to_ascii_lowercase();
    if lower.contains("<!doctype html") || lower.contains("<html") {
        DocumentShape::FullDocument
    } else {
        DocumentShape::Fragment
    }
}

/// Compiled patterns for in-place injection into full documents.
pub struct DocumentAssembler {
    stylesheet_link: Regex,
    script_tag: Regex,
    head_close: Regex,
    body_close: Regex,
    style_close: Regex,
    script_close: Regex,
}

impl DocumentAssembler {
    /// Compile the injection patterns.
    ///
    /// # Errors
    /// Returns an error if any regex pattern is invalid.
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            stylesheet_link: Regex::new(
                r#"(?i)<link\b[^>]*\bhref\s*=\s*["'](?:\./)?style\.css["'][^>]*>"#,
            )?,
            script_tag: Regex::new(
                r#"(?i)<script\b[^>]*\bsrc\s*=\s*["'](?:\./)?script\.js["'][^>]*>\s*</script\s*>"#,
            )?,
            head_close: Regex::new(r"(?i)</head\s*>")?,
            body_close: Regex::new(r"(?i)</body\s*>")?,
            style_close: Regex::new(r"(?i)</(style)")?,
            script_close: Regex::new(r"(?i)</(script)")?,
        })
    }

    /// Build the render-ready document for `artifact`.
    #[must_use]
    pub fn assemble(&self, artifact: &SiteArtifact) -> String {
        let style = self.style_block(&artifact.css);
        let script = self.script_block(&artifact.javascript);

        match classify(&artifact.html) {
            DocumentShape::Fragment => wrap_fragment(&artifact.html, &style, &script),
            DocumentShape::FullDocument => {
                let with_css = self.inject_style(&artifact.html, &style);
                self.inject_script(&with_css, &script)
            }
        }
    }

    /// Inline `<style>` block holding `css`.
    #[must_use]
    pub fn style_block(&self, css: &str) -> String {
        let css = self.style_close.replace_all(css, r"<\/$1");
        format!("<style>{css}</style>")
    }

    /// Inline `<script>` block running `javascript` under an exception guard.
    ///
    /// Errors thrown by the script are logged to the document's own console
    /// and never propagate further.
    #[must_use]
    pub fn script_block(&self, javascript: &str) -> String {
        let javascript = self.script_close.replace_all(javascript, r"<\/$1");
        format!("<script>try {{ {javascript} }} catch (e) {{ console.error(e) }}</script>")
    }

    fn inject_style(&self, html: &str, style: &str) -> String {
        if let Some(out) = replace_first_remove_rest(&self.stylesheet_link, html, style) {
            return out;
        }
        if let Some(m) = self.head_close.find(html) {
            return splice(html, m.start(), style);
        }
        format!("{style}{html}")
    }

    fn inject_script(&self, html: &str, script: &str) -> String {
        if let Some(out) = replace_first_remove_rest(&self.script_tag, html, script) {
            return out;
        }
        if let Some(m) = self.body_close.find_iter(html).last() {
            return splice(html, m.start(), script);
        }
        format!("{html}{script}")
    }
}

/// Replace the first match with `block` and drop later duplicates.
fn replace_first_remove_rest(pattern: &Regex, html: &str, block: &str) -> Option<String> {
    let first = pattern.find(html)?;
    let rest = pattern.replace_all(&html[first.end()..], NoExpand(""));
    Some(format!("{}{block}{rest}", &html[..first.start()]))
}

fn splice(html: &str, at: usize, block: &str) -> String {
    let mut out = String::with_capacity(html.len() + block.len());
    out.push_str(&html[..at]);
    out.push_str(block);
    out.push_str(&html[at..]);
    out
}

fn wrap_fragment(body: &str, style: &str, script: &str) -> String {
    format!(
        "<!DOCTYPE html>
<html>
<head>
<meta charset=\"utf-8\">
<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">
{style}
</head>
<body>
{body}
{script}
</body>
</html>
"
    )
}
