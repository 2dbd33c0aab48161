//! The isolated browsing context a document is rendered into.
//!
//! Generated documents run untrusted script. They get script execution and
//! same-origin access inside their own frame, and nothing else: no
//! top-level navigation, no popups, no modals.

/// Capabilities granted to the preview frame.
pub const SANDBOX_PERMISSIONS: &str = "allow-scripts allow-same-origin";

/// `Content-Security-Policy` value applying the same restriction to a
/// document served on its own.
#[must_use]
pub fn sandbox_policy() -> String {
    format!("sandbox {SANDBOX_PERMISSIONS}")
}

/// Placeholder shown while a session has no artifact yet.
pub const PLACEHOLDER_TITLE: &str = "No Preview Available";
/// Second line of the placeholder.
pub const PLACEHOLDER_HINT: &str = "Generate a website to see it here.";

/// Standalone document shown in place of a preview while empty.
#[must_use]
pub fn placeholder_document() -> String {
    format!(
        "<!DOCTYPE html>
<html>
<head>
<meta charset=\"utf-8\">
<style>body {{ display: flex; align-items: center; justify-content: center; height: 100vh; margin: 0; font-family: sans-serif; color: #94a3b8; }}</style>
</head>
<body>
<div class=\"preview-placeholder\"><p>{PLACEHOLDER_TITLE}</p><p>{PLACEHOLDER_HINT}</p></div>
</body>
</html>
"
    )
}

/// Placeholder block embedded in the host page while empty.
#[must_use]
pub fn placeholder_element() -> String {
    format!(
        "<div class=\"preview-placeholder\"><p>{PLACEHOLDER_TITLE}</p><p>{PLACEHOLDER_HINT}</p></div>"
    )
}

/// Sandboxed `<iframe>` whose `srcdoc` holds `document`.
///
/// Swapping the whole element in the host page replaces the previous
/// browsing context in one step.
#[must_use]
pub fn iframe_element(document: &str) -> String {
    format!(
        "<iframe title=\"Site Preview\" class=\"preview-frame\" sandbox=\"{SANDBOX_PERMISSIONS}\" srcdoc=\"{}\"></iframe>",
        escape_attribute(document)
    )
}

/// Escape text for use inside a double-quoted HTML attribute.
#[must_use]
pub fn escape_attribute(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + value.len() / 8);
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}
