//! Prompt construction for generation and refinement rounds.
//!
//! The service keeps no state between calls, so a refinement prompt carries
//! the entire current artifact.

use crate::artifact::SiteArtifact;

/// Prompt for a first generation from scratch.
#[must_use]
pub fn generate_prompt(instruction: &str) -> String {
    format!(
        r#"You are an expert AI Web Developer.
Create a fully functional, responsive, and modern website based on the following user request: "{instruction}".

Requirements:
1. HTML: Return the FULL source code for index.html. It must start with <!DOCTYPE html>. Include <head> with meta tags, title, and <link rel="stylesheet" href="style.css">. Include <body> with semantic tags (<header>, <main>, <footer>) and <script src="script.js"></script>.
2. CSS: Use modern CSS (Flexbox/Grid). Make it look professional and polished.
3. JS: Add meaningful interactivity appropriate for the requested site type.
4. Footer: Ensure the website has a proper footer section.
5. Output: Return the code for the three files (index.html, style.css, script.js) in the JSON format specified."#
    )
}

/// Prompt for an incremental edit of `current`.
#[must_use]
pub fn refine_prompt(current: &SiteArtifact, instruction: &str) -> String {
    format!(
        r#"You are an expert AI Web Developer. The user wants to update their existing website.

CURRENT CODE:

--- HTML ---
{html}

--- CSS ---
{css}

--- JS ---
{javascript}

USER REQUEST: "{instruction}"

INSTRUCTIONS:
1. Modify the code to satisfy the user's request.
2. Return the FULL updated code for all three files (HTML, CSS, JS). Do not return partial snippets.
3. Maintain the existing structure unless explicitly asked to change it.
4. Ensure the output matches the JSON schema provided."#,
        html = current.html,
        css = current.css,
        javascript = current.javascript,
    )
}
