//! Output schema the generation service must conform to.

use serde_json::{Value, json};

/// Fields every response must carry.
pub const REQUIRED_FIELDS: [&str; 3] = ["html", "css", "javascript"];

/// Build the response schema for a site artifact.
///
/// Uses the OpenAPI subset accepted by `generateContent` (`OBJECT`, `STRING`).
#[must_use]
pub fn site_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "html": {
                "type": "STRING",
                "description": "The complete, valid HTML5 code for the index.html file. It MUST start with <!DOCTYPE html> and include the <html>, <head>, and <body> tags. It should include a viewport meta tag and link to 'style.css' and 'script.js'. It MUST include a semantic footer."
            },
            "css": {
                "type": "STRING",
                "description": "The complete CSS styles for style.css. Modern, responsive, and aesthetic."
            },
            "javascript": {
                "type": "STRING",
                "description": "Functional JavaScript code for script.js to add interactivity. Do not include markdown backticks."
            },
            "explanation": {
                "type": "STRING",
                "description": "A very brief (one sentence) summary of what was built or changed."
            }
        },
        "required": REQUIRED_FIELDS,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_requires_three_sources() {
        let schema = site_schema();
        let required: Vec<&str> = schema["required"]
            .as_array()
            .map(|a| a.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();
        assert_eq!(required, vec!["html", "css", "javascript"]);
        assert!(schema["properties"]["explanation"].is_object());
    }

    #[test]
    fn test_html_description_demands_footer() {
        let schema = site_schema();
        let description = schema["properties"]["html"]["description"]
            .as_str()
            .unwrap_or_default();
        assert!(description.contains("footer"));
        assert!(description.contains("style.css"));
    }
}
