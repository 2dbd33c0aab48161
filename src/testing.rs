//! Test doubles shared by the unit tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::json;
use tokio::sync::Notify;

use crate::generation::{GenerationError, GenerationRequest, GenerationResult, GenerationService};

/// Generation service that replays canned answers and records requests.
///
/// When gated, each call signals `entered` and then waits for `release`.
pub struct ScriptedService {
    answers: Mutex<Vec<GenerationResult<String>>>,
    seen: Mutex<Vec<GenerationRequest>>,
    gated: bool,
    pub entered: Notify,
    pub release: Notify,
}

impl ScriptedService {
    pub fn new(answers: Vec<GenerationResult<String>>) -> Arc<Self> {
        Arc::new(Self::build(answers, false))
    }

    pub fn gated(answers: Vec<GenerationResult<String>>) -> Arc<Self> {
        Arc::new(Self::build(answers, true))
    }

    fn build(answers: Vec<GenerationResult<String>>, gated: bool) -> Self {
        Self {
            answers: Mutex::new(answers),
            seen: Mutex::new(Vec::new()),
            gated,
            entered: Notify::new(),
            release: Notify::new(),
        }
    }

    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.seen.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl GenerationService for ScriptedService {
    async fn complete(&self, request: &GenerationRequest) -> GenerationResult<String> {
        if let Ok(mut seen) = self.seen.lock() {
            seen.push(request.clone());
        }
        if self.gated {
            self.entered.notify_one();
            self.release.notified().await;
        }
        let next = self
            .answers
            .lock()
            .ok()
            .and_then(|mut a| (!a.is_empty()).then(|| a.remove(0)));
        next.unwrap_or(Err(GenerationError::EmptyResponse))
    }
}

/// JSON payload the service would return for a full document.
pub fn site_json(marker: &str) -> String {
    json!({
        "html": format!("<!DOCTYPE html><html><head><link rel=\"stylesheet\" href=\"style.css\"></head><body><header>{marker}</header><main><button class=\"cta\">Go</button></main><footer>Contact</footer><script src=\"script.js\"></script></body></html>"),
        "css": format!(".cta {{ background: blue; }} /* {marker} */"),
        "javascript": format!("console.log('{marker}');"),
    })
    .to_string()
}

/// Same as [`site_json`] with an explanation attached.
pub fn explained_site_json(marker: &str, explanation: &str) -> String {
    let mut value: serde_json::Value =
        serde_json::from_str(&site_json(marker)).unwrap_or_default();
    value["explanation"] = json!(explanation);
    value.to_string()
}
