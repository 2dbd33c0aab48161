//! HTTP route handlers for the builder API.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::Deserialize;
use tower_http::services::ServeDir;

use crate::export::export_file;
use crate::preview::sandbox_policy;
use crate::session::{BuilderSession, SessionError, SessionId, SessionSnapshot, ViewMode};

use super::state::AppState;

type ApiError = (StatusCode, String);

/// Create the API router with all routes.
pub fn create_router(state: Arc<AppState>) -> Router {
    let static_files = ServeDir::new(&state.static_dir);

    Router::new()
        .route("/health", get(health_check))
        .route("/api/sessions", post(create_session))
        .route("/api/sessions/{id}", get(get_session).delete(close_session))
        .route("/api/sessions/{id}/messages", post(submit_message))
        .route("/api/sessions/{id}/view", put(set_view))
        .route("/api/sessions/{id}/preview", get(preview_document))
        .route("/api/sessions/{id}/frame", get(preview_frame))
        .route("/api/sessions/{id}/export/{file}", get(export_download))
        .fallback_service(static_files)
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "sitegen",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

fn lookup(state: &AppState, id: SessionId) -> Result<Arc<BuilderSession>, ApiError> {
    state
        .sessions
        .get(id)
        .ok_or_else(|| (StatusCode::NOT_FOUND, format!("Unknown session: {id}")))
}

/// Open a session (mounting a builder view).
async fn create_session(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let session = state.sessions.create();
    (StatusCode::CREATED, Json(session.snapshot().await))
}

/// Inspect a session.
async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<SessionId>,
) -> Result<Json<SessionSnapshot>, ApiError> {
    let session = lookup(&state, id)?;
    Ok(Json(session.snapshot().await))
}

/// Close a session (unmounting its builder view).
async fn close_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<SessionId>,
) -> StatusCode {
    if state.sessions.remove(id) {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}

/// Chat message request.
#[derive(Debug, Deserialize)]
pub struct MessageRequest {
    /// Natural-language instruction.
    pub instruction: String,
}

/// Run one generation round.
///
/// A failed generation still answers 200: the failure is part of the chat
/// log. The round runs on its own task so a dropped connection cannot cut
/// it short.
async fn submit_message(
    State(state): State<Arc<AppState>>,
    Path(id): Path<SessionId>,
    Json(request): Json<MessageRequest>,
) -> Result<Json<SessionSnapshot>, ApiError> {
    let session = lookup(&state, id)?;

    let round = {
        let session = Arc::clone(&session);
        let generator = state.generator.clone();
        tokio::spawn(async move { session.submit(&generator, &request.instruction).await })
    };

    round
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("Generation task failed: {e}")))?
        .map_err(|e| (session_error_status(&e), e.to_string()))?;

    Ok(Json(session.snapshot().await))
}

const fn session_error_status(err: &SessionError) -> StatusCode {
    match err {
        SessionError::Busy => StatusCode::CONFLICT,
        SessionError::EmptyInstruction => StatusCode::BAD_REQUEST,
    }
}

/// View mode request.
#[derive(Debug, Deserialize)]
pub struct ViewRequest {
    /// Requested mode.
    pub mode: ViewMode,
}

/// Switch between preview and code view.
async fn set_view(
    State(state): State<Arc<AppState>>,
    Path(id): Path<SessionId>,
    Json(request): Json<ViewRequest>,
) -> Result<Json<SessionSnapshot>, ApiError> {
    let session = lookup(&state, id)?;
    session.set_view_mode(request.mode).await;
    Ok(Json(session.snapshot().await))
}

/// Serve the assembled document on its own, under a sandbox policy.
async fn preview_document(
    State(state): State<Arc<AppState>>,
    Path(id): Path<SessionId>,
) -> Result<Response, ApiError> {
    let session = lookup(&state, id)?;
    let document = session.preview_document().await;

    Ok((
        [
            (header::CONTENT_TYPE, "text/html; charset=utf-8".to_string()),
            (header::CONTENT_SECURITY_POLICY, sandbox_policy()),
            (header::CACHE_CONTROL, "no-store".to_string()),
        ],
        document,
    )
        .into_response())
}

/// Serve the sandboxed frame markup for the host page.
async fn preview_frame(
    State(state): State<Arc<AppState>>,
    Path(id): Path<SessionId>,
) -> Result<Html<String>, ApiError> {
    let session = lookup(&state, id)?;
    Ok(Html(session.frame_markup().await))
}

/// Download one of the three site files.
async fn export_download(
    State(state): State<Arc<AppState>>,
    Path((id, file)): Path<(SessionId, String)>,
) -> Result<Response, ApiError> {
    let session = lookup(&state, id)?;
    let artifact = session
        .current_artifact()
        .await
        .ok_or_else(|| (StatusCode::NOT_FOUND, "Nothing generated yet".to_string()))?;
    let export = export_file(&artifact, &file)
        .ok_or_else(|| (StatusCode::NOT_FOUND, format!("Unknown export file: {file}")))?;

    Ok((
        [
            (header::CONTENT_TYPE, export.mime.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", export.name),
            ),
        ],
        export.contents.to_string(),
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;
    use crate::generation::GenerationError;
    use crate::testing::{ScriptedService, site_json};

    fn app(answers: Vec<Result<String, GenerationError>>) -> Router {
        let state = AppState::with_service(
            ScriptedService::new(answers),
            PathBuf::from("static-missing-in-tests"),
        )
        .expect("state");
        create_router(state)
    }

    async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> Response {
        let request = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => request
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => request.body(Body::empty()),
        }
        .expect("request");
        app.clone().oneshot(request).await.expect("response")
    }

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        String::from_utf8_lossy(&bytes).into_owned()
    }

    async fn body_json(response: Response) -> Value {
        serde_json::from_str(&body_text(response).await).expect("json")
    }

    async fn open_session(app: &Router) -> String {
        let response = call(app, "POST", "/api/sessions", None).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let snapshot = body_json(response).await;
        assert_eq!(snapshot["preview"], "empty");
        snapshot["id"].as_str().unwrap_or_default().to_string()
    }

    #[tokio::test]
    async fn test_health() {
        let app = app(vec![]);
        let response = call(&app, "GET", "/health", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_round_trip_over_http() {
        let app = app(vec![Ok(site_json("A"))]);
        let id = open_session(&app).await;

        let response = call(
            &app,
            "POST",
            &format!("/api/sessions/{id}/messages"),
            Some(serde_json::json!({ "instruction": "A one-page portfolio" })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let snapshot = body_json(response).await;
        assert_eq!(snapshot["turns"].as_array().map(Vec::len), Some(2));
        assert_eq!(snapshot["turns"][0]["role"], "user");
        assert_eq!(snapshot["turns"][1]["role"], "model");
        assert_eq!(snapshot["preview"], "populated");
        assert_eq!(snapshot["generating"], false);
        assert!(snapshot["artifact"]["html"].as_str().unwrap_or_default().contains("<footer>"));

        let response = call(&app, "GET", &format!("/api/sessions/{id}/preview"), None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_SECURITY_POLICY).and_then(|v| v.to_str().ok()),
            Some("sandbox allow-scripts allow-same-origin")
        );
        let document = body_text(response).await;
        assert!(document.contains("<header>A</header>"));
        assert!(!document.contains("style.css"));
        assert!(!document.contains("script.js"));

        let response = call(&app, "GET", &format!("/api/sessions/{id}/frame"), None).await;
        let frame = body_text(response).await;
        assert!(frame.starts_with("<iframe"));
        assert!(frame.contains("sandbox=\"allow-scripts allow-same-origin\""));
    }

    #[tokio::test]
    async fn test_failed_generation_is_conversational() {
        let app = app(vec![Err(GenerationError::EmptyResponse)]);
        let id = open_session(&app).await;

        let response = call(
            &app,
            "POST",
            &format!("/api/sessions/{id}/messages"),
            Some(serde_json::json!({ "instruction": "anything" })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let snapshot = body_json(response).await;
        assert_eq!(snapshot["turns"][1]["content"], crate::session::APOLOGY_MESSAGE);
        assert!(snapshot["artifact"].is_null());
        assert_eq!(snapshot["preview"], "empty");
    }

    #[tokio::test]
    async fn test_empty_instruction_rejected() {
        let app = app(vec![]);
        let id = open_session(&app).await;
        let response = call(
            &app,
            "POST",
            &format!("/api/sessions/{id}/messages"),
            Some(serde_json::json!({ "instruction": "  " })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_empty_session_preview_and_export() {
        let app = app(vec![]);
        let id = open_session(&app).await;

        let response = call(&app, "GET", &format!("/api/sessions/{id}/preview"), None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains("No Preview Available"));

        let response = call(&app, "GET", &format!("/api/sessions/{id}/export/index.html"), None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_export_download() {
        let app = app(vec![Ok(site_json("A"))]);
        let id = open_session(&app).await;
        call(
            &app,
            "POST",
            &format!("/api/sessions/{id}/messages"),
            Some(serde_json::json!({ "instruction": "build" })),
        )
        .await;

        let response = call(&app, "GET", &format!("/api/sessions/{id}/export/style.css"), None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).and_then(|v| v.to_str().ok()),
            Some("text/css")
        );
        assert_eq!(
            response.headers().get(header::CONTENT_DISPOSITION).and_then(|v| v.to_str().ok()),
            Some("attachment; filename=\"style.css\"")
        );
        assert_eq!(body_text(response).await, ".cta { background: blue; } /* A */");

        let response = call(&app, "GET", &format!("/api/sessions/{id}/export/readme.md"), None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_view_mode_and_close() {
        let app = app(vec![]);
        let id = open_session(&app).await;

        let response = call(
            &app,
            "PUT",
            &format!("/api/sessions/{id}/view"),
            Some(serde_json::json!({ "mode": "code" })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["view_mode"], "code");

        let response = call(&app, "DELETE", &format!("/api/sessions/{id}"), None).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        let response = call(&app, "GET", &format!("/api/sessions/{id}"), None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let response = call(&app, "DELETE", &format!("/api/sessions/{id}"), None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_unknown_session() {
        let app = app(vec![]);
        let id = SessionId::new();
        let response = call(&app, "GET", &format!("/api/sessions/{id}"), None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_idle_session_expires() {
        let config = crate::config::SiteGenConfig::default()
            .with_api_key("k")
            .with_session_ttl(std::time::Duration::from_millis(20));
        let app = create_router(AppState::new(&config).expect("state"));
        let id = open_session(&app).await;

        tokio::time::sleep(std::time::Duration::from_millis(50)).await;

        let response = call(&app, "GET", &format!("/api/sessions/{id}"), None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
