//! HTTP surface for discussions (feature `server`).
//!
//! | Method | Path                       | Body / Response                                   |
//! |--------|----------------------------|---------------------------------------------------|
//! | POST   | `/start`                   | `{"task"}` → `{"id","roles","goal","initial_message"}` |
//! | GET    | `/stream/{discussion_id}`  | `text/event-stream` of the run's events           |
//!
//! A missing or blank task is rejected with `400 {"error": "Task required"}`.

use crate::error::DiscussionError;
use crate::orchestrator::DiscussionOrchestrator;
use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use futures_util::StreamExt;
use log::{error, info};
use serde_json::{json, Value};
use std::convert::Infallible;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

/// Router exposing `/start` and `/stream/{discussion_id}`.
pub fn router(orchestrator: DiscussionOrchestrator) -> Router {
    Router::new()
        .route("/start", post(start_discussion))
        .route("/stream/{discussion_id}", get(stream_discussion))
        .layer(CorsLayer::permissive())
        .with_state(orchestrator)
}

/// Serve the router on `listener` until the process exits.
pub async fn serve(
    listener: TcpListener,
    orchestrator: DiscussionOrchestrator,
) -> Result<(), std::io::Error> {
    if let Ok(addr) = listener.local_addr() {
        info!("boardroom server listening on {}", addr);
    }
    axum::serve(listener, router(orchestrator)).await
}

async fn start_discussion(
    State(orchestrator): State<DiscussionOrchestrator>,
    Json(payload): Json<Value>,
) -> Response {
    let task = task_text(payload.get("task"));

    match orchestrator.create_discussion(&task).await {
        Ok(created) => (
            StatusCode::OK,
            Json(json!({
                "id": created.id,
                "roles": created.role_descriptions(),
                "goal": created.goal,
                "initial_message": created.opening_message,
            })),
        )
            .into_response(),
        Err(DiscussionError::InvalidInput(_)) => (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "Task required"})),
        )
            .into_response(),
        Err(err) => {
            error!("POST /start failed: {}", err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": err.to_string()})),
            )
                .into_response()
        }
    }
}

async fn stream_discussion(
    State(orchestrator): State<DiscussionOrchestrator>,
    Path(discussion_id): Path<String>,
) -> Response {
    let frames = orchestrator
        .run_stream(&discussion_id)
        .map(|event| Ok::<_, Infallible>(event.to_sse()));

    (
        [
            (header::CONTENT_TYPE, "text/event-stream"),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        Body::from_stream(frames),
    )
        .into_response()
}

/// The task as text. Non-zero numbers are accepted in their decimal form; anything else
/// that is not a string counts as missing.
fn task_text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(task)) => task.clone(),
        Some(Value::Number(n)) if n.as_f64() != Some(0.0) => n.to_string(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_text_accepts_strings_and_numbers() {
        assert_eq!(task_text(Some(&json!("Open a cafe"))), "Open a cafe");
        assert_eq!(task_text(Some(&json!(42))), "42");
        assert_eq!(task_text(Some(&json!(0))), "");
        assert_eq!(task_text(Some(&json!(true))), "");
        assert_eq!(task_text(Some(&Value::Null)), "");
        assert_eq!(task_text(None), "");
    }
}
