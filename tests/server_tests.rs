#![cfg(feature = "server")]

mod common;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use boardroom::server::router;
use boardroom::{DiscussionOrchestrator, InMemoryStore};
use common::{catalog_with_defaults, test_config, ScriptedClient, REPORT_TEXT};
use http_body_util::BodyExt;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

fn orchestrator() -> DiscussionOrchestrator {
    DiscussionOrchestrator::new(
        Arc::new(ScriptedClient::new()),
        Arc::new(catalog_with_defaults(20)),
        Arc::new(InMemoryStore::new()),
        &test_config(),
    )
}

fn start_request(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/start")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn test_start_requires_task() {
    let app = router(orchestrator());

    for body in [r#"{}"#, r#"{"task": ""}"#, r#"{"task": 0}"#, r#"{"task": null}"#] {
        let response = app.clone().oneshot(start_request(body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json: Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(json["error"], "Task required");
    }
}

#[tokio::test]
async fn test_start_accepts_numeric_task() {
    let app = router(orchestrator());
    let response = app.oneshot(start_request(r#"{"task": 42}"#)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let created: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(created["roles"].as_object().unwrap().len(), 5);
}

#[tokio::test]
async fn test_start_then_stream() {
    let app = router(orchestrator());

    let response = app
        .clone()
        .oneshot(start_request(r#"{"task": "Launch a subscription coffee box"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let created: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(created["roles"].as_object().unwrap().len(), 5);
    assert!(created["goal"].as_str().unwrap().contains("Vision"));
    assert!(created["initial_message"].as_str().unwrap().contains('5'));
    let id = created["id"].as_str().unwrap().to_string();

    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/stream/{}", id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "text/event-stream"
    );

    let text = body_text(response).await;
    let frames: Vec<&str> = text.split_terminator("\n\n").collect();
    assert!(frames.iter().all(|frame| frame.starts_with("event: ")));
    assert_eq!(
        frames
            .iter()
            .filter(|frame| frame.starts_with("event: message\n"))
            .count(),
        10
    );
    assert_eq!(
        frames.last().copied(),
        Some(format!("event: finished\ndata: {}", REPORT_TEXT.replace('\n', "\\n")).as_str())
    );
}

#[tokio::test]
async fn test_stream_of_unknown_discussion_is_empty() {
    let app = router(orchestrator());
    let response = app
        .oneshot(
            Request::builder()
                .uri("/stream/nope")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "");
}
