//! Integration tests for the gateway router.
//!
//! Routing and the HTTP surface only; session semantics are covered by
//! the engine's own scenario tests.

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;
use viva_axum::{CorsConfig, ServerConfig, bootstrap, create_router};

fn test_router() -> Router {
    let config = ServerConfig::with_defaults();
    let ctx = bootstrap(&config);
    create_router(ctx, &CorsConfig::AllowAll)
}

fn session_payload() -> Value {
    json!({
        "userId": "user-1",
        "mode": "technical",
        "difficulty": "senior",
        "skills": ["rust"],
        "questions": ["Walk me through ownership and borrowing."],
        "durationSecs": 900,
    })
}

fn post_sessions(payload: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/sessions")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap()
}

#[tokio::test]
async fn health_endpoint_returns_ok() {
    let response = test_router()
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&body[..], b"OK");
}

#[tokio::test]
async fn create_session_returns_id() {
    let response = test_router()
        .oneshot(post_sessions(&session_payload()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let reply: Value = serde_json::from_slice(&body).unwrap();
    let id = reply["sessionId"].as_str().unwrap();
    assert!(!id.is_empty());
}

#[tokio::test]
async fn create_session_rejects_empty_question_list() {
    let mut payload = session_payload();
    payload["questions"] = json!([]);

    let response = test_router().oneshot(post_sessions(&payload)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let reply: Value = serde_json::from_slice(&body).unwrap();
    assert!(reply["error"].as_str().unwrap().contains("question"));
    assert_eq!(reply["status"], 400);
}

#[tokio::test]
async fn create_session_rejects_zero_duration() {
    let mut payload = session_payload();
    payload["durationSecs"] = json!(0);

    let response = test_router().oneshot(post_sessions(&payload)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn create_session_rejects_malformed_body() {
    let request = Request::builder()
        .method("POST")
        .uri("/api/sessions")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"userId":"#))
        .unwrap();

    let response = test_router().oneshot(request).await.unwrap();

    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn ws_route_requires_websocket_upgrade() {
    // A plain GET cannot upgrade; the route must refuse it client-side
    // rather than hang or 500.
    let response = test_router()
        .oneshot(
            Request::builder()
                .uri("/ws?token=tok")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn unknown_api_route_is_not_found() {
    let response = test_router()
        .oneshot(
            Request::builder()
                .uri("/api/nothing")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
