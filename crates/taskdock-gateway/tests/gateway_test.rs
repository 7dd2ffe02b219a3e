// Copyright (C) 2025 Taskdock Contributors
// SPDX-License-Identifier: MIT
//! Router-level tests for the gateway.
//!
//! The backend seam is mocked so the full HTTP pipeline (auth, binding,
//! validation, translation) is exercised without a network or a store. The
//! mock counts calls, which proves locally-rejected requests never reach
//! the RPC layer.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use tower::ServiceExt;

use taskdock_gateway::backend::{BackendError, TaskBackend};
use taskdock_gateway::routes::create_router;
use taskdock_gateway::state::AppState;
use taskdock_protocol::task_proto::Task;

const TOKEN: &str = "test-secret";

// =============================================================================
// Mock backend
// =============================================================================

/// In-memory backend standing in for the RPC client.
#[derive(Default)]
struct MockBackend {
    tasks: Mutex<HashMap<String, Task>>,
    next_id: AtomicUsize,
    calls: AtomicUsize,
}

impl MockBackend {
    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl TaskBackend for MockBackend {
    async fn create_task(&self, mut task: Task) -> Result<Task, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let n = self.next_id.fetch_add(1, Ordering::SeqCst);
        task.id = format!("generated-{}", n);
        self.tasks
            .lock()
            .unwrap()
            .insert(task.id.clone(), task.clone());
        Ok(task)
    }

    async fn get_task(&self, id: &str) -> Result<Task, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.tasks
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or_else(|| BackendError::NotFound(id.to_string()))
    }

    async fn list_tasks(&self) -> Result<Vec<Task>, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.tasks.lock().unwrap().values().cloned().collect())
    }

    async fn update_task(&self, task: Task) -> Result<Task, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.tasks
            .lock()
            .unwrap()
            .insert(task.id.clone(), task.clone());
        Ok(task)
    }

    async fn delete_task(&self, id: &str) -> Result<Task, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.tasks
            .lock()
            .unwrap()
            .remove(id)
            .ok_or_else(|| BackendError::NotFound(id.to_string()))
    }
}

/// Backend where every call fails at the transport layer.
struct UnreachableBackend;

#[async_trait::async_trait]
impl TaskBackend for UnreachableBackend {
    async fn create_task(&self, _task: Task) -> Result<Task, BackendError> {
        Err(BackendError::Connection("connection refused".to_string()))
    }
    async fn get_task(&self, _id: &str) -> Result<Task, BackendError> {
        Err(BackendError::Timeout(2000))
    }
    async fn list_tasks(&self) -> Result<Vec<Task>, BackendError> {
        Err(BackendError::Connection("connection refused".to_string()))
    }
    async fn update_task(&self, _task: Task) -> Result<Task, BackendError> {
        Err(BackendError::Timeout(2000))
    }
    async fn delete_task(&self, _id: &str) -> Result<Task, BackendError> {
        Err(BackendError::Connection("connection refused".to_string()))
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn test_app() -> (Router, Arc<MockBackend>) {
    let backend = Arc::new(MockBackend::default());
    let app = create_router(AppState::new(backend.clone(), TOKEN));
    (app, backend)
}

fn authed(request: axum::http::request::Builder) -> axum::http::request::Builder {
    request.header(header::AUTHORIZATION, format!("Bearer {}", TOKEN))
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health_requires_no_auth() {
    let (app, backend) = test_app();

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, serde_json::json!({"status": "ok"}));
    assert_eq!(backend.call_count(), 0);
}

// =============================================================================
// Authentication
// =============================================================================

#[tokio::test]
async fn test_missing_auth_header_is_401_and_backend_untouched() {
    let (app, backend) = test_app();

    let response = app
        .oneshot(Request::builder().uri("/tasks").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Missing or invalid Authorization header");
    assert_eq!(backend.call_count(), 0);
}

#[tokio::test]
async fn test_non_bearer_scheme_is_401() {
    let (app, backend) = test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/tasks")
                .header(header::AUTHORIZATION, "Basic dXNlcjpwYXNz")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(backend.call_count(), 0);
}

#[tokio::test]
async fn test_wrong_token_is_401() {
    let (app, backend) = test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/tasks")
                .header(header::AUTHORIZATION, "Bearer wrong-secret")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Invalid token");
    assert_eq!(backend.call_count(), 0);
}

// =============================================================================
// Create
// =============================================================================

#[tokio::test]
async fn test_create_returns_201_with_generated_id() {
    let (app, _backend) = test_app();

    let response = app
        .oneshot(
            authed(Request::builder().method("POST").uri("/tasks"))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"title":"Buy milk","description":"2%"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["title"], "Buy milk");
    assert_eq!(json["description"], "2%");
    assert!(!json["id"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_create_empty_title_is_400_and_backend_untouched() {
    let (app, backend) = test_app();

    let response = app
        .oneshot(
            authed(Request::builder().method("POST").uri("/tasks"))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"title":"","description":"x"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], "title is required");
    assert_eq!(backend.call_count(), 0);
}

#[tokio::test]
async fn test_create_oversized_title_is_400() {
    let (app, backend) = test_app();

    let body = serde_json::json!({"title": "a".repeat(101), "description": "x"});
    let response = app
        .oneshot(
            authed(Request::builder().method("POST").uri("/tasks"))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], "title must be at most 100 characters");
    assert_eq!(backend.call_count(), 0);
}

#[tokio::test]
async fn test_create_malformed_json_is_400_and_backend_untouched() {
    let (app, backend) = test_app();

    let response = app
        .oneshot(
            authed(Request::builder().method("POST").uri("/tasks"))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert!(json["error"].is_string());
    assert_eq!(backend.call_count(), 0);
}

#[tokio::test]
async fn test_create_backend_failure_is_500() {
    let app = create_router(AppState::new(Arc::new(UnreachableBackend), TOKEN));

    let response = app
        .oneshot(
            authed(Request::builder().method("POST").uri("/tasks"))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"title":"Buy milk","description":"2%"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response).await;
    assert!(json["error"].is_string());
}

// =============================================================================
// List
// =============================================================================

#[tokio::test]
async fn test_list_empty_store_is_empty_array() {
    let (app, _backend) = test_app();

    let response = app
        .oneshot(authed(Request::builder().uri("/tasks")).body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json, serde_json::json!([]));
}

#[tokio::test]
async fn test_list_backend_failure_is_500_with_generic_message() {
    let app = create_router(AppState::new(Arc::new(UnreachableBackend), TOKEN));

    let response = app
        .oneshot(authed(Request::builder().uri("/tasks")).body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response).await;
    assert_eq!(json["error"], "failed to list tasks");
}

// =============================================================================
// Get
// =============================================================================

#[tokio::test]
async fn test_get_missing_task_is_404_naming_the_id() {
    let (app, _backend) = test_app();

    let response = app
        .oneshot(
            authed(Request::builder().uri("/tasks/abc123"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["error"], "task with id abc123 not found");
}

#[tokio::test]
async fn test_get_backend_failure_is_500_with_generic_message() {
    let app = create_router(AppState::new(Arc::new(UnreachableBackend), TOKEN));

    let response = app
        .oneshot(
            authed(Request::builder().uri("/tasks/abc123"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response).await;
    // Timeouts and transport failures surface generically, never verbatim
    assert_eq!(json["error"], "failed to get task");
}

// =============================================================================
// Update
// =============================================================================

#[tokio::test]
async fn test_put_overwrites_body_id_with_path_id() {
    let (app, _backend) = test_app();

    let response = app
        .oneshot(
            authed(Request::builder().method("PUT").uri("/tasks/abc123"))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    r#"{"id":"body-id","title":"New","description":"D"}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(
        json,
        serde_json::json!({"id": "abc123", "title": "New", "description": "D"})
    );
}

#[tokio::test]
async fn test_put_upserts_unknown_id_then_get_finds_it() {
    let (app, _backend) = test_app();

    let response = app
        .clone()
        .oneshot(
            authed(Request::builder().method("PUT").uri("/tasks/abc123"))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"title":"New","description":"D"}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(
            authed(Request::builder().uri("/tasks/abc123"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["id"], "abc123");
    assert_eq!(json["title"], "New");
}

#[tokio::test]
async fn test_put_validation_failure_is_400_and_backend_untouched() {
    let (app, backend) = test_app();

    let response = app
        .oneshot(
            authed(Request::builder().method("PUT").uri("/tasks/abc123"))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"title":"x","description":""}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], "description is required");
    assert_eq!(backend.call_count(), 0);
}

// =============================================================================
// Delete
// =============================================================================

#[tokio::test]
async fn test_delete_missing_task_is_404() {
    let (app, _backend) = test_app();

    let response = app
        .oneshot(
            authed(Request::builder().method("DELETE").uri("/tasks/abc123"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["error"], "task with id abc123 not found");
}

// =============================================================================
// Full lifecycle scenarios
// =============================================================================

#[tokio::test]
async fn test_create_get_delete_lifecycle() {
    let (app, _backend) = test_app();

    // POST /tasks
    let response = app
        .clone()
        .oneshot(
            authed(Request::builder().method("POST").uri("/tasks"))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"title":"Buy milk","description":"2%"}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    let id = created["id"].as_str().unwrap().to_string();

    // GET /tasks/{id} returns the identical body
    let response = app
        .clone()
        .oneshot(
            authed(Request::builder().uri(format!("/tasks/{}", id)))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, created);

    // DELETE /tasks/{id} returns the same body
    let response = app
        .clone()
        .oneshot(
            authed(Request::builder().method("DELETE").uri(format!("/tasks/{}", id)))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, created);

    // GET /tasks/{id} is now a 404
    let response = app
        .oneshot(
            authed(Request::builder().uri(format!("/tasks/{}", id)))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_reflects_created_tasks() {
    let (app, _backend) = test_app();

    for (title, description) in [("a", "x"), ("b", "y")] {
        let body = serde_json::json!({"title": title, "description": description});
        let response = app
            .clone()
            .oneshot(
                authed(Request::builder().method("POST").uri("/tasks"))
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = app
        .oneshot(authed(Request::builder().uri("/tasks")).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json.as_array().unwrap().len(), 2);
}
