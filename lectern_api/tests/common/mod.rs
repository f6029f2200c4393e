#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use lectern_api::build_app;
use lectern_api::state::AppState;
use lectern_core::config::LecternConfig;
use lectern_core::test_utils;
use sea_orm::DatabaseConnection;
use serde_json::Value;
use tower::ServiceExt;

pub use lectern_core::entity::prelude::{CourseStatus, Role};
pub use lectern_core::test_utils::{create_chapter, create_course, create_user, enroll};

pub fn test_config() -> LecternConfig {
    LecternConfig {
        database_url: "sqlite::memory:".to_string(),
        host: "127.0.0.1".to_string(),
        port: 0,
        max_connections: 1,
    }
}

/// Full application router over a fresh, migrated in-memory database.
pub async fn build_test_app() -> (Router, DatabaseConnection) {
    let db = test_utils::setup_db().await;
    let app = build_app(AppState::new(db.clone(), test_config()));
    (app, db)
}

/// Sends one request through the router and returns the status and the
/// parsed JSON body (`Value::Null` when the body is empty).
pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    user_id: Option<String>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    if let Some(user_id) = user_id {
        request = request.header("x-user-id", user_id);
    }

    let request = match body {
        Some(body) => request
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

pub async fn get(app: &Router, uri: &str, user_id: Option<String>) -> (StatusCode, Value) {
    send(app, Method::GET, uri, user_id, None).await
}

pub async fn post(
    app: &Router,
    uri: &str,
    user_id: Option<String>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    send(app, Method::POST, uri, user_id, body).await
}

pub async fn put(app: &Router, uri: &str, user_id: Option<String>, body: Value) -> (StatusCode, Value) {
    send(app, Method::PUT, uri, user_id, Some(body)).await
}

pub async fn delete(app: &Router, uri: &str, user_id: Option<String>) -> (StatusCode, Value) {
    send(app, Method::DELETE, uri, user_id, None).await
}
