//! `AppError` to HTTP response mapping, without a router.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use http_body_util::BodyExt;
use lectern_api::error::AppError;
use lectern_core::policy::Denied;
use lectern_core::prelude::*;
use lectern_core::requests::NewComment;
use sea_orm::DbErr;
use validator::Validate;

async fn error_to_response(err: AppError) -> (StatusCode, serde_json::Value) {
    let response = err.into_response();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    (status, json)
}

#[tokio::test]
async fn not_found_returns_404() {
    let (status, json) = error_to_response(CommentsServiceError::CommentNotFound.into()).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");
    assert_eq!(json["error"], "comment not found");
}

#[tokio::test]
async fn denial_returns_403_with_reason() {
    let err = CommentsServiceError::Forbidden(Denied("you must be enrolled in this course to comment"));
    let (status, json) = error_to_response(err.into()).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json["code"], "FORBIDDEN");
    assert_eq!(json["error"], "you must be enrolled in this course to comment");
}

#[tokio::test]
async fn validation_returns_422_with_fields() {
    let errors = NewComment {
        content: String::new(),
    }
    .validate()
    .unwrap_err();

    let (status, json) = error_to_response(CommentsServiceError::Invalid(errors).into()).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert!(!json["fields"]["content"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn chapter_mismatch_is_invalid_without_fields() {
    let (status, json) = error_to_response(ProgressServiceError::ChapterNotInCourse.into()).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(json.get("fields").is_none());
}

#[tokio::test]
async fn conflict_returns_409() {
    let (status, json) = error_to_response(CatalogServiceError::EmailTaken.into()).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["code"], "CONFLICT");
}

#[tokio::test]
async fn database_error_is_sanitized() {
    let err = ProgressServiceError::DbError(DbErr::Custom("secret connection string".into()));
    let (status, json) = error_to_response(err.into()).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "INTERNAL_ERROR");
    assert_eq!(json["error"], "An internal error occurred");
    assert!(!json.to_string().contains("secret"));
}

#[tokio::test]
async fn unauthorized_returns_401() {
    let (status, json) = error_to_response(AppError::Unauthorized("missing x-user-id header".into())).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["code"], "UNAUTHORIZED");
    assert_eq!(json["error"], "missing x-user-id header");
}
