pub mod comments;
pub mod courses;
pub mod health;
pub mod progress;
pub mod users;

use axum::Router;

use crate::state::AppState;

/// Builds the `/api` route tree.
///
/// ```text
/// /users                       register (POST)
/// /users/{id}                  deactivate (DELETE, admin)
///
/// /courses                     list approved, create
/// /courses/{id}                get, delete
/// /courses/{id}/review         approve or reject (PUT, admin)
/// /courses/{id}/chapters       list, add
/// /courses/{id}/enroll         enroll (POST)
/// /courses/{id}/comments       threaded list, post
/// /chapters/{id}               delete
/// /chapters/{id}/comments      threaded list, post
/// /enrollments                 the caller's enrollments
///
/// /comments/{id}               delete
/// /comments/{id}/reply         reply (POST)
/// /comments/{id}/like          toggle like (POST)
///
/// /progress                    upsert chapter progress (PUT)
/// /progress/{id}               course progress of the caller
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(users::router())
        .merge(courses::router())
        .merge(comments::router())
        .merge(progress::router())
}
