use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{delete, get, post};
use axum::Router;
use lectern_core::prelude::*;
use lectern_core::requests::NewComment;
use lectern_core::service::comments::CommentView;
use serde::Serialize;
use serde_json::{json, Value};

use crate::error::AppResult;
use crate::extract::{AppJson, AppPath, CurrentUser};
use crate::state::AppState;

#[derive(Serialize)]
struct LikeResponse {
    message: &'static str,
    liked: bool,
}

async fn list(
    state: &AppState,
    subject: Subject,
    viewer: Option<CurrentUser>,
) -> AppResult<AppJson<Vec<CommentNode>>> {
    state.comments.require_subject(subject).await?;

    let viewer = viewer.map(|CurrentUser(actor)| actor.id);
    Ok(AppJson(state.comments.list_threaded(subject, viewer).await?))
}

async fn post_comment(
    state: &AppState,
    actor: &Actor,
    subject: Subject,
    body: NewComment,
) -> AppResult<(StatusCode, AppJson<CommentView>)> {
    let comment = state.comments.post_comment(actor, subject, body).await?;
    Ok((StatusCode::CREATED, AppJson(comment)))
}

/// GET /courses/{id}/comments
async fn list_course_comments(
    State(state): State<AppState>,
    viewer: Option<CurrentUser>,
    AppPath(course_id): AppPath<CourseId>,
) -> AppResult<AppJson<Vec<CommentNode>>> {
    list(&state, Subject::Course(course_id), viewer).await
}

/// POST /courses/{id}/comments
async fn post_course_comment(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    AppPath(course_id): AppPath<CourseId>,
    AppJson(body): AppJson<NewComment>,
) -> AppResult<(StatusCode, AppJson<CommentView>)> {
    post_comment(&state, &actor, Subject::Course(course_id), body).await
}

/// GET /chapters/{id}/comments
async fn list_chapter_comments(
    State(state): State<AppState>,
    viewer: Option<CurrentUser>,
    AppPath(chapter_id): AppPath<ChapterId>,
) -> AppResult<AppJson<Vec<CommentNode>>> {
    list(&state, Subject::Chapter(chapter_id), viewer).await
}

/// POST /chapters/{id}/comments
async fn post_chapter_comment(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    AppPath(chapter_id): AppPath<ChapterId>,
    AppJson(body): AppJson<NewComment>,
) -> AppResult<(StatusCode, AppJson<CommentView>)> {
    post_comment(&state, &actor, Subject::Chapter(chapter_id), body).await
}

/// POST /comments/{id}/reply
async fn reply(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    AppPath(parent_id): AppPath<CommentId>,
    AppJson(body): AppJson<NewComment>,
) -> AppResult<(StatusCode, AppJson<CommentView>)> {
    let comment = state.comments.reply(&actor, parent_id, body).await?;
    Ok((StatusCode::CREATED, AppJson(comment)))
}

/// DELETE /comments/{id}
async fn delete_comment(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    AppPath(comment_id): AppPath<CommentId>,
) -> AppResult<AppJson<Value>> {
    state.comments.delete_comment(&actor, comment_id).await?;
    Ok(AppJson(json!({ "message": "deleted" })))
}

/// POST /comments/{id}/like
async fn toggle_like(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    AppPath(comment_id): AppPath<CommentId>,
) -> AppResult<AppJson<LikeResponse>> {
    let toggle = state.comments.toggle_like(&actor, comment_id).await?;
    let message = if toggle.liked { "Like added" } else { "Like removed" };

    Ok(AppJson(LikeResponse {
        message,
        liked: toggle.liked,
    }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/courses/{id}/comments",
            get(list_course_comments).post(post_course_comment),
        )
        .route(
            "/chapters/{id}/comments",
            get(list_chapter_comments).post(post_chapter_comment),
        )
        .route("/comments/{id}", delete(delete_comment))
        .route("/comments/{id}/reply", post(reply))
        .route("/comments/{id}/like", post(toggle_like))
}
