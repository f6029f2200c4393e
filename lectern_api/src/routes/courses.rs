use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{delete, get, post, put};
use axum::Router;
use lectern_core::entity::prelude::{ChapterModel, CourseModel, EnrollmentModel};
use lectern_core::prelude::*;
use lectern_core::requests::{CourseReview, NewChapter, NewCourse};
use lectern_core::service::catalog::EnrolledCourse;
use serde_json::{json, Value};

use crate::error::AppResult;
use crate::extract::{AppJson, AppPath, CurrentUser};
use crate::state::AppState;

async fn list_courses(State(state): State<AppState>) -> AppResult<AppJson<Vec<CourseModel>>> {
    Ok(AppJson(state.catalog.list_courses().await?))
}

async fn create_course(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    AppJson(body): AppJson<NewCourse>,
) -> AppResult<(StatusCode, AppJson<CourseModel>)> {
    let course = state.catalog.create_course(&actor, body).await?;
    Ok((StatusCode::CREATED, AppJson(course)))
}

async fn get_course(
    State(state): State<AppState>,
    AppPath(course_id): AppPath<CourseId>,
) -> AppResult<AppJson<CourseModel>> {
    Ok(AppJson(state.catalog.get_course(course_id).await?))
}

async fn delete_course(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    AppPath(course_id): AppPath<CourseId>,
) -> AppResult<AppJson<Value>> {
    state.catalog.delete_course(&actor, course_id).await?;
    Ok(AppJson(json!({ "message": "deleted" })))
}

async fn review_course(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    AppPath(course_id): AppPath<CourseId>,
    AppJson(body): AppJson<CourseReview>,
) -> AppResult<AppJson<CourseModel>> {
    Ok(AppJson(state.catalog.review_course(&actor, course_id, body).await?))
}

async fn list_chapters(
    State(state): State<AppState>,
    AppPath(course_id): AppPath<CourseId>,
) -> AppResult<AppJson<Vec<ChapterModel>>> {
    Ok(AppJson(state.catalog.list_chapters(course_id).await?))
}

async fn add_chapter(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    AppPath(course_id): AppPath<CourseId>,
    AppJson(body): AppJson<NewChapter>,
) -> AppResult<(StatusCode, AppJson<ChapterModel>)> {
    let chapter = state.catalog.add_chapter(&actor, course_id, body).await?;
    Ok((StatusCode::CREATED, AppJson(chapter)))
}

async fn delete_chapter(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    AppPath(chapter_id): AppPath<ChapterId>,
) -> AppResult<AppJson<Value>> {
    state.catalog.delete_chapter(&actor, chapter_id).await?;
    Ok(AppJson(json!({ "message": "deleted" })))
}

/// 201 for a new enrollment, 200 when the student was already enrolled.
async fn enroll(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    AppPath(course_id): AppPath<CourseId>,
) -> AppResult<(StatusCode, AppJson<EnrollmentModel>)> {
    let outcome = state.catalog.enroll(&actor, course_id).await?;
    let status = if outcome.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, AppJson(outcome.enrollment)))
}

async fn list_enrollments(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
) -> AppResult<AppJson<Vec<EnrolledCourse>>> {
    Ok(AppJson(state.catalog.list_enrollments(&actor).await?))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/courses", get(list_courses).post(create_course))
        .route("/courses/{id}", get(get_course).delete(delete_course))
        .route("/courses/{id}/review", put(review_course))
        .route("/courses/{id}/chapters", get(list_chapters).post(add_chapter))
        .route("/courses/{id}/enroll", post(enroll))
        .route("/chapters/{id}", delete(delete_chapter))
        .route("/enrollments", get(list_enrollments))
}
