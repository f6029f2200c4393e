use axum::extract::State;
use axum::routing::{get, put};
use axum::Router;
use lectern_core::prelude::*;
use lectern_core::requests::ProgressUpdate;
use lectern_core::service::progress::{CourseProgress, ProgressReport};

use crate::error::AppResult;
use crate::extract::{AppJson, AppPath, CurrentUser};
use crate::state::AppState;

/// PUT /progress
async fn update_progress(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    AppJson(body): AppJson<ProgressUpdate>,
) -> AppResult<AppJson<ProgressReport>> {
    Ok(AppJson(state.progress.update_progress(&actor, body).await?))
}

/// GET /progress/{course_id}
async fn course_progress(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    AppPath(course_id): AppPath<CourseId>,
) -> AppResult<AppJson<CourseProgress>> {
    Ok(AppJson(state.progress.course_progress(&actor, course_id).await?))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/progress", put(update_progress))
        .route("/progress/{id}", get(course_progress))
}
