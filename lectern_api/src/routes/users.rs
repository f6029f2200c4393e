use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{delete, post};
use axum::Router;
use lectern_core::entity::prelude::UserModel;
use lectern_core::prelude::*;
use lectern_core::requests::NewUser;
use serde_json::{json, Value};

use crate::error::AppResult;
use crate::extract::{AppJson, AppPath, CurrentUser};
use crate::state::AppState;

/// POST /users
///
/// Open to anonymous callers; creating an admin needs an admin actor.
async fn register(
    State(state): State<AppState>,
    actor: Option<CurrentUser>,
    AppJson(body): AppJson<NewUser>,
) -> AppResult<(StatusCode, AppJson<UserModel>)> {
    let actor = actor.map(|CurrentUser(actor)| actor);
    let user = state.catalog.register(actor.as_ref(), body).await?;
    Ok((StatusCode::CREATED, AppJson(user)))
}

/// DELETE /users/{id}
async fn deactivate(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    AppPath(user_id): AppPath<UserId>,
) -> AppResult<AppJson<Value>> {
    state.catalog.deactivate_user(&actor, user_id).await?;
    Ok(AppJson(json!({ "message": "deactivated" })))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", post(register))
        .route("/users/{id}", delete(deactivate))
}
