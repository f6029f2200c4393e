//! Request extractors shared by the route handlers.

use axum::extract::{FromRequest, FromRequestParts, OptionalFromRequestParts};
use axum::http::request::Parts;
use axum::response::{IntoResponse, Response};
use lectern_core::prelude::*;
use serde::Serialize;

use crate::error::AppError;
use crate::state::AppState;

/// Header carrying the id of the acting user, set by the upstream gateway.
pub const USER_ID_HEADER: &str = "x-user-id";

/// The acting user, resolved from the `x-user-id` header.
///
/// Rejects with 401 when the header is missing, malformed, or names a user
/// that doesn't exist or has been deactivated. Use `Option<CurrentUser>` on
/// routes that also serve anonymous callers.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Actor);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(USER_ID_HEADER)
            .ok_or_else(|| AppError::Unauthorized(format!("missing {USER_ID_HEADER} header")))?;

        resolve(raw.to_str().ok(), state).await
    }
}

impl OptionalFromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Option<Self>, Self::Rejection> {
        match parts.headers.get(USER_ID_HEADER) {
            Some(raw) => Ok(Some(resolve(raw.to_str().ok(), state).await?)),
            None => Ok(None),
        }
    }
}

async fn resolve(raw: Option<&str>, state: &AppState) -> Result<CurrentUser, AppError> {
    let user_id = raw
        .and_then(|value| UserId::parse_str(value.trim()).ok())
        .ok_or_else(|| AppError::Unauthorized(format!("malformed {USER_ID_HEADER} header")))?;

    match state.catalog.active_user(user_id).await {
        Ok(user) => Ok(CurrentUser(Actor::from(&user))),
        Err(CatalogServiceError::UserNotFound) => {
            tracing::debug!(%user_id, "rejected unknown or inactive user");
            Err(AppError::Unauthorized("unknown or inactive user".to_string()))
        }
        Err(err) => Err(err.into()),
    }
}

/// `axum::Json` with rejections rendered as [`AppError`].
#[derive(Debug, Clone, Copy, Default, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

impl<T: Serialize> IntoResponse for AppJson<T> {
    fn into_response(self) -> Response {
        axum::Json(self.0).into_response()
    }
}

/// `axum::extract::Path` with rejections rendered as [`AppError`].
#[derive(Debug, Clone, Copy, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct AppPath<T>(pub T);
