//! HTTP surface of the Lectern course platform.
//!
//! Exposes the router builder, state, extractors and error mapping so the
//! binary entrypoint and the integration tests build the same app.

pub mod error;
pub mod extract;
pub mod routes;
pub mod state;

use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderName, Method};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::extract::USER_ID_HEADER;
use crate::state::AppState;

/// Builds the full application router with its middleware stack.
pub fn build_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([CONTENT_TYPE, HeaderName::from_static(USER_ID_HEADER)]);

    Router::new()
        // Health check stays outside /api
        .merge(routes::health::router())
        .nest("/api", routes::api_routes())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}
