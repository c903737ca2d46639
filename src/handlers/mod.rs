pub mod users;

// Common handler utilities
use crate::{
    error::{AppError, AppResult},
    AppState,
};
use axum::{
    extract::{Query, Request, State},
    http::{HeaderMap, Method, StatusCode, Uri},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::any::Any;

pub const API_KEY_HEADER: &str = "X-API-Key";

// Extract API key from the first `api_key` query parameter, falling back to the X-API-Key header
pub fn extract_api_key(uri: &Uri, headers: &HeaderMap) -> Option<String> {
    Query::<Vec<(String, String)>>::try_from_uri(uri)
        .ok()
        .and_then(|Query(pairs)| {
            pairs
                .into_iter()
                .find(|(name, _)| name == "api_key")
                .map(|(_, value)| value)
        })
        .or_else(|| {
            headers
                .get(API_KEY_HEADER)
                .and_then(|header| header.to_str().ok())
                .map(|s| s.to_string())
        })
}

/// Rejects any request whose credential does not match the configured key.
/// Runs before routing, so unknown paths are also answered with 401.
pub async fn require_api_key(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> AppResult<Response> {
    match extract_api_key(request.uri(), request.headers()) {
        Some(api_key) if api_key == state.config.security.api_key => Ok(next.run(request).await),
        _ => Err(AppError::unauthorized("Unauthorized")),
    }
}

/// Answers every OPTIONS request with an empty 204, whatever the path or key.
pub async fn preflight(request: Request, next: Next) -> Response {
    if request.method() == Method::OPTIONS {
        return StatusCode::NO_CONTENT.into_response();
    }

    next.run(request).await
}

/// HEAD is not part of the route table; without this axum would answer it from
/// the GET handlers.
pub async fn reject_head(request: Request, next: Next) -> Response {
    if request.method() == Method::HEAD {
        return route_not_found().await.into_response();
    }

    next.run(request).await
}

pub async fn route_not_found() -> AppError {
    AppError::not_found("Route not found")
}

// Panics inside a handler surface like any other unclassified failure
pub fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "Internal server error".to_string()
    };

    AppError::internal(message).into_response()
}
