//! Bearer token authentication middleware

use axum::{
    Json,
    body::Body,
    extract::{Request, State},
    http::{StatusCode, header::AUTHORIZATION},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::debug;

/// Reject requests without `Authorization: Bearer <token>`
pub async fn auth_middleware(
    State(expected_token): State<String>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, AuthError> {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingToken)?
        .strip_prefix("Bearer ")
        .ok_or(AuthError::InvalidFormat)?;

    if token != expected_token {
        debug!("rejected request to {} with invalid token", request.uri().path());
        return Err(AuthError::InvalidToken);
    }

    Ok(next.run(request).await)
}

#[derive(Debug)]
pub enum AuthError {
    MissingToken,
    InvalidFormat,
    InvalidToken,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthError::MissingToken => (StatusCode::UNAUTHORIZED, "missing Authorization header"),
            AuthError::InvalidFormat => (
                StatusCode::UNAUTHORIZED,
                "invalid Authorization format (expected: Bearer <token>)",
            ),
            AuthError::InvalidToken => (StatusCode::FORBIDDEN, "invalid token"),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
