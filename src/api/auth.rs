//! Bearer token authentication for the REST API
//!
//! Every protected request must carry `Authorization: Bearer <token>` where the
//! token is registered in the [`SessionRegistry`]. The matching
//! [`SessionHandle`](crate::session::SessionHandle) is attached to the request
//! as an extension for handlers to pick up.

use axum::{
    Json,
    extract::{Request, State},
    http::{StatusCode, header::AUTHORIZATION},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::error::ApiError;
use crate::session::SessionRegistry;

/// Middleware resolving the bearer token to a session
///
/// Returns 401 Unauthorized when the header is missing, malformed or carries
/// an unknown token.
///
/// # Examples
///
/// ```no_run
/// use axum::{Router, middleware};
/// use channel_dl::api::auth::require_session;
/// use channel_dl::session::SessionRegistry;
///
/// let sessions = SessionRegistry::new();
/// let router: Router = Router::new()
///     .layer(middleware::from_fn_with_state(sessions, require_session));
/// ```
pub async fn require_session(
    State(sessions): State<SessionRegistry>,
    mut request: Request,
    next: Next,
) -> Response {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    let Some(header) = header else {
        return unauthorized_response("Missing Authorization header");
    };
    let Some(token) = bearer_token(header) else {
        return unauthorized_response("Authorization header must use the Bearer scheme");
    };

    match sessions.lookup(token).await {
        Some(session) => {
            request.extensions_mut().insert(session);
            next.run(request).await
        }
        None => unauthorized_response("Invalid or expired session token"),
    }
}

/// Token part of a `Bearer <token>` header value
fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

fn unauthorized_response(message: &str) -> Response {
    (StatusCode::UNAUTHORIZED, Json(ApiError::unauthorized(message))).into_response()
}
