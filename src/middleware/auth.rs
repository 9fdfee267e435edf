use axum::{
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;

use crate::auth::SessionTokenService;

/// Requires a valid `Authorization: Bearer <token>` session token and makes
/// the verified payload available to handlers as an extension.
pub async fn require_session(mut req: Request, next: Next) -> Response {
    let Some(auth_header) = req.headers().get(axum::http::header::AUTHORIZATION) else {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"ok": false, "error": "missing_authorization"})),
        )
            .into_response();
    };
    let Ok(auth_str) = auth_header.to_str() else {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"ok": false, "error": "bad_authorization"})),
        )
            .into_response();
    };
    let Some(token) = auth_str.strip_prefix("Bearer ") else {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"ok": false, "error": "unsupported_scheme"})),
        )
            .into_response();
    };

    let config = crate::config::get_config();
    let sessions = SessionTokenService::new(config.session_secret.clone());
    match sessions.verify(token) {
        Ok(payload) => {
            req.extensions_mut().insert(payload);
            next.run(req).await
        }
        // Malformed tokens and bad signatures get the same response so the
        // two cannot be told apart from outside.
        Err(_) => (
            StatusCode::UNAUTHORIZED,
            Json(json!({"ok": false, "error": "invalid_token"})),
        )
            .into_response(),
    }
}
