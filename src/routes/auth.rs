use axum::{extract::State, http::StatusCode, Extension, Json};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::{SessionPayload, TelegramUser};
use crate::error::{Error, Result};
use crate::models::user::UpsertUser;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct TwaAuthRequest {
    #[serde(rename = "initData")]
    pub init_data: Option<String>,
}

/// Exchanges Telegram WebApp `initData` for a session token. The generic
/// "bad signature" answer is intentional; verification internals stay
/// server-side.
pub async fn twa_auth(
    State(state): State<AppState>,
    Json(req): Json<TwaAuthRequest>,
) -> Result<(StatusCode, Json<Value>)> {
    let Some(init_data) = req.init_data.filter(|s| !s.is_empty()) else {
        return Ok((
            StatusCode::BAD_REQUEST,
            Json(json!({"ok": false, "error": "no initData"})),
        ));
    };

    let fields = match state.init_data_verifier.verify(&init_data) {
        Ok(fields) => fields,
        Err(_) => {
            return Ok((
                StatusCode::UNAUTHORIZED,
                Json(json!({"ok": false, "error": "bad signature"})),
            ));
        }
    };

    // Signature checked out but the payload is unusable: a client bug, not a
    // spoofing attempt, so it gets a distinct status and message.
    let user = match TelegramUser::from_fields(&fields) {
        Ok(user) => user,
        Err(err) => {
            tracing::warn!(error = %err, "verified init data carried an unusable user field");
            return Ok((
                StatusCode::BAD_REQUEST,
                Json(json!({"ok": false, "error": "invalid user payload"})),
            ));
        }
    };

    let stored = state.user_service.upsert(UpsertUser::from(&user)).await?;

    let payload = SessionPayload::new(stored.tg_id, stored.username.clone());
    let token = state.session_service.issue(&payload).map_err(Error::Json)?;

    tracing::info!(user_id = stored.tg_id, username = ?stored.username, "webapp auth ok");

    Ok((
        StatusCode::OK,
        Json(json!({
            "ok": true,
            "me": {
                "id": stored.tg_id,
                "name": stored.first_name,
                "username": stored.username,
            },
            "token": token,
        })),
    ))
}

/// Echoes the verified session payload back to the caller.
pub async fn whoami(Extension(session): Extension<SessionPayload>) -> Json<Value> {
    Json(json!({"ok": true, "payload": session}))
}
