use axum::{extract::State, Extension, Json};
use serde::Deserialize;
use serde_json::{json, Value};
use validator::Validate;

use crate::auth::SessionPayload;
use crate::error::Result;
use crate::models::message::CreateMessage;
use crate::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct SendMessageRequest {
    #[serde(rename = "toUserId")]
    pub to_user_id: i64,
    #[validate(length(min = 1, max = 4096))]
    pub text: String,
}

pub async fn send_message(
    State(state): State<AppState>,
    Extension(session): Extension<SessionPayload>,
    Json(req): Json<SendMessageRequest>,
) -> Result<Json<Value>> {
    req.validate()?;

    state
        .message_service
        .create(CreateMessage {
            from_tg_id: session.id,
            to_tg_id: req.to_user_id,
            text: req.text,
        })
        .await?;

    Ok(Json(json!({"ok": true})))
}

/// Latest messages addressed to the authenticated user.
pub async fn inbox(
    State(state): State<AppState>,
    Extension(session): Extension<SessionPayload>,
) -> Result<Json<Value>> {
    let items = state.message_service.inbox_for(session.id, 20).await?;
    Ok(Json(json!({"items": items})))
}
