use axum::{extract::State, http::HeaderMap, Json};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::Result;
use crate::models::client_log::CreateClientLog;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ClientLogRequest {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub message: Option<String>,
    pub extra: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct SeenRequest {
    pub user: Option<Value>,
}

/// Client-side log intake. A bearer token is honored best-effort: a valid one
/// attaches the verified user id, anything else records the line anonymously.
/// Log reporting must never fail the client, so storage errors are swallowed
/// into a warning.
pub async fn ingest_log(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<ClientLogRequest>,
) -> Result<Json<Value>> {
    let tg_id = bearer_identity(&state, &headers);
    let level = req.kind.unwrap_or_else(|| "event".to_string());

    tracing::info!(
        tg_id = ?tg_id,
        kind = %level,
        text = req.message.as_deref().unwrap_or(""),
        "client log"
    );

    let entry = CreateClientLog {
        tg_id,
        level,
        message: req.message,
        context: req.extra,
    };
    if let Err(e) = state.client_log_service.create(entry).await {
        tracing::warn!("Failed to store client log: {:?}", e);
    }

    Ok(Json(json!({"ok": true})))
}

pub async fn twa_seen(Json(req): Json<SeenRequest>) -> Json<Value> {
    let id = req
        .user
        .as_ref()
        .and_then(|u| u.get("id"))
        .and_then(Value::as_i64);
    let username = req
        .user
        .as_ref()
        .and_then(|u| u.get("username"))
        .and_then(Value::as_str)
        .map(str::to_string);

    tracing::info!(id = ?id, username = ?username, "webapp user seen");
    Json(json!({"ok": true}))
}

fn bearer_identity(state: &AppState, headers: &HeaderMap) -> Option<i64> {
    let auth = headers.get(axum::http::header::AUTHORIZATION)?.to_str().ok()?;
    let token = auth.strip_prefix("Bearer ")?;
    state.session_service.verify(token).ok().map(|p| p.id)
}
