use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A log line reported by the WebApp frontend. `tg_id` is present only when
/// the report carried a valid session token.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ClientLog {
    pub id: Uuid,
    pub tg_id: Option<i64>,
    pub level: String,
    pub message: Option<String>,
    pub context: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateClientLog {
    pub tg_id: Option<i64>,
    pub level: String,
    pub message: Option<String>,
    pub context: Option<serde_json::Value>,
}
