use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ContentBlock {
    pub slug: String,
    pub title: String,
    pub body: String,
    pub updated_by: Option<String>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct UpsertContentBlock {
    pub slug: String,
    pub title: String,
    pub body: String,
    pub updated_by: Option<String>,
}
