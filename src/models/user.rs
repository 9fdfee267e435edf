use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::auth::TelegramUser;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub tg_id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub lang: Option<String>,
    pub photo_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct UpsertUser {
    pub tg_id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub lang: Option<String>,
    pub photo_url: Option<String>,
}

impl From<&TelegramUser> for UpsertUser {
    fn from(user: &TelegramUser) -> Self {
        Self {
            tg_id: user.id,
            username: user.username.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            lang: user.language_code.clone(),
            photo_url: user.photo_url.clone(),
        }
    }
}
