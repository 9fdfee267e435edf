use sqlx::PgPool;

use crate::error::Result;
use crate::models::user::{UpsertUser, User};

#[derive(Clone)]
pub struct UserService {
    pool: PgPool,
}

impl UserService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts or refreshes the profile row for a verified Telegram user.
    pub async fn upsert(&self, user: UpsertUser) -> Result<User> {
        let stored = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (tg_id, username, first_name, last_name, lang, photo_url)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (tg_id) DO UPDATE SET
                username = EXCLUDED.username,
                first_name = EXCLUDED.first_name,
                last_name = EXCLUDED.last_name,
                lang = EXCLUDED.lang,
                photo_url = EXCLUDED.photo_url,
                updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(user.tg_id)
        .bind(&user.username)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.lang)
        .bind(&user.photo_url)
        .fetch_one(&self.pool)
        .await?;

        Ok(stored)
    }

    pub async fn get_by_tg_id(&self, tg_id: i64) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT * FROM users
            WHERE tg_id = $1
            "#,
        )
        .bind(tg_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }
}
