use sqlx::PgPool;

use crate::error::Result;
use crate::models::message::{CreateMessage, Message};

#[derive(Clone)]
pub struct MessageService {
    pool: PgPool,
}

impl MessageService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, msg: CreateMessage) -> Result<Message> {
        let message = sqlx::query_as::<_, Message>(
            r#"
            INSERT INTO messages (from_tg_id, to_tg_id, text)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(msg.from_tg_id)
        .bind(msg.to_tg_id)
        .bind(&msg.text)
        .fetch_one(&self.pool)
        .await?;

        Ok(message)
    }

    pub async fn inbox_for(&self, tg_id: i64, limit: i64) -> Result<Vec<Message>> {
        let messages = sqlx::query_as::<_, Message>(
            r#"
            SELECT * FROM messages
            WHERE to_tg_id = $1
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(tg_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(messages)
    }
}
