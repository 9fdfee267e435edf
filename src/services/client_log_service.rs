use sqlx::PgPool;

use crate::error::Result;
use crate::models::client_log::CreateClientLog;

#[derive(Clone)]
pub struct ClientLogService {
    pool: PgPool,
}

impl ClientLogService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, entry: CreateClientLog) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO client_logs (tg_id, level, message, context)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(entry.tg_id)
        .bind(&entry.level)
        .bind(&entry.message)
        .bind(&entry.context)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
