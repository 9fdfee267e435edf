use sqlx::PgPool;

use crate::error::Result;

#[derive(Clone)]
pub struct AdminService {
    pool: PgPool,
}

impl AdminService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn is_admin(&self, tg_id: i64) -> Result<bool> {
        let exists: (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS(SELECT 1 FROM admins WHERE user_id = $1)
            "#,
        )
        .bind(tg_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists.0)
    }
}
