use sqlx::PgPool;

use crate::error::Result;
use crate::models::content::{ContentBlock, UpsertContentBlock};

#[derive(Clone)]
pub struct ContentService {
    pool: PgPool,
}

impl ContentService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get_by_slug(&self, slug: &str) -> Result<Option<ContentBlock>> {
        let block = sqlx::query_as::<_, ContentBlock>(
            r#"
            SELECT slug, title, body, updated_by, updated_at FROM content_blocks
            WHERE slug = $1
            "#,
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;

        Ok(block)
    }

    pub async fn upsert(&self, block: UpsertContentBlock) -> Result<ContentBlock> {
        let stored = sqlx::query_as::<_, ContentBlock>(
            r#"
            INSERT INTO content_blocks (slug, title, body, updated_by)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (slug) DO UPDATE SET
                title = EXCLUDED.title,
                body = EXCLUDED.body,
                updated_by = EXCLUDED.updated_by,
                updated_at = NOW()
            RETURNING slug, title, body, updated_by, updated_at
            "#,
        )
        .bind(&block.slug)
        .bind(&block.title)
        .bind(&block.body)
        .bind(&block.updated_by)
        .fetch_one(&self.pool)
        .await?;

        Ok(stored)
    }

    pub async fn list_recent(&self, limit: i64) -> Result<Vec<ContentBlock>> {
        let blocks = sqlx::query_as::<_, ContentBlock>(
            r#"
            SELECT slug, title, body, updated_by, updated_at FROM content_blocks
            ORDER BY updated_at DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(blocks)
    }
}
