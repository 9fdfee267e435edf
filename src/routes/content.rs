use axum::{
    extract::{Path, State},
    Json,
};

use crate::error::{Error, Result};
use crate::models::content::ContentBlock;
use crate::AppState;

pub async fn get_content(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<ContentBlock>> {
    let block = state
        .content_service
        .get_by_slug(&slug)
        .await?
        .ok_or_else(|| Error::NotFound("Not found".to_string()))?;

    Ok(Json(block))
}
