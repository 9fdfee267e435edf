use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use subtle::ConstantTimeEq;

use crate::config::get_config;
use crate::error::{Error, Result};
use crate::models::content::UpsertContentBlock;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct TelegramUpdate {
    pub update_id: i64,
    pub message: Option<TelegramMessage>,
}

#[derive(Debug, Deserialize)]
pub struct TelegramMessage {
    pub message_id: i64,
    pub from: TelegramUser,
    pub chat: TelegramChat,
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TelegramUser {
    pub id: i64,
    pub is_bot: bool,
    pub first_name: String,
    pub last_name: Option<String>,
    pub username: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TelegramChat {
    pub id: i64,
    pub r#type: String,
}

const HELP_TEXT: &str = "Команды:\n/ping — проверка связи\n/admin — проверить права\n/list — список контент-блоков (админ)\n/get <slug> — показать блок контента\n/set <slug>|Заголовок|Текст — создать/обновить блок (админ)";

/// Telegram probes the webhook URL with GET before delivering updates.
pub async fn webhook_probe(Path(secret): Path<String>) -> Result<&'static str> {
    verify_path_secret(&secret)?;
    Ok("OK")
}

pub async fn handle_webhook(
    State(state): State<AppState>,
    Path(secret): Path<String>,
    Json(update): Json<TelegramUpdate>,
) -> Result<StatusCode> {
    verify_path_secret(&secret)?;
    tracing::info!("Received Telegram webhook update ID: {}", update.update_id);

    let Some(message) = update.message else {
        return Ok(StatusCode::OK);
    };
    let Some(text) = message.text.as_deref() else {
        return Ok(StatusCode::OK);
    };

    tracing::debug!(text = %text, from = message.from.id, "incoming bot text");

    let chat_id = message.chat.id;
    let from_id = message.from.id;

    match parse_command(text) {
        Some(("start", _)) => cmd_start(&state, chat_id).await?,
        Some(("help", _)) => {
            state.bot_api.send_message(chat_id, HELP_TEXT, None, None).await?;
        }
        Some(("ping", _)) => {
            state.bot_api.send_message(chat_id, "pong", None, None).await?;
        }
        Some(("admin", _)) => cmd_admin(&state, chat_id, from_id).await?,
        Some(("list", _)) => cmd_list(&state, chat_id, from_id).await?,
        Some(("get", args)) => cmd_get(&state, chat_id, args).await?,
        Some(("set", args)) => cmd_set(&state, chat_id, from_id, args).await?,
        // Unknown commands and plain text are only logged, like the bot
        // always behaved.
        _ => {}
    }

    Ok(StatusCode::OK)
}

/// Splits `/cmd args` into the command name and its argument tail. Commands
/// may be addressed as `/cmd@botname` in group chats.
fn parse_command(text: &str) -> Option<(&str, &str)> {
    let stripped = text.strip_prefix('/')?;
    let mut split = stripped.splitn(2, char::is_whitespace);
    let head = split.next().unwrap_or("");
    let args = split.next().unwrap_or("").trim();
    let name = head.split('@').next().unwrap_or(head);
    if name.is_empty() {
        return None;
    }
    Some((name, args))
}

async fn cmd_start(state: &AppState, chat_id: i64) -> Result<()> {
    let config = get_config();
    let reply_markup = json!({
        "keyboard": [[
            {
                "text": "Открыть GRITHER",
                "web_app": { "url": config.webapp_url }
            }
        ]],
        "resize_keyboard": true,
        "one_time_keyboard": true
    });

    state
        .bot_api
        .send_message(chat_id, "Открыть приложение 👇", Some(reply_markup), None)
        .await
}

async fn cmd_admin(state: &AppState, chat_id: i64, from_id: i64) -> Result<()> {
    let reply = if state.admin_service.is_admin(from_id).await? {
        "Ты админ ✅"
    } else {
        "Нет доступа ❌"
    };
    state.bot_api.send_message(chat_id, reply, None, None).await
}

async fn cmd_list(state: &AppState, chat_id: i64, from_id: i64) -> Result<()> {
    if !state.admin_service.is_admin(from_id).await? {
        return state
            .bot_api
            .send_message(chat_id, "Нет доступа ❌", None, None)
            .await;
    }

    let blocks = state.content_service.list_recent(30).await?;
    if blocks.is_empty() {
        return state.bot_api.send_message(chat_id, "Пусто", None, None).await;
    }

    let listing = blocks
        .iter()
        .map(|b| format!("• {} — {}", b.slug, b.title))
        .collect::<Vec<_>>()
        .join("\n");
    state.bot_api.send_message(chat_id, &listing, None, None).await
}

async fn cmd_get(state: &AppState, chat_id: i64, args: &str) -> Result<()> {
    let slug = args.trim();
    if slug.is_empty() {
        return state
            .bot_api
            .send_message(chat_id, "Формат: /get slug", None, None)
            .await;
    }

    match state.content_service.get_by_slug(slug).await? {
        Some(block) => {
            let reply = format!("*{}*\n\n{}", block.title, block.body);
            state
                .bot_api
                .send_message(chat_id, &reply, None, Some("Markdown"))
                .await
        }
        None => {
            state
                .bot_api
                .send_message(chat_id, "Не найдено", None, None)
                .await
        }
    }
}

async fn cmd_set(state: &AppState, chat_id: i64, from_id: i64, args: &str) -> Result<()> {
    if !state.admin_service.is_admin(from_id).await? {
        return state
            .bot_api
            .send_message(chat_id, "Нет доступа ❌", None, None)
            .await;
    }

    // Body may itself contain '|', so only the first two separators split.
    let mut parts = args.splitn(3, '|');
    let slug = parts.next().unwrap_or("").trim();
    let title = parts.next().unwrap_or("").trim();
    let body = parts.next().unwrap_or("").trim();

    if slug.is_empty() || title.is_empty() || body.is_empty() {
        return state
            .bot_api
            .send_message(chat_id, "Формат: /set slug|Заголовок|Текст", None, None)
            .await;
    }

    let stored = state
        .content_service
        .upsert(UpsertContentBlock {
            slug: slug.to_string(),
            title: title.to_string(),
            body: body.to_string(),
            updated_by: Some(from_id.to_string()),
        })
        .await?;

    tracing::info!(slug = %stored.slug, by = from_id, "content block updated");
    state
        .bot_api
        .send_message(chat_id, &format!("OK: {} обновлён", stored.slug), None, None)
        .await
}

fn verify_path_secret(provided: &str) -> Result<()> {
    let expected = &get_config().webhook_secret;
    if provided.len() == expected.len()
        && bool::from(provided.as_bytes().ct_eq(expected.as_bytes()))
    {
        Ok(())
    } else {
        Err(Error::Unauthorized("invalid_webhook_secret".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::parse_command;

    #[test]
    fn parses_bare_and_addressed_commands() {
        assert_eq!(parse_command("/ping"), Some(("ping", "")));
        assert_eq!(parse_command("/get about"), Some(("get", "about")));
        assert_eq!(parse_command("/get@grither_bot about"), Some(("get", "about")));
        assert_eq!(
            parse_command("/set faq|Вопросы|Текст с | внутри"),
            Some(("set", "faq|Вопросы|Текст с | внутри"))
        );
    }

    #[test]
    fn plain_text_is_not_a_command() {
        assert_eq!(parse_command("привет"), None);
        assert_eq!(parse_command("/"), None);
    }
}
