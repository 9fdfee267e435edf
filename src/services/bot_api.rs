use reqwest::Client;
use tracing::info;

use crate::error::Result;

/// Thin client for the Telegram Bot API methods this backend uses.
#[derive(Clone)]
pub struct BotApi {
    token: String,
    client: Client,
}

impl BotApi {
    pub fn new(token: String, client: Client) -> Self {
        Self { token, client }
    }

    fn method_url(&self, method: &str) -> String {
        format!("https://api.telegram.org/bot{}/{}", self.token, method)
    }

    pub async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        reply_markup: Option<serde_json::Value>,
        parse_mode: Option<&str>,
    ) -> Result<()> {
        let mut body = serde_json::json!({
            "chat_id": chat_id,
            "text": text,
        });
        if let Some(markup) = reply_markup {
            body["reply_markup"] = markup;
        }
        if let Some(mode) = parse_mode {
            body["parse_mode"] = serde_json::json!(mode);
        }

        let response = self
            .client
            .post(self.method_url("sendMessage"))
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let response_text = response.text().await.unwrap_or_default();
            tracing::warn!(%status, body = %response_text, "Telegram sendMessage failed");
        }

        Ok(())
    }

    async fn webhook_url(&self) -> Result<String> {
        let info: serde_json::Value = self
            .client
            .get(self.method_url("getWebhookInfo"))
            .send()
            .await?
            .json()
            .await?;
        Ok(info["result"]["url"].as_str().unwrap_or("").to_string())
    }

    /// Checks the currently registered webhook and re-registers it when it
    /// does not match `target_url`.
    pub async fn ensure_webhook(&self, target_url: &str) -> Result<()> {
        info!("Checking Telegram webhook status...");
        let current = self.webhook_url().await?;

        if current == target_url {
            info!("Telegram webhook is already up to date: {}", current);
            return Ok(());
        }

        info!("Updating Telegram webhook: {} -> {}", current, target_url);
        let response = self
            .client
            .get(self.method_url("setWebhook"))
            .query(&[("url", target_url)])
            .send()
            .await?;

        if response.status().is_success() {
            info!("Telegram webhook registered successfully");
        } else {
            tracing::warn!(
                "Failed to register Telegram webhook: {:?}",
                response.status()
            );
        }

        Ok(())
    }
}
