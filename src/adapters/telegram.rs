use crate::domain::ports::ChatTransport;
use crate::utils::error::{GreeterError, Result};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

const SEND_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Deserialize)]
struct BotApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

/// 透過 Telegram Bot API 實作的 `ChatTransport`。
/// 沒有 bot token 時仍可建立，但每次送出都會回傳 `TransportError`。
pub struct TelegramTransport {
    http: Client,
    api_url: String,
    bot_token: Option<String>,
}

impl TelegramTransport {
    pub fn new(http: Client, api_url: &str, bot_token: Option<&str>) -> Self {
        Self {
            http,
            api_url: api_url.trim_end_matches('/').to_string(),
            bot_token: bot_token.map(str::to_string),
        }
    }

    fn method_url(&self, method: &str) -> Result<String> {
        let token = self.bot_token.as_deref().ok_or_else(|| {
            GreeterError::transport(format!("{}: telegram.bot_token is not configured", method))
        })?;
        Ok(format!("{}/bot{}/{}", self.api_url, token, method))
    }

    async fn check(method: &str, response: reqwest::Response) -> Result<()> {
        let status = response.status();
        // 錯誤時 Bot API 也回傳 JSON，description 說明原因
        let body: Option<BotApiResponse> = response.json().await.ok();

        match body {
            Some(body) if status.is_success() && body.ok => Ok(()),
            Some(body) => Err(GreeterError::transport(format!(
                "{} failed (HTTP {}): {}",
                method,
                status.as_u16(),
                body.description.unwrap_or_else(|| "no description".to_string())
            ))),
            None => Err(GreeterError::transport(format!(
                "{} failed (HTTP {}): unreadable response",
                method,
                status.as_u16()
            ))),
        }
    }
}

#[async_trait]
impl ChatTransport for TelegramTransport {
    async fn send_text(&self, channel_id: &str, text: &str) -> Result<()> {
        let response = self
            .http
            .post(self.method_url("sendMessage")?)
            .json(&serde_json::json!({ "chat_id": channel_id, "text": text }))
            .timeout(SEND_TIMEOUT)
            .send()
            .await
            .map_err(|e| GreeterError::transport(format!("sendMessage: {}", e)))?;

        Self::check("sendMessage", response).await
    }

    async fn send_image(&self, channel_id: &str, bytes: &[u8], caption: &str) -> Result<()> {
        let photo = Part::bytes(bytes.to_vec())
            .file_name("card.jpg")
            .mime_str("image/jpeg")
            .map_err(|e| GreeterError::transport(format!("sendPhoto: {}", e)))?;

        let form = Form::new()
            .text("chat_id", channel_id.to_string())
            .text("caption", caption.to_string())
            .part("photo", photo);

        let response = self
            .http
            .post(self.method_url("sendPhoto")?)
            .multipart(form)
            .timeout(SEND_TIMEOUT)
            .send()
            .await
            .map_err(|e| GreeterError::transport(format!("sendPhoto: {}", e)))?;

        Self::check("sendPhoto", response).await
    }
}
