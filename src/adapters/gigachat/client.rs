use super::token_cache::TokenCache;
use crate::domain::model::{CompletionRequest, FileId};
use crate::domain::ports::CompletionApi;
use crate::utils::error::{GreeterError, Result};
use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// 錯誤訊息中保留的回應內容長度
const ERROR_BODY_PREVIEW: usize = 200;

pub struct GigaChatClient {
    http: Client,
    api_url: String,
    tokens: Arc<TokenCache>,
    max_retries: u32,
    download_timeout: Duration,
}

impl GigaChatClient {
    pub fn new(http: Client, api_url: &str, tokens: Arc<TokenCache>) -> Self {
        Self {
            http,
            api_url: api_url.trim_end_matches('/').to_string(),
            tokens,
            max_retries: 2,
            download_timeout: Duration::from_secs(90),
        }
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_download_timeout(mut self, timeout: Duration) -> Self {
        self.download_timeout = timeout;
        self
    }

    /// 單次嘗試；每次都重新取 token，重試時會重讀快取
    async fn attempt_completion(
        &self,
        request: &CompletionRequest,
        timeout: Duration,
    ) -> Result<String> {
        let token = self.tokens.get_token().await?;
        let url = format!("{}/chat/completions", self.api_url);

        let response = self
            .http
            .post(&url)
            .bearer_auth(&token)
            .header(ACCEPT, "application/json")
            .json(request)
            .timeout(timeout)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(GreeterError::api(format!(
                "HTTP {}: {}",
                status.as_u16(),
                preview(&body)
            )));
        }

        let body: Value = response.json().await?;
        extract_content(&body)
    }
}

/// 取出 `choices[0].message.content`
pub fn extract_content(body: &Value) -> Result<String> {
    body.pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| GreeterError::parse("response has no choices[0].message.content"))
}

fn preview(body: &str) -> String {
    body.chars().take(ERROR_BODY_PREVIEW).collect()
}

#[async_trait]
impl CompletionApi for GigaChatClient {
    async fn completion(&self, request: &CompletionRequest, timeout: Duration) -> Result<String> {
        let mut last_error = None;

        for attempt in 1..=self.max_retries {
            match self.attempt_completion(request, timeout).await {
                Ok(content) => {
                    tracing::debug!(
                        "GigaChat {} replied on attempt {}: {}",
                        request.model,
                        attempt,
                        preview(&content)
                    );
                    return Ok(content);
                }
                Err(e) => {
                    tracing::warn!(
                        "⚠️ GigaChat {} attempt {}/{} failed: {}",
                        request.model,
                        attempt,
                        self.max_retries,
                        e
                    );
                    last_error = Some(e);
                }
            }
        }

        Err(GreeterError::api(format!(
            "{} attempt(s) exhausted for model {}: {}",
            self.max_retries,
            request.model,
            last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "no attempts made".to_string())
        )))
    }

    async fn download_file(&self, file_id: &FileId) -> Result<Vec<u8>> {
        let token = self.tokens.get_token().await?;
        let url = format!("{}/files/{}/content", self.api_url, file_id);
        tracing::debug!("Downloading generated file {}", file_id);

        let response = self
            .http
            .get(&url)
            .bearer_auth(&token)
            .timeout(self.download_timeout)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(GreeterError::api(format!(
                "file download returned HTTP {}",
                status.as_u16()
            )));
        }

        Ok(response.bytes().await?.to_vec())
    }
}
