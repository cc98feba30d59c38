use crate::config::GigaChatConfig;
use crate::domain::model::Credential;
use crate::utils::error::{GreeterError, Result};
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

const OAUTH_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct OAuthSettings {
    pub oauth_url: String,
    /// Base64 的 `client_id:client_secret`，原樣接在 `Basic` 之後
    pub auth_key: Option<String>,
    pub scope: String,
}

impl From<&GigaChatConfig> for OAuthSettings {
    fn from(config: &GigaChatConfig) -> Self {
        Self {
            oauth_url: config.oauth_url.clone(),
            auth_key: config.auth_key.clone(),
            scope: config.scope.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct OAuthResponse {
    access_token: String,
    /// 毫秒時間戳
    expires_at: i64,
}

/// 保存供應商憑證，需要時才刷新。
///
/// 讀取共用 `RwLock`，刷新由 `refresh_lock` 序列化；
/// 等到鎖的呼叫者會先重新檢查快取，因此多個並行呼叫只會發出一次 OAuth 請求。
pub struct TokenCache {
    http: Client,
    settings: OAuthSettings,
    credential: RwLock<Option<Credential>>,
    refresh_lock: Mutex<()>,
}

impl TokenCache {
    pub fn new(http: Client, settings: OAuthSettings) -> Self {
        Self {
            http,
            settings,
            credential: RwLock::new(None),
            refresh_lock: Mutex::new(()),
        }
    }

    pub async fn get_token(&self) -> Result<String> {
        if let Some(token) = self.cached_token().await {
            return Ok(token);
        }

        let _refresh = self.refresh_lock.lock().await;

        // 等待期間可能已有其他呼叫者完成刷新
        if let Some(token) = self.cached_token().await {
            return Ok(token);
        }

        let credential = self.fetch_credential().await?;
        let token = credential.token.clone();
        *self.credential.write().await = Some(credential);
        Ok(token)
    }

    async fn cached_token(&self) -> Option<String> {
        let now = chrono::Utc::now().timestamp();
        let cache = self.credential.read().await;
        cache
            .as_ref()
            .filter(|credential| credential.is_valid_at(now))
            .map(|credential| credential.token.clone())
    }

    async fn fetch_credential(&self) -> Result<Credential> {
        let auth_key = self
            .settings
            .auth_key
            .as_deref()
            .ok_or_else(|| GreeterError::auth("GigaChat authorization key is not configured"))?;

        tracing::debug!("Requesting GigaChat access token from {}", self.settings.oauth_url);

        let response = self
            .http
            .post(&self.settings.oauth_url)
            .header(ACCEPT, "application/json")
            .header("RqUID", Uuid::new_v4().to_string())
            .header(AUTHORIZATION, format!("Basic {}", auth_key))
            .form(&[("scope", self.settings.scope.as_str())])
            .timeout(OAUTH_TIMEOUT)
            .send()
            .await
            .map_err(|e| GreeterError::auth(format!("OAuth request failed: {}", e)))?;

        let status = response.status();
        if status != StatusCode::OK {
            tracing::error!("❌ GigaChat OAuth error: {}", status);
            return Err(GreeterError::auth(format!(
                "OAuth endpoint returned HTTP {}",
                status.as_u16()
            )));
        }

        let body: OAuthResponse = response
            .json()
            .await
            .map_err(|e| GreeterError::auth(format!("Malformed OAuth response: {}", e)))?;

        let credential = Credential::new(body.access_token, body.expires_at / 1000);
        tracing::info!(
            "🔑 Obtained GigaChat access token (expires at {})",
            credential.expires_at_epoch_seconds
        );
        Ok(credential)
    }

    #[cfg(test)]
    async fn prime(&self, credential: Credential) {
        *self.credential.write().await = Some(credential);
    }
}
