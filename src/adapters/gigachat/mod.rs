mod client;
mod token_cache;

pub use client::{extract_content, GigaChatClient};
pub use token_cache::{OAuthSettings, TokenCache};

use crate::config::GigaChatConfig;
use crate::utils::error::Result;
use reqwest::Client;

/// 建立 GigaChat 專用的 HTTP client。
/// 供應商憑證由國家 CA 簽發，預設信任庫不含此 CA，可透過 `accept_invalid_certs` 放行。
pub fn build_http_client(config: &GigaChatConfig) -> Result<Client> {
    if config.accept_invalid_certs {
        tracing::warn!("⚠️ TLS certificate verification disabled for GigaChat endpoints");
    }
    Ok(Client::builder()
        .danger_accept_invalid_certs(config.accept_invalid_certs)
        .build()?)
}
