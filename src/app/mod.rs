// 應用組裝層：把設定轉成實際的 adapters 與 core 服務

use crate::adapters::gigachat::build_http_client;
use crate::adapters::{GigaChatClient, JsonBirthdayDirectory, OAuthSettings, TelegramTransport, TokenCache};
use crate::config::AppConfig;
use crate::core::{
    BirthdayScheduler, DispatchReport, GreetingPipeline, ImageGenerator, ImageSettings,
    NotificationDispatcher, PacingGate, TextGenerator, TextSettings,
};
use crate::domain::model::GreetingBundle;
use crate::domain::ports::{BirthdayDirectory, ChatTransport, CompletionApi};
use crate::utils::error::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub struct BirthdayApp {
    config: AppConfig,
    dispatcher: Arc<NotificationDispatcher>,
}

impl BirthdayApp {
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let http = build_http_client(&config.gigachat)?;
        if !config.ai_enabled() {
            tracing::warn!("⚠️ GIGACHAT_AUTH not set, greetings fall back to canned text");
        }

        let tokens = Arc::new(TokenCache::new(
            http.clone(),
            OAuthSettings::from(&config.gigachat),
        ));
        let api: Arc<dyn CompletionApi> = Arc::new(
            GigaChatClient::new(http, &config.gigachat.api_url, tokens)
                .with_max_retries(config.gigachat.max_retries)
                .with_download_timeout(config.gigachat.image_timeout()),
        );

        let transport: Arc<dyn ChatTransport> = Arc::new(TelegramTransport::new(
            reqwest::Client::new(),
            &config.telegram.api_url,
            config.telegram.bot_token.as_deref(),
        ));
        let directory: Arc<dyn BirthdayDirectory> =
            Arc::new(JsonBirthdayDirectory::from_config(&config.storage));

        Self::assemble(config, api, directory, transport)
    }

    /// 以任意 port 實作組裝，整合測試用它注入替身
    pub fn assemble(
        config: &AppConfig,
        api: Arc<dyn CompletionApi>,
        directory: Arc<dyn BirthdayDirectory>,
        transport: Arc<dyn ChatTransport>,
    ) -> Result<Self> {
        let text = TextGenerator::new(
            Arc::clone(&api),
            TextSettings {
                model: config.gigachat.text_model.clone(),
                timeout: config.gigachat.text_timeout(),
                ..TextSettings::default()
            },
        );
        let images = ImageGenerator::new(
            api,
            Arc::new(PacingGate::new(config.pacing.image_delay())),
            ImageSettings {
                model: config.gigachat.image_model.clone(),
                timeout: config.gigachat.image_timeout(),
            },
        );

        let dispatcher = NotificationDispatcher::new(
            directory,
            transport,
            GreetingPipeline::new(text, images),
            config.schedule.tz()?,
        );

        Ok(Self {
            config: config.clone(),
            dispatcher: Arc::new(dispatcher),
        })
    }

    pub async fn run_daily_check(&self) -> Result<DispatchReport> {
        self.dispatcher.run_daily_check().await
    }

    pub async fn run_monthly_summary(&self) -> Result<DispatchReport> {
        self.dispatcher.run_monthly_summary().await
    }

    pub async fn run_greeting_test(&self, name: &str) -> GreetingBundle {
        self.dispatcher.run_greeting_test(name).await
    }

    pub async fn deliver(&self, channel_id: &str, bundle: &GreetingBundle) -> DispatchReport {
        self.dispatcher.deliver_bundle(channel_id, bundle).await
    }

    pub async fn start_scheduler(&self) -> Result<BirthdayScheduler> {
        BirthdayScheduler::start(Arc::clone(&self.dispatcher), &self.config.schedule).await
    }
}

/// 將存在的賀卡寫成 `dir/card_<n>.jpg`，回傳實際寫入的路徑
pub async fn save_cards(bundle: &GreetingBundle, dir: &Path) -> Result<Vec<PathBuf>> {
    tokio::fs::create_dir_all(dir).await?;

    let mut written = Vec::new();
    for (slot, card) in bundle.cards.iter().enumerate() {
        if let Some(bytes) = card {
            let path = dir.join(format!("card_{}.jpg", slot + 1));
            tokio::fs::write(&path, bytes).await?;
            written.push(path);
        }
    }
    Ok(written)
}
