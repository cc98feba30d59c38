use crate::domain::model::{CompletionRequest, FileId, MonthlyDigest, Recipient};
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use std::time::Duration;

/// 已授權並帶重試的生成服務存取
#[async_trait]
pub trait CompletionApi: Send + Sync {
    /// 回傳 `choices[0].message.content`；`timeout` 以單次嘗試計
    async fn completion(&self, request: &CompletionRequest, timeout: Duration) -> Result<String>;

    async fn download_file(&self, file_id: &FileId) -> Result<Vec<u8>>;
}

#[async_trait]
pub trait BirthdayDirectory: Send + Sync {
    /// 只回傳今天至少有一位壽星的收件者
    async fn list_recipients_due_today(&self, today: NaiveDate) -> Result<Vec<Recipient>>;

    /// 回傳所有收件者，本月無生日者 `entries` 為空
    async fn list_recipients_with_birthdays_this_month(
        &self,
        today: NaiveDate,
    ) -> Result<Vec<MonthlyDigest>>;
}

#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn send_text(&self, channel_id: &str, text: &str) -> Result<()>;

    async fn send_image(&self, channel_id: &str, bytes: &[u8], caption: &str) -> Result<()>;
}
