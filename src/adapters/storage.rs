use crate::config::StorageConfig;
use crate::domain::model::{BirthdayEntry, MonthlyDigest, Recipient};
use crate::domain::ports::BirthdayDirectory;
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// 機器人資料檔的唯讀介面。
/// `sessions.json` 對應 chat id 與使用者代碼，
/// `users/user_<code>.json` 存放該使用者的 `[{day, month, name}]` 清單。
#[derive(Debug, Clone)]
pub struct JsonBirthdayDirectory {
    users_dir: PathBuf,
    sessions_file: PathBuf,
}

impl JsonBirthdayDirectory {
    pub fn new(users_dir: impl Into<PathBuf>, sessions_file: impl Into<PathBuf>) -> Self {
        Self {
            users_dir: users_dir.into(),
            sessions_file: sessions_file.into(),
        }
    }

    pub fn from_config(config: &StorageConfig) -> Self {
        Self::new(&config.users_dir, &config.sessions_file)
    }

    fn user_file(&self, code: &str) -> PathBuf {
        self.users_dir.join(format!("user_{}.json", code))
    }

    /// chat id -> 使用者代碼，依 chat id 排序
    async fn load_sessions(&self) -> Result<BTreeMap<String, String>> {
        read_json_or_default(&self.sessions_file).await
    }

    async fn load_birthdays(&self, code: &str) -> Result<Vec<BirthdayEntry>> {
        read_json_or_default(&self.user_file(code)).await
    }

    /// 單一使用者檔案損毀只跳過該收件者，不中斷整輪
    async fn load_birthdays_or_skip(&self, channel_id: &str, code: &str) -> Option<Vec<BirthdayEntry>> {
        match self.load_birthdays(code).await {
            Ok(birthdays) => Some(birthdays),
            Err(e) => {
                tracing::error!(
                    "❌ Skipping chat {}: cannot read {}: {}",
                    channel_id,
                    self.user_file(code).display(),
                    e
                );
                None
            }
        }
    }
}

/// 檔案不存在時回傳預設值
async fn read_json_or_default<T>(path: &Path) -> Result<T>
where
    T: serde::de::DeserializeOwned + Default,
{
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("{} not found, treating as empty", path.display());
            Ok(T::default())
        }
        Err(e) => Err(e.into()),
    }
}

pub fn is_birthday_on(entry: &BirthdayEntry, date: NaiveDate) -> bool {
    entry.day == date.day() && entry.month == date.month()
}

pub fn is_birthday_in_month(entry: &BirthdayEntry, date: NaiveDate) -> bool {
    entry.month == date.month()
}

#[async_trait]
impl BirthdayDirectory for JsonBirthdayDirectory {
    async fn list_recipients_due_today(&self, today: NaiveDate) -> Result<Vec<Recipient>> {
        let mut recipients = Vec::new();

        for (channel_id, code) in self.load_sessions().await? {
            let Some(birthdays) = self.load_birthdays_or_skip(&channel_id, &code).await else {
                continue;
            };
            let subjects: Vec<String> = birthdays
                .into_iter()
                .filter(|entry| is_birthday_on(entry, today))
                .map(|entry| entry.name)
                .collect();

            if !subjects.is_empty() {
                recipients.push(Recipient {
                    channel_id,
                    subjects_to_notify: subjects,
                });
            }
        }

        Ok(recipients)
    }

    async fn list_recipients_with_birthdays_this_month(
        &self,
        today: NaiveDate,
    ) -> Result<Vec<MonthlyDigest>> {
        let mut digests = Vec::new();

        for (channel_id, code) in self.load_sessions().await? {
            let Some(birthdays) = self.load_birthdays_or_skip(&channel_id, &code).await else {
                continue;
            };
            let entries = birthdays
                .into_iter()
                .filter(|entry| is_birthday_in_month(entry, today))
                .collect();
            digests.push(MonthlyDigest {
                channel_id,
                entries,
            });
        }

        Ok(digests)
    }
}
