#![allow(dead_code)]

use async_trait::async_trait;
use birthday_greeter::core::{
    GreetingPipeline, ImageGenerator, ImageSettings, NotificationDispatcher, PacingGate,
    TextGenerator, TextSettings,
};
use birthday_greeter::domain::model::{CompletionRequest, FileId, MonthlyDigest, Recipient};
use birthday_greeter::domain::ports::{BirthdayDirectory, ChatTransport, CompletionApi};
use birthday_greeter::{GreeterError, Result};
use chrono::NaiveDate;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

pub const IMAGE_DELAY: Duration = Duration::from_secs(30);

/// 每次 completion 呼叫實際帶出的參數
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub model: String,
    pub timeout: Duration,
    pub temperature: Option<f32>,
    pub function_call: Option<String>,
}

/// 依請求種類回覆的假 provider：
/// function_call 有值為圖片、temperature 有值為祝福文字、其餘為性別判斷
pub struct ScriptedCompletionApi {
    gender_reply: String,
    greeting_reply: Option<String>,
    failing_image_calls: HashSet<usize>,
    failing_downloads: bool,
    calls: Mutex<Vec<RecordedCall>>,
    image_calls: Mutex<Vec<Instant>>,
    text_calls: Mutex<usize>,
    downloads: Mutex<Vec<String>>,
}

impl ScriptedCompletionApi {
    pub fn new() -> Self {
        Self {
            gender_reply: "Ж".to_string(),
            greeting_reply: Some("С днём рождения!".to_string()),
            failing_image_calls: HashSet::new(),
            failing_downloads: false,
            calls: Mutex::new(Vec::new()),
            image_calls: Mutex::new(Vec::new()),
            text_calls: Mutex::new(0),
            downloads: Mutex::new(Vec::new()),
        }
    }

    pub fn with_gender(mut self, reply: &str) -> Self {
        self.gender_reply = reply.to_string();
        self
    }

    pub fn without_greeting(mut self) -> Self {
        self.greeting_reply = None;
        self
    }

    /// 以 0 起算的圖片呼叫序號
    pub fn failing_image_calls(mut self, calls: &[usize]) -> Self {
        self.failing_image_calls = calls.iter().copied().collect();
        self
    }

    pub fn failing_downloads(mut self) -> Self {
        self.failing_downloads = true;
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn image_call_times(&self) -> Vec<Instant> {
        self.image_calls.lock().unwrap().clone()
    }

    pub fn image_call_count(&self) -> usize {
        self.image_calls.lock().unwrap().len()
    }

    pub fn text_call_count(&self) -> usize {
        *self.text_calls.lock().unwrap()
    }

    pub fn downloaded(&self) -> Vec<String> {
        self.downloads.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionApi for ScriptedCompletionApi {
    async fn completion(&self, request: &CompletionRequest, timeout: Duration) -> Result<String> {
        self.calls.lock().unwrap().push(RecordedCall {
            model: request.model.clone(),
            timeout,
            temperature: request.temperature,
            function_call: request.function_call.clone(),
        });

        if request.function_call.is_some() {
            let index = {
                let mut calls = self.image_calls.lock().unwrap();
                calls.push(Instant::now());
                calls.len() - 1
            };
            if self.failing_image_calls.contains(&index) {
                return Err(GreeterError::api("2 attempt(s) exhausted"));
            }
            return Ok(format!(
                "Готово! <img src=\"file-{}\" fuse=\"true\"/>",
                index + 1
            ));
        }

        *self.text_calls.lock().unwrap() += 1;
        if request.temperature.is_some() {
            self.greeting_reply
                .clone()
                .ok_or_else(|| GreeterError::api("2 attempt(s) exhausted"))
        } else {
            Ok(self.gender_reply.clone())
        }
    }

    async fn download_file(&self, file_id: &FileId) -> Result<Vec<u8>> {
        self.downloads
            .lock()
            .unwrap()
            .push(file_id.as_str().to_string());
        if self.failing_downloads {
            return Err(GreeterError::api("HTTP 404: not found"));
        }
        Ok(file_id.as_str().as_bytes().to_vec())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sent {
    Text {
        channel_id: String,
        text: String,
    },
    Image {
        channel_id: String,
        caption: String,
        size: usize,
    },
}

impl Sent {
    pub fn channel_id(&self) -> &str {
        match self {
            Sent::Text { channel_id, .. } | Sent::Image { channel_id, .. } => channel_id,
        }
    }
}

/// 記錄成功送出的訊息，指定的 channel 一律回傳失敗
#[derive(Default)]
pub struct RecordingTransport {
    failing_channels: HashSet<String>,
    sent: Mutex<Vec<Sent>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_for(mut self, channel_id: &str) -> Self {
        self.failing_channels.insert(channel_id.to_string());
        self
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_to(&self, channel_id: &str) -> Vec<Sent> {
        self.sent()
            .into_iter()
            .filter(|sent| sent.channel_id() == channel_id)
            .collect()
    }

    fn check(&self, channel_id: &str) -> Result<()> {
        if self.failing_channels.contains(channel_id) {
            return Err(GreeterError::transport("Bad Request: chat not found"));
        }
        Ok(())
    }
}

#[async_trait]
impl ChatTransport for RecordingTransport {
    async fn send_text(&self, channel_id: &str, text: &str) -> Result<()> {
        self.check(channel_id)?;
        self.sent.lock().unwrap().push(Sent::Text {
            channel_id: channel_id.to_string(),
            text: text.to_string(),
        });
        Ok(())
    }

    async fn send_image(&self, channel_id: &str, bytes: &[u8], caption: &str) -> Result<()> {
        self.check(channel_id)?;
        self.sent.lock().unwrap().push(Sent::Image {
            channel_id: channel_id.to_string(),
            caption: caption.to_string(),
            size: bytes.len(),
        });
        Ok(())
    }
}

#[derive(Default)]
pub struct StaticDirectory {
    pub due_today: Vec<Recipient>,
    pub this_month: Vec<MonthlyDigest>,
}

#[async_trait]
impl BirthdayDirectory for StaticDirectory {
    async fn list_recipients_due_today(&self, _today: NaiveDate) -> Result<Vec<Recipient>> {
        Ok(self.due_today.clone())
    }

    async fn list_recipients_with_birthdays_this_month(
        &self,
        _today: NaiveDate,
    ) -> Result<Vec<MonthlyDigest>> {
        Ok(self.this_month.clone())
    }
}

pub fn recipient(channel_id: &str, subjects: &[&str]) -> Recipient {
    Recipient {
        channel_id: channel_id.to_string(),
        subjects_to_notify: subjects.iter().map(|s| s.to_string()).collect(),
    }
}

pub fn pipeline(api: Arc<ScriptedCompletionApi>) -> GreetingPipeline {
    let text = TextGenerator::new(api.clone(), TextSettings::default());
    let images = ImageGenerator::new(
        api,
        Arc::new(PacingGate::new(IMAGE_DELAY)),
        ImageSettings::default(),
    );
    GreetingPipeline::new(text, images)
}

pub fn dispatcher(
    api: Arc<ScriptedCompletionApi>,
    directory: StaticDirectory,
    transport: Arc<RecordingTransport>,
) -> NotificationDispatcher {
    NotificationDispatcher::new(
        Arc::new(directory),
        transport,
        pipeline(api),
        chrono_tz::Europe::Moscow,
    )
}
