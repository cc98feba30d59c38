use serde::{Deserialize, Serialize};
use std::fmt;

/// 每份祝福固定的賀卡數量
pub const CARD_SLOTS: usize = 2;

/// 憑證在到期前多少秒就視為失效
pub const CREDENTIAL_SKEW_SECONDS: i64 = 60;

/// 供應商 access token 與到期時間，刷新時整組替換
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub token: String,
    pub expires_at_epoch_seconds: i64,
}

impl Credential {
    pub fn new(token: impl Into<String>, expires_at_epoch_seconds: i64) -> Self {
        Self {
            token: token.into(),
            expires_at_epoch_seconds,
        }
    }

    pub fn is_valid_at(&self, now_epoch_seconds: i64) -> bool {
        now_epoch_seconds < self.expires_at_epoch_seconds - CREDENTIAL_SKEW_SECONDS
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    #[serde(rename = "f")]
    Female,
    #[serde(rename = "m")]
    Male,
}

impl Gender {
    pub fn as_char(self) -> char {
        match self {
            Self::Female => 'f',
            Self::Male => 'm',
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationKind {
    Text,
    Gender,
    Image,
}

/// 針對單一壽星的一次生成呼叫，每次現建、不保存
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub subject_name: String,
    pub kind: GenerationKind,
    pub prompt: String,
}

impl GenerationRequest {
    pub fn new(subject_name: &str, kind: GenerationKind, prompt: String) -> Self {
        Self {
            subject_name: subject_name.to_string(),
            kind,
            prompt,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationResult {
    Text(String),
    Image(Vec<u8>),
    Failure(String),
}

impl GenerationResult {
    pub fn into_text(self) -> Option<String> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn into_image(self) -> Option<Vec<u8>> {
        match self {
            Self::Image(bytes) => Some(bytes),
            _ => None,
        }
    }
}

/// 供應商檔案 ID（從 `<img src="...">` 標記解析而來）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileId(String);

impl FileId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GreetingBundle {
    pub subject_name: String,
    pub gender: Gender,
    pub greeting_text: Option<String>,
    pub cards: [Option<Vec<u8>>; CARD_SLOTS],
}

impl GreetingBundle {
    pub fn card_count(&self) -> usize {
        self.cards.iter().filter(|card| card.is_some()).count()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipient {
    pub channel_id: String,
    pub subjects_to_notify: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BirthdayEntry {
    pub day: u32,
    pub month: u32,
    pub name: String,
}

/// 某位收件者本月的生日清單，可為空
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthlyDigest {
    pub channel_id: String,
    pub entries: Vec<BirthdayEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// `/chat/completions` 的請求內容
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function_call: Option<String>,
}
