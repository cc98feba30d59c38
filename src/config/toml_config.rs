use crate::utils::error::{GreeterError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_path, validate_range,
    validate_required_field, validate_timezone, validate_url, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;
use std::time::Duration;

pub const DEFAULT_OAUTH_URL: &str = "https://ngw.devices.sberbank.ru:9443/api/v2/oauth";
pub const DEFAULT_API_URL: &str = "https://gigachat.devices.sberbank.ru/api/v1";
pub const DEFAULT_TELEGRAM_URL: &str = "https://api.telegram.org";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub gigachat: GigaChatConfig,
    pub pacing: PacingConfig,
    pub telegram: TelegramConfig,
    pub storage: StorageConfig,
    pub schedule: ScheduleConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GigaChatConfig {
    pub oauth_url: String,
    pub api_url: String,
    pub auth_key: Option<String>,
    pub scope: String,
    pub text_model: String,
    pub image_model: String,
    pub max_retries: u32,
    pub text_timeout_seconds: u64,
    pub image_timeout_seconds: u64,
    pub accept_invalid_certs: bool,
}

impl Default for GigaChatConfig {
    fn default() -> Self {
        Self {
            oauth_url: DEFAULT_OAUTH_URL.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
            auth_key: None,
            scope: "GIGACHAT_API_PERS".to_string(),
            text_model: "GigaChat".to_string(),
            image_model: "GigaChat-Max".to_string(),
            max_retries: 2,
            text_timeout_seconds: 30,
            image_timeout_seconds: 90,
            accept_invalid_certs: false,
        }
    }
}

impl GigaChatConfig {
    pub fn text_timeout(&self) -> Duration {
        Duration::from_secs(self.text_timeout_seconds)
    }

    pub fn image_timeout(&self) -> Duration {
        Duration::from_secs(self.image_timeout_seconds)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PacingConfig {
    pub image_delay_seconds: u64,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            image_delay_seconds: 30,
        }
    }
}

impl PacingConfig {
    pub fn image_delay(&self) -> Duration {
        Duration::from_secs(self.image_delay_seconds)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    pub bot_token: Option<String>,
    pub api_url: String,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: None,
            api_url: DEFAULT_TELEGRAM_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub users_dir: String,
    pub sessions_file: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            users_dir: "users".to_string(),
            sessions_file: "sessions.json".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    pub timezone: String,
    pub daily_cron: String,
    pub monthly_cron: String,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            timezone: "Europe/Moscow".to_string(),
            daily_cron: "0 0 8 * * *".to_string(),
            monthly_cron: "0 0 8 1 * *".to_string(),
        }
    }
}

impl ScheduleConfig {
    pub fn tz(&self) -> Result<chrono_tz::Tz> {
        validate_timezone("schedule.timezone", &self.timezone)
    }
}

fn env_placeholder() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("static regex"))
}

/// 未替換的 `${VAR}` 或空字串視為未設定
fn configured(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty() && !env_placeholder().is_match(v))
}

impl AppConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(GreeterError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        let config: Self =
            toml::from_str(&processed_content).map_err(|e| GreeterError::ConfigError {
                message: format!("TOML parsing error: {}", e),
            })?;
        Ok(config.normalized())
    }

    /// 沒有設定檔時，從環境變數建立配置
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.gigachat.auth_key = std::env::var("GIGACHAT_AUTH").ok();
        config.telegram.bot_token = std::env::var("BOT_TOKEN").ok();

        if let Ok(dir) = std::env::var("USERS_DIR") {
            config.storage.users_dir = dir;
        }
        if let Ok(file) = std::env::var("SESSIONS_FILE") {
            config.storage.sessions_file = file;
        }
        if let Ok(tz) = std::env::var("BOT_TIMEZONE") {
            config.schedule.timezone = tz;
        }
        if let Ok(delay) = std::env::var("IMAGE_DELAY") {
            config.pacing.image_delay_seconds =
                delay
                    .parse()
                    .map_err(|_| GreeterError::InvalidConfigValueError {
                        field: "IMAGE_DELAY".to_string(),
                        value: delay.clone(),
                        reason: "Expected a whole number of seconds".to_string(),
                    })?;
        }

        Ok(config.normalized())
    }

    /// 替換環境變數 (例如 ${GIGACHAT_AUTH})
    fn substitute_env_vars(content: &str) -> String {
        env_placeholder()
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .to_string()
    }

    fn normalized(mut self) -> Self {
        self.gigachat.auth_key = configured(self.gigachat.auth_key.take());
        self.telegram.bot_token = configured(self.telegram.bot_token.take());
        self
    }

    /// GigaChat 是否已設定授權金鑰
    pub fn ai_enabled(&self) -> bool {
        self.gigachat.auth_key.is_some()
    }

    pub fn bot_token(&self) -> Result<&str> {
        validate_required_field("telegram.bot_token", &self.telegram.bot_token).map(String::as_str)
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validate_url("gigachat.oauth_url", &self.gigachat.oauth_url)?;
        validate_url("gigachat.api_url", &self.gigachat.api_url)?;
        validate_non_empty_string("gigachat.scope", &self.gigachat.scope)?;
        validate_non_empty_string("gigachat.text_model", &self.gigachat.text_model)?;
        validate_non_empty_string("gigachat.image_model", &self.gigachat.image_model)?;
        validate_range("gigachat.max_retries", self.gigachat.max_retries, 1, 10)?;
        validate_range(
            "gigachat.text_timeout_seconds",
            self.gigachat.text_timeout_seconds,
            1,
            600,
        )?;
        validate_range(
            "gigachat.image_timeout_seconds",
            self.gigachat.image_timeout_seconds,
            1,
            600,
        )?;
        validate_range("pacing.image_delay_seconds", self.pacing.image_delay_seconds, 0, 3600)?;

        validate_url("telegram.api_url", &self.telegram.api_url)?;
        // bot_token 只在實際投遞時才需要，見 `bot_token()`

        validate_path("storage.users_dir", &self.storage.users_dir)?;
        validate_path("storage.sessions_file", &self.storage.sessions_file)?;

        self.schedule.tz()?;
        validate_non_empty_string("schedule.daily_cron", &self.schedule.daily_cron)?;
        validate_non_empty_string("schedule.monthly_cron", &self.schedule.monthly_cron)?;

        Ok(())
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
