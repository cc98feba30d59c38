use thiserror::Error;

#[derive(Error, Debug)]
pub enum GreeterError {
    #[error("Authorization failed: {message}")]
    AuthError { message: String },

    #[error("Provider API error: {message}")]
    ApiError { message: String },

    #[error("Unexpected provider response: {message}")]
    ParseError { message: String },

    #[error("Chat delivery failed: {message}")]
    TransportError { message: String },

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration field: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Scheduler error: {message}")]
    SchedulerError { message: String },
}

impl GreeterError {
    pub fn auth(message: impl Into<String>) -> Self {
        Self::AuthError {
            message: message.into(),
        }
    }

    pub fn api(message: impl Into<String>) -> Self {
        Self::ApiError {
            message: message.into(),
        }
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::ParseError {
            message: message.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::TransportError {
            message: message.into(),
        }
    }

    /// 配置類錯誤，重試無效
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::ConfigError { .. }
                | Self::MissingConfigError { .. }
                | Self::InvalidConfigValueError { .. }
        )
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            Self::AuthError { .. } => "Check GIGACHAT_AUTH and the OAuth scope",
            Self::ApiError { .. } | Self::HttpError(_) => {
                "Provider unavailable; greetings fall back to canned messages until it recovers"
            }
            Self::ParseError { .. } => "Provider response format changed; inspect debug logs",
            Self::TransportError { .. } => "Check BOT_TOKEN and that the chat still exists",
            Self::IoError(_) | Self::SerializationError(_) => {
                "Check the users directory and sessions file"
            }
            Self::ConfigError { .. }
            | Self::MissingConfigError { .. }
            | Self::InvalidConfigValueError { .. } => "Fix the configuration file and restart",
            Self::SchedulerError { .. } => "Check the cron expressions and timezone",
        }
    }
}

impl From<tokio_cron_scheduler::JobSchedulerError> for GreeterError {
    fn from(err: tokio_cron_scheduler::JobSchedulerError) -> Self {
        Self::SchedulerError {
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, GreeterError>;
