// 適配器層：對外部系統實作領域 ports（GigaChat、Telegram、JSON 生日紀錄）

pub mod gigachat;
pub mod storage;
pub mod telegram;

pub use gigachat::{GigaChatClient, OAuthSettings, TokenCache};
pub use storage::JsonBirthdayDirectory;
pub use telegram::TelegramTransport;
