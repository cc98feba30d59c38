mod common;

use anyhow::Result;
use birthday_greeter::adapters::JsonBirthdayDirectory;
use birthday_greeter::core::{prompts, NotificationDispatcher};
use birthday_greeter::app::save_cards;
use birthday_greeter::domain::model::{Gender, GreetingBundle};
use birthday_greeter::{AppConfig, BirthdayApp};
use chrono::NaiveDate;
use common::{pipeline, RecordingTransport, ScriptedCompletionApi, Sent};
use serde_json::json;
use std::sync::Arc;
use tempfile::TempDir;

/// 建立 sessions.json 與 users/ 目錄，模擬機器人實際的資料檔
fn write_records(temp_dir: &TempDir) -> Result<JsonBirthdayDirectory> {
    let users_dir = temp_dir.path().join("users");
    std::fs::create_dir_all(&users_dir)?;

    let sessions_file = temp_dir.path().join("sessions.json");
    std::fs::write(
        &sessions_file,
        json!({"5001": "alpha", "5002": "beta"}).to_string(),
    )?;
    std::fs::write(
        users_dir.join("user_alpha.json"),
        json!([
            {"day": 29, "month": 2, "name": "Високосный"},
            {"day": 17, "month": 10, "name": "Папа"},
            {"day": 17, "month": 10, "name": "Бабушка"}
        ])
        .to_string(),
    )?;
    std::fs::write(
        users_dir.join("user_beta.json"),
        json!([{"day": 3, "month": 10, "name": "Коллега"}]).to_string(),
    )?;

    Ok(JsonBirthdayDirectory::new(users_dir, sessions_file))
}

fn dispatcher(
    directory: JsonBirthdayDirectory,
    api: Arc<ScriptedCompletionApi>,
    transport: Arc<RecordingTransport>,
) -> NotificationDispatcher {
    NotificationDispatcher::new(
        Arc::new(directory),
        transport,
        pipeline(api),
        chrono_tz::Europe::Moscow,
    )
}

#[tokio::test(start_paused = true)]
async fn test_daily_flow_from_json_records() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let api = Arc::new(ScriptedCompletionApi::new());
    let transport = Arc::new(RecordingTransport::new());
    let today = NaiveDate::from_ymd_opt(2026, 10, 17).unwrap();

    let report = dispatcher(write_records(&temp_dir)?, api.clone(), transport.clone())
        .run_daily_check_on(today)
        .await?;

    assert_eq!(report.recipients, 1);
    assert_eq!(report.subjects, 2);
    assert_eq!(report.messages_delivered, 6);
    assert!(transport.sent_to("5002").is_empty());

    let sent = transport.sent_to("5001");
    assert_eq!(
        sent[0],
        Sent::Text {
            channel_id: "5001".to_string(),
            text: prompts::daily_greeting_message("Папа", "С днём рождения!"),
        }
    );
    assert!(matches!(&sent[3], Sent::Text { text, .. } if text.contains("Бабушка")));
    Ok(())
}

/// 2/29 只在閏年當天觸發
#[tokio::test(start_paused = true)]
async fn test_leap_day_birthday_only_on_leap_years() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let api = Arc::new(ScriptedCompletionApi::new().without_greeting());
    let transport = Arc::new(RecordingTransport::new());
    let dispatcher = dispatcher(write_records(&temp_dir)?, api, transport.clone());

    let report = dispatcher
        .run_daily_check_on(NaiveDate::from_ymd_opt(2025, 2, 28).unwrap())
        .await?;
    assert_eq!(report.recipients, 0);

    let report = dispatcher
        .run_daily_check_on(NaiveDate::from_ymd_opt(2028, 2, 29).unwrap())
        .await?;
    assert_eq!(report.recipients, 1);
    assert_eq!(
        transport.sent(),
        vec![Sent::Text {
            channel_id: "5001".to_string(),
            text: prompts::fallback_message("Високосный"),
        }]
    );
    Ok(())
}

#[tokio::test]
async fn test_monthly_flow_from_json_records() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let transport = Arc::new(RecordingTransport::new());
    let dispatcher = dispatcher(
        write_records(&temp_dir)?,
        Arc::new(ScriptedCompletionApi::new()),
        transport.clone(),
    );

    let report = dispatcher
        .run_monthly_summary_on(NaiveDate::from_ymd_opt(2026, 10, 1).unwrap())
        .await?;

    assert_eq!(report.recipients, 2);
    let sent = transport.sent();
    assert!(matches!(&sent[0], Sent::Text { channel_id, text }
        if channel_id == "5001" && text.contains("17 — Папа") && !text.contains("Високосный")));
    assert!(matches!(&sent[1], Sent::Text { channel_id, text }
        if channel_id == "5002" && text.contains("3 — Коллега")));
    Ok(())
}

#[test]
fn test_config_file_drives_storage_paths() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let config_path = temp_dir.path().join("greeter.toml");
    std::fs::write(
        &config_path,
        r#"
[telegram]
bot_token = "123:abc"

[storage]
users_dir = "/var/lib/greeter/users"
sessions_file = "/var/lib/greeter/sessions.json"

[pacing]
image_delay_seconds = 45
"#,
    )?;

    let config = AppConfig::from_file(&config_path)?;
    config.validate_config()?;

    assert_eq!(config.storage.users_dir, "/var/lib/greeter/users");
    assert_eq!(config.pacing.image_delay().as_secs(), 45);
    assert_eq!(config.schedule.daily_cron, "0 0 8 * * *");
    assert!(!config.ai_enabled());
    Ok(())
}

/// 只產生不投遞時，沒有 bot token 也能組裝
#[tokio::test]
async fn test_app_builds_without_bot_token() -> Result<()> {
    let config = AppConfig::from_toml_str("")?;
    config.validate_config()?;

    assert!(config.telegram.bot_token.is_none());
    assert!(BirthdayApp::from_config(&config).is_ok());
    Ok(())
}

#[tokio::test]
async fn test_save_cards_writes_only_present_cards() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let out_dir = temp_dir.path().join("cards");
    let bundle = GreetingBundle {
        subject_name: "Юра".to_string(),
        gender: Gender::Male,
        greeting_text: None,
        cards: [None, Some(vec![0xFF, 0xD8, 0xFF, 0xE0])],
    };

    let written = save_cards(&bundle, &out_dir).await?;

    assert_eq!(written, vec![out_dir.join("card_2.jpg")]);
    assert!(!out_dir.join("card_1.jpg").exists());
    assert_eq!(std::fs::read(&written[0])?, vec![0xFF, 0xD8, 0xFF, 0xE0]);
    Ok(())
}
