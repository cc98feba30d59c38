use birthday_greeter::utils::{logger, validation::Validate};
use birthday_greeter::app::save_cards;
use birthday_greeter::{AppConfig, BirthdayApp, CliConfig, Command, GreeterError, GreetingBundle};
use clap::Parser;

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();

    // 初始化日誌
    logger::init_logger(cli.verbose, cli.json_logs);

    tracing::info!("Starting birthday-greeter");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    // 載入並驗證配置
    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Configuration failed: {}", e);
            tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e);
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };

    let app = match BirthdayApp::from_config(&config) {
        Ok(app) => app,
        Err(e) => exit_with(e, 1),
    };

    if let Err(e) = execute(&app, cli.command()).await {
        exit_with(e, 2);
    }
}

fn load_config(cli: &CliConfig) -> Result<AppConfig, GreeterError> {
    let config = match &cli.config {
        Some(path) => AppConfig::from_file(path)?,
        None => AppConfig::from_env()?,
    };
    config.validate()?;
    if cli.command().delivers() {
        config.bot_token()?;
    }
    Ok(config)
}

/// 配置錯誤一律回傳 1，其餘使用呼叫端給的退出碼
fn exit_with(e: GreeterError, code: i32) -> ! {
    tracing::error!("❌ {}", e);
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e);
    eprintln!("💡 {}", e.recovery_suggestion());
    std::process::exit(if e.is_config_error() { 1 } else { code });
}

async fn execute(app: &BirthdayApp, command: Command) -> Result<(), GreeterError> {
    match command {
        Command::Run => {
            let scheduler = app.start_scheduler().await?;
            println!("⏰ Scheduler running, press Ctrl+C to stop");
            tokio::signal::ctrl_c().await?;
            tracing::info!("Shutdown requested");
            scheduler.shutdown().await?;
        }
        Command::Daily => {
            let report = app.run_daily_check().await?;
            println!(
                "✅ Daily check: {} recipient(s), {} subject(s), {} message(s) delivered, {} failure(s)",
                report.recipients,
                report.subjects,
                report.messages_delivered,
                report.failures.len()
            );
        }
        Command::Monthly => {
            let report = app.run_monthly_summary().await?;
            println!(
                "✅ Month summary: {} recipient(s), {} message(s) delivered, {} failure(s)",
                report.recipients,
                report.messages_delivered,
                report.failures.len()
            );
        }
        Command::Test {
            name,
            deliver_to,
            output,
        } => {
            let bundle = app.run_greeting_test(&name).await;
            print_bundle(&bundle);

            if let Some(dir) = output {
                for path in save_cards(&bundle, &dir).await? {
                    println!("📁 Saved {}", path.display());
                }
            }
            if let Some(channel_id) = deliver_to {
                let report = app.deliver(&channel_id, &bundle).await;
                println!(
                    "📬 Delivered {} message(s) to {}, {} failure(s)",
                    report.messages_delivered,
                    channel_id,
                    report.failures.len()
                );
            }
        }
    }
    Ok(())
}

fn print_bundle(bundle: &GreetingBundle) {
    println!("👤 {} ({})", bundle.subject_name, bundle.gender);
    match &bundle.greeting_text {
        Some(text) => println!("📝 {}", text),
        None => println!("📝 <no greeting text>"),
    }
    for (slot, card) in bundle.cards.iter().enumerate() {
        match card {
            Some(bytes) => println!("🖼  card {}: {} bytes", slot + 1, bytes.len()),
            None => println!("🖼  card {}: <none>", slot + 1),
        }
    }
}
