use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "birthday-greeter")]
#[command(about = "Birthday reminders with AI-generated greetings and cards")]
pub struct CliConfig {
    #[arg(long, global = true, help = "Path to a TOML config file (defaults to environment variables)")]
    pub config: Option<PathBuf>,

    #[arg(long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Emit JSON logs")]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    #[command(about = "Start the scheduler (daily check + first-of-month summary)")]
    Run,
    #[command(about = "Run the daily birthday check once, now")]
    Daily,
    #[command(about = "Send the month summary once, now")]
    Monthly,
    #[command(about = "Generate a full greeting bundle for one name")]
    Test {
        name: String,

        #[arg(long, help = "Deliver the bundle to this chat id")]
        deliver_to: Option<String>,

        #[arg(long, help = "Directory to write generated cards into")]
        output: Option<PathBuf>,
    },
}

impl CliConfig {
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Run)
    }
}

impl Command {
    /// 是否會送訊息到 Telegram（需要 bot token）
    pub fn delivers(&self) -> bool {
        match self {
            Command::Run | Command::Daily | Command::Monthly => true,
            Command::Test { deliver_to, .. } => deliver_to.is_some(),
        }
    }
}
