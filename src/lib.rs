pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{CliConfig, Command};

pub use app::BirthdayApp;
pub use config::AppConfig;
pub use core::{DispatchReport, NotificationDispatcher};
pub use domain::model::GreetingBundle;
pub use utils::error::{GreeterError, Result};
