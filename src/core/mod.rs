pub mod dispatcher;
pub mod greeting_pipeline;
pub mod image_generator;
pub mod pacing;
pub mod prompts;
pub mod scheduler;
pub mod text_generator;

pub use crate::domain::model::{GreetingBundle, Recipient};
pub use crate::domain::ports::{BirthdayDirectory, ChatTransport, CompletionApi};
pub use crate::utils::error::Result;
pub use dispatcher::{DeliveryFailure, DispatchReport, NotificationDispatcher};
pub use greeting_pipeline::{CardPolicy, GreetingPipeline};
pub use image_generator::{parse_image_file_id, ImageGenerator, ImageSettings};
pub use pacing::PacingGate;
pub use scheduler::BirthdayScheduler;
pub use text_generator::{parse_gender, TextGenerator, TextSettings};
