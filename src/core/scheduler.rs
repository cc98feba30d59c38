use crate::config::ScheduleConfig;
use crate::core::dispatcher::{DispatchReport, NotificationDispatcher};
use crate::utils::error::Result;
use std::sync::Arc;
use tokio_cron_scheduler::{Job, JobScheduler};

/// 以設定時區運作的兩個 cron 觸發：每日生日檢查與每月一號的摘要。
/// 每次觸發在各自的 task 上執行。
pub struct BirthdayScheduler {
    scheduler: JobScheduler,
}

impl BirthdayScheduler {
    pub async fn start(
        dispatcher: Arc<NotificationDispatcher>,
        config: &ScheduleConfig,
    ) -> Result<Self> {
        let tz = config.tz()?;
        let scheduler = JobScheduler::new().await?;

        let daily = Arc::clone(&dispatcher);
        let daily_job = Job::new_async_tz(config.daily_cron.as_str(), tz, move |_uuid, _lock| {
            let dispatcher = Arc::clone(&daily);
            Box::pin(async move {
                log_outcome("daily check", dispatcher.run_daily_check().await);
            })
        })?;
        scheduler.add(daily_job).await?;

        let monthly = Arc::clone(&dispatcher);
        let monthly_job =
            Job::new_async_tz(config.monthly_cron.as_str(), tz, move |_uuid, _lock| {
                let dispatcher = Arc::clone(&monthly);
                Box::pin(async move {
                    log_outcome("month summary", dispatcher.run_monthly_summary().await);
                })
            })?;
        scheduler.add(monthly_job).await?;

        scheduler.start().await?;
        tracing::info!(
            "⏰ Scheduler started ({}): daily '{}', monthly '{}'",
            tz,
            config.daily_cron,
            config.monthly_cron
        );

        Ok(Self { scheduler })
    }

    pub async fn shutdown(mut self) -> Result<()> {
        self.scheduler.shutdown().await?;
        tracing::info!("Scheduler stopped");
        Ok(())
    }
}

fn log_outcome(task: &str, outcome: Result<DispatchReport>) {
    match outcome {
        Ok(report) => tracing::info!(
            "✅ {} finished: {} recipient(s), {} message(s), {} failure(s)",
            task,
            report.recipients,
            report.messages_delivered,
            report.failures.len()
        ),
        Err(e) => tracing::error!("❌ {} failed: {} ({})", task, e, e.recovery_suggestion()),
    }
}
