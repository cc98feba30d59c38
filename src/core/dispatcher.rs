use crate::core::greeting_pipeline::{CardPolicy, GreetingPipeline};
use crate::core::prompts;
use crate::domain::model::GreetingBundle;
use crate::domain::ports::{BirthdayDirectory, ChatTransport};
use crate::utils::error::Result;
use chrono::{Datelike, NaiveDate, Utc};
use chrono_tz::Tz;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryFailure {
    pub channel_id: String,
    pub subject_name: Option<String>,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub recipients: usize,
    pub subjects: usize,
    pub messages_delivered: usize,
    pub failures: Vec<DeliveryFailure>,
}

impl DispatchReport {
    fn record(&mut self, channel_id: &str, subject_name: Option<&str>, outcome: Result<()>) {
        match outcome {
            Ok(()) => self.messages_delivered += 1,
            Err(e) => {
                tracing::error!("❌ Delivery to {} failed: {}", channel_id, e);
                self.failures.push(DeliveryFailure {
                    channel_id: channel_id.to_string(),
                    subject_name: subject_name.map(str::to_string),
                    reason: e.to_string(),
                });
            }
        }
    }

    fn merge(&mut self, other: DispatchReport) {
        self.recipients += other.recipients;
        self.subjects += other.subjects;
        self.messages_delivered += other.messages_delivered;
        self.failures.extend(other.failures);
    }
}

/// 逐一處理收件者：每位壽星跑一次祝福流程並投遞結果。
/// 單則送出失敗只記錄在報告中，其餘收件者照常處理。
pub struct NotificationDispatcher {
    directory: Arc<dyn BirthdayDirectory>,
    transport: Arc<dyn ChatTransport>,
    pipeline: GreetingPipeline,
    timezone: Tz,
}

impl NotificationDispatcher {
    pub fn new(
        directory: Arc<dyn BirthdayDirectory>,
        transport: Arc<dyn ChatTransport>,
        pipeline: GreetingPipeline,
        timezone: Tz,
    ) -> Self {
        Self {
            directory,
            transport,
            pipeline,
            timezone,
        }
    }

    /// 以設定時區計算的今天
    pub fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.timezone).date_naive()
    }

    pub async fn run_daily_check(&self) -> Result<DispatchReport> {
        self.run_daily_check_on(self.today()).await
    }

    pub async fn run_daily_check_on(&self, today: NaiveDate) -> Result<DispatchReport> {
        let recipients = self.directory.list_recipients_due_today(today).await?;
        tracing::info!("🔍 Daily check {}: {} recipient(s) due", today, recipients.len());

        let mut report = DispatchReport::default();
        for recipient in recipients
            .iter()
            .filter(|recipient| !recipient.subjects_to_notify.is_empty())
        {
            report.recipients += 1;
            for subject in &recipient.subjects_to_notify {
                report.subjects += 1;
                let bundle = self
                    .pipeline
                    .build_bundle_with(subject, CardPolicy::WhenTextPresent)
                    .await;
                report.merge(self.deliver_bundle(&recipient.channel_id, &bundle).await);
            }
        }

        tracing::info!(
            "📬 Daily check done: {} message(s) delivered, {} failure(s)",
            report.messages_delivered,
            report.failures.len()
        );
        Ok(report)
    }

    pub async fn run_monthly_summary(&self) -> Result<DispatchReport> {
        self.run_monthly_summary_on(self.today()).await
    }

    pub async fn run_monthly_summary_on(&self, today: NaiveDate) -> Result<DispatchReport> {
        let digests = self
            .directory
            .list_recipients_with_birthdays_this_month(today)
            .await?;
        tracing::info!("📅 Month summary for {} recipient(s)", digests.len());

        let mut report = DispatchReport::default();
        for digest in &digests {
            report.recipients += 1;
            let text = prompts::month_summary_message(today.month(), &digest.entries);
            let outcome = self.transport.send_text(&digest.channel_id, &text).await;
            report.record(&digest.channel_id, None, outcome);
        }
        Ok(report)
    }

    /// 為單一名字產生完整內容，不論文字成敗都會產生賀卡
    pub async fn run_greeting_test(&self, name: &str) -> GreetingBundle {
        self.pipeline.build_bundle(name).await
    }

    /// 有祝福文字：文字 + 每張存在的賀卡；沒有：只送一則預設訊息
    pub async fn deliver_bundle(&self, channel_id: &str, bundle: &GreetingBundle) -> DispatchReport {
        let mut report = DispatchReport::default();
        let name = bundle.subject_name.as_str();

        let Some(greeting) = bundle.greeting_text.as_deref() else {
            let outcome = self
                .transport
                .send_text(channel_id, &prompts::fallback_message(name))
                .await;
            report.record(channel_id, Some(name), outcome);
            return report;
        };

        let outcome = self
            .transport
            .send_text(channel_id, &prompts::daily_greeting_message(name, greeting))
            .await;
        report.record(channel_id, Some(name), outcome);

        for (slot, card) in bundle.cards.iter().enumerate() {
            if let Some(bytes) = card {
                let outcome = self
                    .transport
                    .send_image(channel_id, bytes, &prompts::card_caption(slot, name))
                    .await;
                report.record(channel_id, Some(name), outcome);
            }
        }

        report
    }
}
