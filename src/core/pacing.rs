use std::time::Duration;
use tokio::sync::{Mutex, MutexGuard};
use tokio::time::Instant;

/// 整個程序共用的圖片生成間隔。
///
/// 同一時間只有一個 [`PacingPermit`] 持有者。permit 釋放時記下時間，
/// 下一次 `acquire` 會睡到距離該時間滿一個間隔為止；第一次 acquire 不等待。
#[derive(Debug)]
pub struct PacingGate {
    min_interval: Duration,
    last_release: Mutex<Option<Instant>>,
}

#[derive(Debug)]
pub struct PacingPermit<'a> {
    last_release: MutexGuard<'a, Option<Instant>>,
}

impl PacingGate {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_release: Mutex::new(None),
        }
    }

    pub async fn acquire(&self) -> PacingPermit<'_> {
        let guard = self.last_release.lock().await;

        if let Some(last) = *guard {
            let ready_at = last + self.min_interval;
            let now = Instant::now();
            if ready_at > now {
                tracing::info!(
                    "⏳ Pausing {}s before next image request",
                    (ready_at - now).as_secs()
                );
                tokio::time::sleep_until(ready_at).await;
            }
        }

        PacingPermit {
            last_release: guard,
        }
    }
}

impl Drop for PacingPermit<'_> {
    fn drop(&mut self) {
        *self.last_release = Some(Instant::now());
    }
}
