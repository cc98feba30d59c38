use crate::core::image_generator::ImageGenerator;
use crate::core::text_generator::TextGenerator;
use crate::domain::model::{GreetingBundle, CARD_SLOTS};

/// 賀卡是否只在有祝福文字時才產生
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardPolicy {
    Always,
    WhenTextPresent,
}

/// 依序執行：性別 → 祝福文字 → 賀卡 1 →（間隔）→ 賀卡 2。
///
/// 各步驟獨立失敗：`CardPolicy::Always` 下缺少文字不影響賀卡，
/// 第一張賀卡失敗也不影響第二張。
pub struct GreetingPipeline {
    text: TextGenerator,
    images: ImageGenerator,
}

impl GreetingPipeline {
    pub fn new(text: TextGenerator, images: ImageGenerator) -> Self {
        Self { text, images }
    }

    pub async fn build_bundle(&self, name: &str) -> GreetingBundle {
        self.build_bundle_with(name, CardPolicy::Always).await
    }

    pub async fn build_bundle_with(&self, name: &str, policy: CardPolicy) -> GreetingBundle {
        tracing::info!("🎂 Building greeting for {}", name);

        let gender = self.text.detect_gender(name).await;
        let greeting_text = self.text.generate_greeting(name).await;

        let mut cards: [Option<Vec<u8>>; CARD_SLOTS] = Default::default();
        if greeting_text.is_some() || policy == CardPolicy::Always {
            for (slot, card) in cards.iter_mut().enumerate() {
                tracing::debug!("Card {}/{} for {}", slot + 1, CARD_SLOTS, name);
                *card = self.images.generate_card(name, gender).await;
            }
        } else {
            tracing::info!("Skipping cards for {}: no greeting text", name);
        }

        let bundle = GreetingBundle {
            subject_name: name.to_string(),
            gender,
            greeting_text,
            cards,
        };
        tracing::info!(
            "✅ Greeting for {}: text={}, cards={}/{}",
            name,
            bundle.greeting_text.is_some(),
            bundle.card_count(),
            CARD_SLOTS
        );
        bundle
    }
}
