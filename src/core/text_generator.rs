use crate::core::prompts::{self, FEMALE_MARKER, MALE_MARKER};
use crate::domain::model::{
    ChatMessage, CompletionRequest, Gender, GenerationKind, GenerationRequest, GenerationResult,
};
use crate::domain::ports::CompletionApi;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct TextSettings {
    pub model: String,
    pub timeout: Duration,
    pub greeting_temperature: f32,
}

impl Default for TextSettings {
    fn default() -> Self {
        Self {
            model: "GigaChat".to_string(),
            timeout: Duration::from_secs(30),
            greeting_temperature: 0.9,
        }
    }
}

/// 性別判斷與祝福文字。
/// 供應商失敗不會往外拋，一律回到預設值（`Gender::Female`、`None`）。
pub struct TextGenerator {
    api: Arc<dyn CompletionApi>,
    settings: TextSettings,
}

impl TextGenerator {
    pub fn new(api: Arc<dyn CompletionApi>, settings: TextSettings) -> Self {
        Self { api, settings }
    }

    pub async fn detect_gender(&self, name: &str) -> Gender {
        let request =
            GenerationRequest::new(name, GenerationKind::Gender, prompts::gender_prompt(name));
        let gender = parse_gender(self.execute(&request).await.into_text().as_deref());
        tracing::debug!("Detected gender '{}' for {}", gender, name);
        gender
    }

    pub async fn generate_greeting(&self, name: &str) -> Option<String> {
        let request =
            GenerationRequest::new(name, GenerationKind::Text, prompts::greeting_prompt(name));

        // 空白回覆等同沒有內容
        let greeting = self
            .execute(&request)
            .await
            .into_text()
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty());

        if greeting.is_none() {
            tracing::warn!("⚠️ No AI greeting for {}, caller falls back to canned text", name);
        }
        greeting
    }

    async fn execute(&self, request: &GenerationRequest) -> GenerationResult {
        // 性別判斷是分類任務，不設定 temperature
        let temperature = match request.kind {
            GenerationKind::Text => Some(self.settings.greeting_temperature),
            _ => None,
        };

        let body = CompletionRequest {
            model: self.settings.model.clone(),
            messages: vec![ChatMessage::user(request.prompt.clone())],
            temperature,
            function_call: None,
        };

        match self.api.completion(&body, self.settings.timeout).await {
            Ok(content) => GenerationResult::Text(content),
            Err(e) => {
                tracing::warn!(
                    "⚠️ {:?} generation for {} failed: {}",
                    request.kind,
                    request.subject_name,
                    e
                );
                GenerationResult::Failure(e.to_string())
            }
        }
    }
}

/// 先找男性標記；女性標記、無法判斷或呼叫失敗一律為女性
pub fn parse_gender(response: Option<&str>) -> Gender {
    match response.map(|text| text.trim().to_uppercase()) {
        Some(text) if text.contains(MALE_MARKER) => Gender::Male,
        Some(text) if text.contains(FEMALE_MARKER) => Gender::Female,
        _ => Gender::Female,
    }
}
