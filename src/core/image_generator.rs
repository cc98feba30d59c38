use crate::core::pacing::PacingGate;
use crate::core::prompts;
use crate::domain::model::{
    ChatMessage, CompletionRequest, FileId, Gender, GenerationKind, GenerationRequest,
    GenerationResult,
};
use crate::domain::ports::CompletionApi;
use std::sync::Arc;
use std::time::Duration;

const IMG_MARKER: &str = "<img src=\"";

#[derive(Debug, Clone)]
pub struct ImageSettings {
    pub model: String,
    pub timeout: Duration,
}

impl Default for ImageSettings {
    fn default() -> Self {
        Self {
            model: "GigaChat-Max".to_string(),
            timeout: Duration::from_secs(90),
        }
    }
}

/// 生日賀卡生成。
/// 每次呼叫都經過共用的 [`PacingGate`]，跨流程與收件者維持間隔。
pub struct ImageGenerator {
    api: Arc<dyn CompletionApi>,
    gate: Arc<PacingGate>,
    settings: ImageSettings,
}

impl ImageGenerator {
    pub fn new(api: Arc<dyn CompletionApi>, gate: Arc<PacingGate>, settings: ImageSettings) -> Self {
        Self {
            api,
            gate,
            settings,
        }
    }

    pub async fn generate_card(&self, name: &str, gender: Gender) -> Option<Vec<u8>> {
        let request = GenerationRequest::new(
            name,
            GenerationKind::Image,
            prompts::card_prompt(name, gender),
        );

        let _permit = self.gate.acquire().await;
        tracing::info!("🎨 Generating card for {}", name);

        let result = self.execute(&request).await;
        if let GenerationResult::Failure(reason) = &result {
            tracing::warn!("⚠️ No card for {}: {}", name, reason);
        }

        let card = result.into_image();
        if let Some(bytes) = &card {
            tracing::info!("🖼️ Card for {} ready ({} bytes)", name, bytes.len());
        }
        card
    }

    async fn execute(&self, request: &GenerationRequest) -> GenerationResult {
        // 圖片透過 function_call=auto 觸發，結果以 <img> 標記內嵌在文字回覆中
        let body = CompletionRequest {
            model: self.settings.model.clone(),
            messages: vec![ChatMessage::user(request.prompt.clone())],
            temperature: None,
            function_call: Some("auto".to_string()),
        };

        let content = match self.api.completion(&body, self.settings.timeout).await {
            Ok(content) => content,
            Err(e) => return GenerationResult::Failure(e.to_string()),
        };

        let Some(file_id) = parse_image_file_id(&content) else {
            let preview: String = content.chars().take(200).collect();
            return GenerationResult::Failure(format!("no image tag in response: {}", preview));
        };

        match self.api.download_file(&file_id).await {
            Ok(bytes) => GenerationResult::Image(bytes),
            Err(e) => GenerationResult::Failure(format!("download of {} failed: {}", file_id, e)),
        }
    }
}

/// 從 `<img src="...">` 取出檔案 ID；沒有標記代表這次沒產生圖片
pub fn parse_image_file_id(content: &str) -> Option<FileId> {
    let start = content.find(IMG_MARKER)? + IMG_MARKER.len();
    let rest = &content[start..];
    let end = rest.find('"')?;
    let id = rest[..end].trim();

    if id.is_empty() {
        None
    } else {
        Some(FileId::new(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_image_file_id() {
        let content = r#"Вот открытка <img src="b2f1c8e4-77aa-4c1e-9d3f-0e5f6a7b8c9d" fuse="true"/> готово"#;
        assert_eq!(
            parse_image_file_id(content),
            Some(FileId::new("b2f1c8e4-77aa-4c1e-9d3f-0e5f6a7b8c9d"))
        );
    }

    #[test]
    fn test_parse_image_file_id_takes_first_tag() {
        let content = r#"<img src="first"/><img src="second"/>"#;
        assert_eq!(parse_image_file_id(content), Some(FileId::new("first")));
    }

    #[test]
    fn test_parse_image_file_id_absent() {
        assert_eq!(parse_image_file_id("Не могу нарисовать"), None);
        assert_eq!(parse_image_file_id("<img alt=\"x\">"), None);
        // 未閉合的引號
        assert_eq!(parse_image_file_id("<img src=\"abc"), None);
        assert_eq!(parse_image_file_id("<img src=\"\"/>"), None);
    }
}
