use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose};
use reqwest::Client;
use serde::Deserialize;

use crate::application::ports::{ExtractOptions, ExtractorError, QuestionExtractor, SpeedHint};
use crate::domain::{Question, Upload};
use crate::presentation::config::LlmSettings;

use super::response::parse_question_payload;

const SYSTEM_PROMPT: &str = "\
You extract math exam questions from documents. Return ONLY a JSON array, \
one object per question, in document order, with these fields:\n\
  \"question\": the full question text, LaTeX for formulas\n\
  \"type\": one of \"multiple_choice\", \"essay\", \"calculation\", \"fill_blank\", \"true_false\"\n\
  \"topic\": short topic label, or null\n\
  \"difficulty\": one of \"NB\", \"TH\", \"VD\", \"VDC\", or null\n\
  \"answer\": the final answer if determinable, or null\n\
  \"solution_steps\": array of solution step strings, may be empty\n\
Do not invent questions. If the document contains none, return [].";

/// `QuestionExtractor` backed by an OpenAI-compatible chat-completions API.
///
/// Textual uploads go in as plain text; everything else (and any upload in
/// vision mode) is attached as a base64 data URI for a vision-capable model.
pub struct OpenAiExtractor {
    client: Client,
    base_url: String,
    api_key: String,
    fast_model: String,
    balanced_model: String,
    quality_model: String,
    max_tokens: usize,
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
}

impl OpenAiExtractor {
    pub fn from_settings(settings: &LlmSettings) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(settings.request_timeout_seconds))
            .build()
            .expect("reqwest client build never fails with valid TLS config");
        Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone(),
            fast_model: settings.fast_model.clone(),
            balanced_model: settings.balanced_model.clone(),
            quality_model: settings.quality_model.clone(),
            max_tokens: settings.max_tokens,
            temperature: settings.temperature,
        }
    }

    fn model_for(&self, speed: SpeedHint) -> &str {
        match speed {
            SpeedHint::Fast => &self.fast_model,
            SpeedHint::Balanced => &self.balanced_model,
            SpeedHint::Quality => &self.quality_model,
        }
    }

    fn user_content(
        &self,
        data: &[u8],
        upload: &Upload,
        options: &ExtractOptions,
    ) -> serde_json::Value {
        if upload.kind.is_textual() && !options.use_vision {
            return serde_json::Value::String(String::from_utf8_lossy(data).into_owned());
        }

        let b64 = general_purpose::STANDARD.encode(data);
        let data_uri = format!("data:{};base64,{}", upload.kind.as_mime(), b64);
        serde_json::json!([
            {
                "type": "image_url",
                "image_url": { "url": data_uri }
            },
            {
                "type": "text",
                "text": "Extract all math questions from the attached exam document."
            }
        ])
    }
}

#[async_trait]
impl QuestionExtractor for OpenAiExtractor {
    #[tracing::instrument(skip(self, data), fields(filename = %upload.filename, speed = %options.speed))]
    async fn extract(
        &self,
        data: &[u8],
        upload: &Upload,
        options: &ExtractOptions,
    ) -> Result<Vec<Question>, ExtractorError> {
        let body = serde_json::json!({
            "model": self.model_for(options.speed),
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": self.user_content(data, upload, options) }
            ],
            "max_tokens": self.max_tokens,
            "temperature": self.temperature,
            "stream": false
        });

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| ExtractorError::ApiRequestFailed(e.to_string()))?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(ExtractorError::RateLimited);
        }
        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(ExtractorError::ApiRequestFailed(format!(
                "HTTP {}: {}",
                status, text
            )));
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| ExtractorError::InvalidResponse(e.to_string()))?;

        let content = completion
            .choices
            .first()
            .and_then(|c| c.message.content.as_deref())
            .ok_or_else(|| ExtractorError::InvalidResponse("no choices returned".to_string()))?;

        let questions = parse_question_payload(content)?;
        tracing::debug!(questions = questions.len(), "Extraction call finished");
        Ok(questions)
    }
}
