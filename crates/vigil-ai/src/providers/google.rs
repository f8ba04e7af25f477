use async_trait::async_trait;
use base64::Engine as _;
use reqwest::Client;
use serde_json::json;

use crate::error::ClassifierError;
use crate::vision_provider::VisionProviderTrait;

const PROVIDER: &str = "Google GenAI";

/// Google GenAI (Gemini) vision provider
pub struct GoogleGenAiProvider {
    client: Client,
    api_key: String,
    model: String,
}

impl GoogleGenAiProvider {
    #[must_use]
    pub fn new(api_key: &str, model: &str) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.to_string(),
            model: model.to_string(),
        }
    }
}

#[async_trait]
impl VisionProviderTrait for GoogleGenAiProvider {
    fn model_name(&self) -> &str {
        &self.model
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER
    }

    async fn describe_image(&self, png: &[u8], prompt: &str) -> Result<String, ClassifierError> {
        let url = format!(
            "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent?key={}",
            self.model, self.api_key
        );

        let encoded = base64::engine::general_purpose::STANDARD.encode(png);
        let body = json!({
            "contents": [{
                "parts": [
                    { "text": prompt },
                    { "inline_data": { "mime_type": "image/png", "data": encoded } }
                ]
            }],
            // Low temperature for consistent verdicts; the answer is one word.
            "generationConfig": { "temperature": 0.1, "maxOutputTokens": 50 }
        });

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|source| ClassifierError::Request { provider: PROVIDER, source })?;

        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClassifierError::Api { provider: PROVIDER, body });
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|source| ClassifierError::Request { provider: PROVIDER, source })?;

        // Extract text from: candidates[0].content.parts[0].text
        json["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .map(ToString::to_string)
            .ok_or(ClassifierError::MalformedResponse { provider: PROVIDER })
    }
}
