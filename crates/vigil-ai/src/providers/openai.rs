use async_trait::async_trait;
use base64::Engine as _;
use reqwest::Client;
use serde_json::json;

use crate::error::ClassifierError;
use crate::vision_provider::VisionProviderTrait;

const PROVIDER: &str = "OpenAI";

/// OpenAI vision provider (also works with OpenAI-compatible APIs)
pub struct OpenAiProvider {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl OpenAiProvider {
    #[must_use]
    pub fn new(api_key: &str, model: &str, base_url: Option<&str>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            base_url: base_url
                .unwrap_or("https://api.openai.com/v1")
                .trim_end_matches('/')
                .to_string(),
        }
    }
}

#[async_trait]
impl VisionProviderTrait for OpenAiProvider {
    fn model_name(&self) -> &str {
        &self.model
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER
    }

    async fn describe_image(&self, png: &[u8], prompt: &str) -> Result<String, ClassifierError> {
        let url = format!("{}/chat/completions", self.base_url);

        let encoded = base64::engine::general_purpose::STANDARD.encode(png);
        let body = json!({
            "model": self.model,
            "messages": [{
                "role": "user",
                "content": [
                    { "type": "text", "text": prompt },
                    {
                        "type": "image_url",
                        "image_url": { "url": format!("data:image/png;base64,{encoded}") }
                    }
                ]
            }],
            "temperature": 0.1,
            "max_tokens": 50
        });

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
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

        // Extract text from: choices[0].message.content
        json["choices"][0]["message"]["content"]
            .as_str()
            .map(ToString::to_string)
            .ok_or(ClassifierError::MalformedResponse { provider: PROVIDER })
    }
}
