use async_trait::async_trait;

use crate::config::{AiConfig, VisionProvider};
use crate::error::ClassifierError;
use crate::providers::{google::GoogleGenAiProvider, openai::OpenAiProvider};

/// Trait for vision-capable AI providers
#[async_trait]
pub trait VisionProviderTrait: Send + Sync {
    /// Ask the model about a PNG screenshot, returning its raw text answer.
    async fn describe_image(&self, png: &[u8], prompt: &str) -> Result<String, ClassifierError>;

    /// Get the model name being used
    fn model_name(&self) -> &str;

    /// Short provider name for log and error messages
    fn provider_name(&self) -> &'static str;
}

/// Create a provider instance based on configuration.
///
/// The API key was already validated when the `AiConfig` was built, so
/// construction itself cannot fail.
#[must_use]
pub fn create_provider(config: &AiConfig) -> Box<dyn VisionProviderTrait> {
    match config.provider {
        VisionProvider::Google => {
            Box::new(GoogleGenAiProvider::new(&config.api_key, &config.model))
        }
        VisionProvider::OpenAi => {
            Box::new(OpenAiProvider::new(&config.api_key, &config.model, None))
        }
    }
}
