use std::str::FromStr;

use crate::error::ConfigError;

/// Supported remote vision model providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisionProvider {
    Google,
    OpenAi,
}

impl VisionProvider {
    /// Environment variable holding the provider's API key.
    #[must_use]
    pub const fn api_key_var(self) -> &'static str {
        match self {
            Self::Google => "GEMINI_API_KEY",
            Self::OpenAi => "OPENAI_API_KEY",
        }
    }

    /// Default vision-capable model for the provider.
    #[must_use]
    pub const fn default_model(self) -> &'static str {
        match self {
            Self::Google => "gemini-2.0-flash",
            Self::OpenAi => "gpt-4o-mini",
        }
    }
}

impl FromStr for VisionProvider {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "google" | "gemini" => Ok(Self::Google),
            "openai" => Ok(Self::OpenAi),
            other => Err(ConfigError::UnknownProvider(other.to_string())),
        }
    }
}

/// Resolved AI configuration for one session.
#[derive(Debug, Clone)]
pub struct AiConfig {
    pub provider: VisionProvider,
    pub api_key: String,
    pub model: String,
}

impl AiConfig {
    /// Build a configuration from the environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingApiKey` when the provider's key variable
    /// is unset or blank. This is fatal at startup by design.
    pub fn from_env(provider: VisionProvider, model: Option<String>) -> Result<Self, ConfigError> {
        let var = provider.api_key_var();
        let api_key = std::env::var(var)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or(ConfigError::MissingApiKey { var })?;

        Ok(Self {
            provider,
            api_key,
            model: model.unwrap_or_else(|| provider.default_model().to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_parses_common_spellings() {
        assert_eq!("google".parse::<VisionProvider>().unwrap(), VisionProvider::Google);
        assert_eq!("Gemini".parse::<VisionProvider>().unwrap(), VisionProvider::Google);
        assert_eq!("OpenAI".parse::<VisionProvider>().unwrap(), VisionProvider::OpenAi);
    }

    #[test]
    fn unknown_provider_is_rejected() {
        assert!(matches!(
            "mistral".parse::<VisionProvider>(),
            Err(ConfigError::UnknownProvider(_))
        ));
    }
}
