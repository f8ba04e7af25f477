pub mod classifier;
pub mod config;
pub mod error;
pub mod prompt;
pub mod providers;
pub mod vision_provider;

pub use classifier::{parse_verdict, ScreenClassifier, Verdict, VerdictClassifier};
pub use config::{AiConfig, VisionProvider};
pub use error::{ClassifierError, ConfigError};
pub use prompt::ANALYSIS_PROMPT;
pub use vision_provider::{create_provider, VisionProviderTrait};
