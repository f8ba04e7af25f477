use std::fmt;

use async_trait::async_trait;

use crate::error::ClassifierError;
use crate::prompt::ANALYSIS_PROMPT;
use crate::vision_provider::VisionProviderTrait;

/// Resolved two-valued outcome of one screen check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Safe,
    Distracted,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Safe => write!(f, "SAFE"),
            Self::Distracted => write!(f, "DISTRACTED"),
        }
    }
}

/// Port the monitoring coordinator classifies screenshots through.
#[async_trait]
pub trait VerdictClassifier: Send + Sync {
    /// Classify a PNG screenshot. Failures are transient: callers log and
    /// retry on the next scheduled cycle.
    async fn classify(&self, png: &[u8]) -> Result<Verdict, ClassifierError>;
}

/// Classifier backed by a remote vision model.
pub struct ScreenClassifier {
    provider: Box<dyn VisionProviderTrait>,
}

impl ScreenClassifier {
    #[must_use]
    pub fn new(provider: Box<dyn VisionProviderTrait>) -> Self {
        Self { provider }
    }

    #[must_use]
    pub fn model_name(&self) -> &str {
        self.provider.model_name()
    }
}

#[async_trait]
impl VerdictClassifier for ScreenClassifier {
    async fn classify(&self, png: &[u8]) -> Result<Verdict, ClassifierError> {
        let answer = self.provider.describe_image(png, ANALYSIS_PROMPT).await?;
        log::debug!("{} answered: {}", self.provider.provider_name(), answer.trim());
        Ok(parse_verdict(&answer))
    }
}

/// Resolve the model's raw answer into a verdict.
///
/// Case-insensitive substring match, "DISTRACTED" checked before "SAFE".
/// An unclear answer resolves to `Safe`: the monitor is deliberately biased
/// against false positives.
#[must_use]
pub fn parse_verdict(raw: &str) -> Verdict {
    let normalized = raw.trim().to_uppercase();
    if normalized.contains("DISTRACTED") {
        Verdict::Distracted
    } else if normalized.contains("SAFE") {
        Verdict::Safe
    } else {
        log::warn!("Unclear model answer: '{normalized}'. Defaulting to SAFE.");
        Verdict::Safe
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_answers_resolve_directly() {
        assert_eq!(parse_verdict("SAFE"), Verdict::Safe);
        assert_eq!(parse_verdict("DISTRACTED"), Verdict::Distracted);
    }

    #[test]
    fn safe_embedded_in_chatter_resolves_to_safe() {
        assert_eq!(parse_verdict("I think this looks SAFE to me"), Verdict::Safe);
    }

    #[test]
    fn ambiguous_answer_defaults_to_safe() {
        assert_eq!(parse_verdict("hmm unclear"), Verdict::Safe);
        assert_eq!(parse_verdict(""), Verdict::Safe);
    }

    #[test]
    fn distracted_wins_when_both_words_appear() {
        assert_eq!(parse_verdict("not SAFE, clearly DISTRACTED"), Verdict::Distracted);
    }

    #[test]
    fn match_is_case_insensitive() {
        assert_eq!(parse_verdict("distracted"), Verdict::Distracted);
        assert_eq!(parse_verdict("  safe\n"), Verdict::Safe);
    }
}
