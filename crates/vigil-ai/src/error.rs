use thiserror::Error;

/// Startup configuration failures. The only error class that is fatal:
/// everything else is contained within its check cycle.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("API key not configured: set the {var} environment variable")]
    MissingApiKey { var: &'static str },

    #[error("unknown vision provider '{0}' (expected 'google' or 'openai')")]
    UnknownProvider(String),
}

/// Transient classification failures. The caller logs these and retries on
/// the next scheduled cycle, never in a tight loop.
#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("request to {provider} failed")]
    Request {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{provider} API error: {body}")]
    Api { provider: &'static str, body: String },

    #[error("could not extract text from {provider} response")]
    MalformedResponse { provider: &'static str },
}
