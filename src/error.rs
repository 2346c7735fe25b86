use thiserror::Error;

#[derive(Debug, Error)]
pub enum PanicError {
    /// A record is missing a required field or carries an unusable value.
    #[error("invalid assignment input: {field} {reason}")]
    InvalidInput { field: &'static str, reason: String },

    /// The text generation service failed or answered with something unusable.
    #[error("text generation unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("No Gemini API key set. Export GEMINI_API_KEY and try again.")]
    NoCredential,

    #[error("a request is already in flight for this session")]
    RequestInFlight,
}

impl PanicError {
    pub fn missing(field: &'static str) -> Self {
        PanicError::InvalidInput {
            field,
            reason: "is required".to_string(),
        }
    }

    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        PanicError::InvalidInput {
            field,
            reason: reason.into(),
        }
    }
}

impl From<reqwest::Error> for PanicError {
    fn from(err: reqwest::Error) -> Self {
        // reqwest prints the request URL; keep it out of messages that get logged.
        PanicError::UpstreamUnavailable(err.without_url().to_string())
    }
}
