use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TranslatorError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("provider returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("request timed out")]
    Timeout,

    #[error("provider returned no choices")]
    EmptyResponse,

    #[error("malformed model output: {0}")]
    MalformedResponse(String),
}

impl TranslatorError {
    /// Rate limits, server errors, network failures and garbled model output
    /// are worth another attempt. Other client errors are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            TranslatorError::Status { status, .. } => {
                *status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
            }
            TranslatorError::Http(_)
            | TranslatorError::Timeout
            | TranslatorError::EmptyResponse
            | TranslatorError::MalformedResponse(_) => true,
        }
    }
}
