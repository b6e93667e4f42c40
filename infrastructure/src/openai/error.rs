//! Error types for the OpenAI-compatible adapter

use boardroom_application::AgentError;
use thiserror::Error;

/// Errors that can occur when talking to a chat completions endpoint
#[derive(Error, Debug)]
pub enum OpenAiError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Status { status: u16, message: String },

    #[error("Failed to parse response: {error}\nRaw response: {raw}")]
    Parse { error: String, raw: String },

    #[error("Response contained no choices")]
    EmptyResponse,
}

impl From<OpenAiError> for AgentError {
    fn from(error: OpenAiError) -> Self {
        match error {
            OpenAiError::Http(_) | OpenAiError::Status { .. } => {
                AgentError::RequestFailed(error.to_string())
            }
            OpenAiError::Parse { .. } | OpenAiError::EmptyResponse => {
                AgentError::MalformedResponse(error.to_string())
            }
        }
    }
}
