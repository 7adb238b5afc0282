use thiserror::Error;

#[derive(Error, Debug)]
pub enum LlmError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Request timed out after {0}s")]
    Timeout(u64),

    #[error("LLM API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("LLM API returned no message content")]
    EmptyResponse,
}

pub type Result<T> = std::result::Result<T, LlmError>;
