//! Client for an OpenAI-compatible chat completions service.
//!
//! Components that need a language model take an `Arc<dyn ChatModel>` so the
//! HTTP client is built once at startup and shared.

mod client;
mod error;

pub use client::{
    ChatRequest, ChatResponse, Choice, ContentPart, ImageUrl, LlmConfig, Message, OpenAiClient,
    ResponseMessage, DEFAULT_BASE_URL, DEFAULT_MAX_TOKENS, DEFAULT_MODEL, DEFAULT_TIMEOUT,
};
pub use error::{LlmError, Result};

use async_trait::async_trait;

/// A text-generation service that can also read images.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Send a plain text prompt and return the model's reply.
    async fn complete(&self, prompt: &str) -> Result<String>;

    /// Send an instruction together with a PNG image and return the reply.
    async fn describe_image(&self, prompt: &str, png: &[u8]) -> Result<String>;
}
