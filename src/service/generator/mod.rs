mod openai;

pub use openai::{OpenAiConfig, OpenAiGenerator};

use async_trait::async_trait;

use super::language::Language;

#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("generation timed out after {0}s")]
    Timeout(u64),
    #[error("upstream returned {status}: {body}")]
    Upstream { status: u16, body: String },
    #[error("transport error: {0}")]
    Transport(String),
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl GenerationError {
    /// Failures a later attempt may get past.
    pub fn is_retryable(&self) -> bool {
        match self {
            GenerationError::Timeout(_) | GenerationError::Transport(_) => true,
            GenerationError::Upstream { status, .. } => *status == 429 || *status >= 500,
            GenerationError::Malformed(_) => false,
        }
    }
}

impl From<reqwest::Error> for GenerationError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            GenerationError::Timeout(0)
        } else if error.is_decode() {
            GenerationError::Malformed(error.to_string())
        } else {
            GenerationError::Transport(error.to_string())
        }
    }
}

/// The chat-completion backend, seen as a black box.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        language: Language,
    ) -> Result<String, GenerationError>;

    async fn analyze_image(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        image: &[u8],
        language: Language,
    ) -> Result<String, GenerationError>;
}
