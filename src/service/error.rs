use super::{feed::FeedError, generator::GenerationError, render::RenderError};

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Generation error: {0}")]
    Generation(#[from] GenerationError),
    #[error("Render error: {0}")]
    Render(#[from] RenderError),
    #[error("Feed error: {0}")]
    Feed(#[from] FeedError),
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}
