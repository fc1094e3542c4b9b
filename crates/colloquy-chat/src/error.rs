use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChatError {
    /// Rejected before the completion provider was called
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The completion provider failed, timed out or returned no usable choice.
    /// History is left untouched when this is returned.
    #[error("Completion failed: {0}")]
    Upstream(#[source] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, ChatError>;
