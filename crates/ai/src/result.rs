use thiserror::Error;

/// Failure of a training or scoring cycle.
///
/// The message is meant to reach the user unchanged, so variants carry the
/// underlying failure text.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AiError {
    #[error("invalid training input: {0}")]
    InvalidInput(String),

    #[error("training failed: {0}")]
    TrainingFailed(String),

    #[error("inference failed: {0}")]
    InferenceFailed(String),
}

impl AiError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn training_failed(msg: impl Into<String>) -> Self {
        Self::TrainingFailed(msg.into())
    }

    pub fn inference_failed(msg: impl Into<String>) -> Self {
        Self::InferenceFailed(msg.into())
    }
}
