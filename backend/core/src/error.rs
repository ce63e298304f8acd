use thiserror::Error;

/// Top-level error type for the chatforge runtime.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("send failed on channel {0}")]
    SendFailed(String),

    #[error("configuration error: {0}")]
    ConfigError(String),

    #[error("command execution failed: {0}")]
    ExecutionFailed(String),

    #[error("platform client error: {0}")]
    ClientError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
