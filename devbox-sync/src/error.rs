//! Error types for devbox-sync.

use thiserror::Error;

use devbox_core::{ProcessError, PromptError};

/// All errors that can arise from git operations.
#[derive(Debug, Error)]
pub enum SyncError {
    /// git could not be started at all.
    #[error(transparent)]
    Process(#[from] ProcessError),

    /// The operator could not be asked.
    #[error(transparent)]
    Prompt(#[from] PromptError),

    /// git ran and exited non-zero; `message` is its own output.
    #[error("{message}")]
    Git { command: String, message: String },
}

impl SyncError {
    /// Text reported to the operator, verbatim from git where possible.
    pub fn reason(&self) -> String {
        match self {
            SyncError::Git { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}
