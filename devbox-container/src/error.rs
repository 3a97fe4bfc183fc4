use thiserror::Error;

use devbox_core::ProcessError;

/// Error surface for runtime queries, exec, and build plans.
#[derive(Debug, Error)]
pub enum ContainerError {
    #[error(transparent)]
    Process(#[from] ProcessError),

    /// A runtime query (not a user-facing action) exited non-zero.
    #[error("`{command}` failed: {message}")]
    Runtime { command: String, message: String },

    #[error("failed to render `{step}` command template: {source}")]
    Template {
        step: &'static str,
        #[source]
        source: tera::Error,
    },
}
