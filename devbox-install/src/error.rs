//! Error types for devbox-install.

use std::path::PathBuf;

use thiserror::Error;

use devbox_core::{ProcessError, PromptError};

/// All errors that can arise from the package and binary installers.
#[derive(Debug, Error)]
pub enum InstallError {
    /// A required program could not be started.
    #[error(transparent)]
    Process(#[from] ProcessError),

    /// The operator could not be asked.
    #[error(transparent)]
    Prompt(#[from] PromptError),

    /// `brew --version` failed or brew is not installed.
    #[error("Homebrew is not available: {0}")]
    BrewUnavailable(String),

    /// A brew query ran but failed.
    #[error("`{command}` failed: {message}")]
    Brew { command: String, message: String },

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Package catalog could not be parsed.
    #[error("failed to parse package catalog at {path}: {source}")]
    Catalog {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// No PATH writer exists for this shell.
    #[error("unsupported shell '{0}'; add the directory to PATH manually (supported: bash, zsh, fish)")]
    UnsupportedShell(String),

    /// The home directory could not be determined.
    #[error("could not determine the home directory")]
    NoHome,
}

/// Convenience constructor for [`InstallError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> InstallError {
    InstallError::Io {
        path: path.into(),
        source,
    }
}
