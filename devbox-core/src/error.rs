//! Error types for devbox-core.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can arise while loading `devbox.yaml`.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Underlying I/O failure (permission denied, etc.).
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML parse error on load: includes file path and line context from serde_yaml.
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// An explicitly requested config file does not exist.
    #[error("config not found at {path}")]
    NotFound { path: PathBuf },

    /// A field parsed but holds an unusable value.
    #[error("invalid config value for `{field}`: {message}")]
    Invalid { field: &'static str, message: String },
}

/// Errors from spawning external programs.
///
/// A program that runs and exits non-zero is *not* an error at this level;
/// its status is carried in [`crate::CommandOutput`].
#[derive(Debug, Error)]
pub enum ProcessError {
    /// The program is not installed or not on `PATH`.
    #[error("`{program}` not found on PATH")]
    NotFound { program: String },

    /// Any other spawn / wait failure.
    #[error("failed to run `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> ConfigError {
    ConfigError::Io {
        path: path.into(),
        source,
    }
}

/// The terminal could not be read from or written to while asking the
/// operator a question.
#[derive(Debug, Error)]
#[error("could not prompt on the terminal: {0}")]
pub struct PromptError(#[from] pub dialoguer::Error);

impl From<std::io::Error> for PromptError {
    fn from(err: std::io::Error) -> Self {
        Self(dialoguer::Error::from(err))
    }
}
