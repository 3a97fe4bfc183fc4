//! devbox core library: domain types, configuration, errors, and the
//! process/prompt seams shared by every other crate.
//!
//! Public API surface:
//! - [`types`]: container state, sanitizers, sync request/outcome, exit codes
//! - [`config`]: `devbox.yaml` load / defaults / env overrides
//! - [`process`]: [`ProcessRunner`] trait and the system implementation
//! - [`prompt`]: [`Prompt`] trait, terminal and scripted implementations
//! - [`error`]: [`ConfigError`], [`ProcessError`], [`PromptError`]
//! - `testing`: recording [`ProcessRunner`] (feature `test-util`)

pub mod config;
pub mod error;
pub mod process;
pub mod prompt;
pub mod types;

#[cfg(any(test, feature = "test-util"))]
pub mod testing;

pub use config::{BuildConfig, DevboxConfig, ValgrindConfig};
pub use error::{ConfigError, ProcessError, PromptError};
pub use process::{
    CommandOutput, Invocation, Launcher, OutputMode, ProcessRunner, SystemRunner,
};
pub use prompt::{AssumeYes, Prompt, ScriptedPrompt, TerminalPrompt};
pub use types::{ContainerState, ExitCode, RepositorySyncRequest, SanitizerTool, SyncOutcome};
