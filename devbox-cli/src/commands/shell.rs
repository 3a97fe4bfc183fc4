//! `devbox shell`

use anyhow::{Context, Result};

use devbox_container::DevContainer;
use devbox_core::{ExitCode, ProcessRunner};

/// Attach an interactive shell; its exit status becomes ours.
pub fn run<R: ProcessRunner>(container: &DevContainer<'_, R>) -> Result<ExitCode> {
    container.shell().context("failed to open a shell in the container")
}
