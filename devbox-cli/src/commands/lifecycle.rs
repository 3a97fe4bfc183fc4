//! `devbox start`, `devbox stop`, `devbox restart`.

use anyhow::{Context, Result};

use devbox_container::DevContainer;
use devbox_core::{ExitCode, ProcessRunner};

use crate::output;

/// `compose up -d`, then report the state the runtime sees.
pub fn start<R: ProcessRunner>(container: &DevContainer<'_, R>) -> Result<ExitCode> {
    let code = container.up().context("failed to start the container")?;
    if !code.is_success() {
        output::failure(format!("compose up exited with {code}"));
        return Ok(code);
    }
    let state = container
        .state()
        .context("failed to query container state")?;
    output::success(format!("container '{}' is {state}", container.name()));
    Ok(code)
}

pub fn stop<R: ProcessRunner>(container: &DevContainer<'_, R>) -> Result<ExitCode> {
    let code = container.stop().context("failed to stop the container")?;
    if code.is_success() {
        output::success(format!("container '{}' stopped", container.name()));
    } else {
        output::failure(format!("compose stop exited with {code}"));
    }
    Ok(code)
}

pub fn restart<R: ProcessRunner>(container: &DevContainer<'_, R>) -> Result<ExitCode> {
    let code = stop(container)?;
    if !code.is_success() {
        return Ok(code);
    }
    start(container)
}
