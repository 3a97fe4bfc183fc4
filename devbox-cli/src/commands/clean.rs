//! `devbox clean`: remove the container, its volumes and its locally built
//! image after confirmation.

use anyhow::{Context, Result};

use devbox_container::DevContainer;
use devbox_core::{ExitCode, ProcessRunner, Prompt};

use crate::output;

pub fn run<R, P>(container: &DevContainer<'_, R>, prompt: &P) -> Result<ExitCode>
where
    R: ProcessRunner,
    P: Prompt + ?Sized,
{
    let question = format!(
        "Remove container '{}', its volumes and its locally built image?",
        container.name()
    );
    if !prompt
        .confirm(&question)
        .context("failed to ask for confirmation")?
    {
        println!("clean cancelled; nothing was removed");
        return Ok(ExitCode::SUCCESS);
    }

    let code = container.down().context("failed to remove the container")?;
    if code.is_success() {
        output::success(format!("container '{}' removed", container.name()));
    } else {
        output::failure(format!("compose down exited with {code}"));
    }
    Ok(code)
}
