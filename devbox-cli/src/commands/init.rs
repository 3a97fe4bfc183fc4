//! `devbox init`

use anyhow::Result;

use devbox_container::DevContainer;
use devbox_core::{ExitCode, ProcessRunner, Prompt};
use devbox_sync::{initialize, GitCli, InitOutcome};

use crate::output;

/// Clone the source repository into the workspace.
pub fn run<R, P>(container: &DevContainer<'_, R>, prompt: &P) -> Result<ExitCode>
where
    R: ProcessRunner,
    P: Prompt + ?Sized,
{
    let config = container.config();
    let git = GitCli::new(container.runner(), container.launcher());

    match initialize(&git, prompt, &config.workspace, &config.source) {
        InitOutcome::Cloned(summary) => {
            output::success(format!(
                "cloned {} into {}",
                config.source,
                config.workspace.display()
            ));
            println!("  HEAD: {summary}");
            Ok(ExitCode::SUCCESS)
        }
        InitOutcome::Cancelled => {
            println!("init cancelled; existing working copy kept");
            Ok(ExitCode::SUCCESS)
        }
        InitOutcome::Failed(reason) => {
            output::failure(format!("init failed: {reason}"));
            Ok(ExitCode::FAILURE)
        }
    }
}
