//! `devbox sync`

use anyhow::Result;

use devbox_container::DevContainer;
use devbox_core::{ExitCode, ProcessRunner, Prompt, RepositorySyncRequest, SyncOutcome};
use devbox_sync::{GitCli, SyncEngine};

use crate::output;

pub fn run<R, P>(container: &DevContainer<'_, R>, prompt: &P) -> Result<ExitCode>
where
    R: ProcessRunner,
    P: Prompt + ?Sized,
{
    let config = container.config();
    let git = GitCli::new(container.runner(), container.launcher());
    let request = RepositorySyncRequest::new(&config.workspace, &config.source);

    let report = SyncEngine::new(&git, prompt, &config.remote_namespace).run(&request);

    match &report.outcome {
        SyncOutcome::Synced(summary) => {
            output::success(format!("workspace synced with {}", config.source));
            println!("  HEAD: {summary}");
        }
        SyncOutcome::Stashed => {
            output::success(format!(
                "local changes stashed; {} has no branches to merge",
                config.source
            ));
        }
        SyncOutcome::Cancelled => println!("sync cancelled"),
        SyncOutcome::BranchNotFound(branches) if branches.is_empty() => {
            output::failure(format!("{} has no branches", config.source));
        }
        SyncOutcome::BranchNotFound(branches) => {
            output::failure(format!(
                "no such branch in {}; available: {}",
                config.source,
                branches.join(", ")
            ));
        }
        SyncOutcome::Failed(reason) => output::failure(format!("sync failed: {reason}")),
    }
    if let Some(stash) = &report.stash {
        println!("  local changes were stashed as '{stash}'; restore them with `git stash pop`");
    }

    Ok(report.outcome.exit_code())
}
