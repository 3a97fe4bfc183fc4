//! Workspace initialisation: clone the source repository into the working
//! copy path, asking before replacing an existing working copy.

use std::path::Path;

use devbox_core::Prompt;

use crate::error::SyncError;
use crate::git::Git;

/// Result of [`initialize`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitOutcome {
    /// Clone finished; carries the latest commit summary.
    Cloned(String),
    /// Operator kept the existing working copy.
    Cancelled,
    Failed(String),
}

/// Clone `remote` into `path`. An existing working copy is only replaced
/// after `prompt` confirms.
pub fn initialize<G, P>(git: &G, prompt: &P, path: &Path, remote: &str) -> InitOutcome
where
    G: Git + ?Sized,
    P: Prompt + ?Sized,
{
    match clone_steps(git, prompt, path, remote) {
        Ok(outcome) => outcome,
        Err(err) => {
            tracing::error!("init of {} failed: {err}", path.display());
            InitOutcome::Failed(err.reason())
        }
    }
}

fn clone_steps<G, P>(git: &G, prompt: &P, path: &Path, remote: &str) -> Result<InitOutcome, SyncError>
where
    G: Git + ?Sized,
    P: Prompt + ?Sized,
{
    if git.is_repository(path)? {
        let question = format!(
            "A working copy already exists at {}. Delete it and clone {remote} again?",
            path.display()
        );
        if !prompt.confirm(&question)? {
            return Ok(InitOutcome::Cancelled);
        }
        tracing::info!("discarding working copy at {}", path.display());
        git.discard_working_copy(path)?;
    }
    tracing::info!("cloning {remote} into {}", path.display());
    git.clone_into(remote, path)?;
    Ok(InitOutcome::Cloned(git.head_summary(path)?))
}
