//! Repository Sync Engine.
//!
//! ## `sync`: gated steps
//!
//! 1. Working copy must have version-control metadata.
//! 2. Fetch every source branch into `refs/remotes/<namespace>/*`; local
//!    branches are never written directly.
//! 3. Read the current branch.
//! 4. Uncommitted changes → ask stash-or-cancel. Cancel changes nothing.
//! 5. Pull the requested branch as given, else the remote-tracking branch
//!    named like the current one, else ask which one to pull.
//!
//! git failures end the run as [`SyncOutcome::Failed`] with git's own
//! message. Nothing is retried or rolled back.

use std::ops::ControlFlow;

use chrono::Utc;

use devbox_core::{Prompt, RepositorySyncRequest, SyncOutcome};

use crate::error::SyncError;
use crate::git::Git;

/// Outcome plus what happened along the way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    pub outcome: SyncOutcome,
    /// Branch the working copy had checked out, once known.
    pub current_branch: Option<String>,
    /// Message of the stash taken during this run, if any.
    pub stash: Option<String>,
}

impl SyncReport {
    fn new(outcome: SyncOutcome) -> Self {
        Self {
            outcome,
            current_branch: None,
            stash: None,
        }
    }
}

/// Drives a sync over a [`Git`] implementation, asking `prompt` for decisions.
pub struct SyncEngine<'a, G: ?Sized, P: ?Sized> {
    git: &'a G,
    prompt: &'a P,
    namespace: String,
}

impl<'a, G, P> SyncEngine<'a, G, P>
where
    G: Git + ?Sized,
    P: Prompt + ?Sized,
{
    pub fn new(git: &'a G, prompt: &'a P, namespace: impl Into<String>) -> Self {
        Self {
            git,
            prompt,
            namespace: namespace.into(),
        }
    }

    /// Run a sync and return only its outcome.
    pub fn sync(&self, req: &RepositorySyncRequest) -> SyncOutcome {
        self.run(req).outcome
    }

    /// Run a sync and return the full report.
    pub fn run(&self, req: &RepositorySyncRequest) -> SyncReport {
        let mut report = SyncReport::new(SyncOutcome::Cancelled);
        let result = self.run_steps(req, &mut report);
        report.outcome = match result {
            Ok(outcome) => outcome,
            Err(err) => {
                tracing::error!("sync of {} failed: {err}", req.local_path.display());
                SyncOutcome::Failed(err.reason())
            }
        };
        report
    }

    fn run_steps(
        &self,
        req: &RepositorySyncRequest,
        report: &mut SyncReport,
    ) -> Result<SyncOutcome, SyncError> {
        let path = req.local_path.as_path();

        // Step 1
        if !self.git.is_repository(path)? {
            return Ok(SyncOutcome::Failed("not initialized".to_string()));
        }

        // Step 2
        tracing::info!("fetching {} into refs/remotes/{}", req.remote_source, self.namespace);
        self.git.fetch(path, &req.remote_source, &self.namespace)?;

        // Step 3
        let current = self.git.current_branch(path)?;
        report.current_branch = Some(current.clone());

        // Step 4
        let modified = self.git.modified_files(path)?;
        if !modified.is_empty() {
            let question = format!(
                "Uncommitted changes in {}:\n{}\nStash them and continue?",
                path.display(),
                modified
                    .iter()
                    .map(|file| format!("  {file}"))
                    .collect::<Vec<_>>()
                    .join("\n"),
            );
            if !self.prompt.confirm(&question)? {
                tracing::info!("sync cancelled; {} modified file(s) left untouched", modified.len());
                return Ok(SyncOutcome::Cancelled);
            }
            let message = format!("devbox sync {}", Utc::now().format("%Y-%m-%dT%H:%M:%SZ"));
            self.git.stash(path, &message)?;
            tracing::info!("stashed {} file(s) as '{message}'", modified.len());
            report.stash = Some(message);
        }

        // Step 5
        let branch = match &req.target_branch {
            Some(target) => target.clone(),
            None => match self.choose_branch(req, current, report)? {
                ControlFlow::Continue(branch) => branch,
                ControlFlow::Break(outcome) => return Ok(outcome),
            },
        };

        tracing::info!("pulling {branch} from {}", req.remote_source);
        self.git.pull(path, &req.remote_source, &branch)?;
        let summary = self.git.head_summary(path)?;
        Ok(SyncOutcome::Synced(summary))
    }

    /// Remote-tracking branch named like `current`, or the operator's pick.
    /// Breaks with the outcome when there is nothing to pull.
    fn choose_branch(
        &self,
        req: &RepositorySyncRequest,
        current: String,
        report: &SyncReport,
    ) -> Result<ControlFlow<SyncOutcome, String>, SyncError> {
        let path = req.local_path.as_path();
        let branches = self.git.remote_branches(path, &self.namespace)?;
        if branches.contains(&current) {
            return Ok(ControlFlow::Continue(current));
        }
        if branches.is_empty() {
            return Ok(ControlFlow::Break(if report.stash.is_some() {
                SyncOutcome::Stashed
            } else {
                SyncOutcome::BranchNotFound(branches)
            }));
        }

        let question = format!(
            "No branch '{current}' in {}. Available:\n{}\nBranch to merge (empty to cancel):",
            req.remote_source,
            branches
                .iter()
                .map(|b| format!("  {b}"))
                .collect::<Vec<_>>()
                .join("\n"),
        );
        let answer = self.prompt.ask(&question)?;
        if answer.is_empty() {
            return Ok(ControlFlow::Break(SyncOutcome::Cancelled));
        }
        if !branches.contains(&answer) {
            return Ok(ControlFlow::Break(SyncOutcome::BranchNotFound(branches)));
        }
        Ok(ControlFlow::Continue(answer))
    }
}
