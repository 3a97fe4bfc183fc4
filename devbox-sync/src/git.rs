//! The [`Git`] seam and its CLI implementation.

use std::path::Path;

use devbox_core::{Invocation, Launcher, OutputMode, ProcessRunner};

use crate::error::SyncError;

/// Git operations the sync and init flows need, all against a working copy
/// at `path`.
pub trait Git {
    /// Whether `path` holds version-control metadata.
    fn is_repository(&self, path: &Path) -> Result<bool, SyncError>;

    /// Fetch every branch of `remote` into `refs/remotes/<namespace>/*`.
    fn fetch(&self, path: &Path, remote: &str, namespace: &str) -> Result<(), SyncError>;

    /// Name of the checked-out branch (`HEAD` when detached).
    fn current_branch(&self, path: &Path) -> Result<String, SyncError>;

    /// Paths with uncommitted modifications, untracked files included.
    fn modified_files(&self, path: &Path) -> Result<Vec<String>, SyncError>;

    /// Stash all modifications, untracked files included.
    fn stash(&self, path: &Path, message: &str) -> Result<(), SyncError>;

    /// Branch names under `refs/remotes/<namespace>/`, sorted.
    fn remote_branches(&self, path: &Path, namespace: &str) -> Result<Vec<String>, SyncError>;

    /// Merge `branch` of `remote` into the current branch.
    fn pull(&self, path: &Path, remote: &str, branch: &str) -> Result<(), SyncError>;

    /// One-line summary of the latest commit.
    fn head_summary(&self, path: &Path) -> Result<String, SyncError>;

    /// Clone `remote` into `path`, which must be absent or empty.
    fn clone_into(&self, remote: &str, path: &Path) -> Result<(), SyncError>;

    /// Delete everything inside `path`, keeping the directory itself (it is
    /// usually a volume mount point).
    fn discard_working_copy(&self, path: &Path) -> Result<(), SyncError>;
}

/// [`Git`] implemented by running the `git` CLI, on the host or inside the
/// container depending on the [`Launcher`].
pub struct GitCli<R> {
    runner: R,
    launcher: Launcher,
    program: String,
}

impl<R: ProcessRunner> GitCli<R> {
    pub fn new(runner: R, launcher: Launcher) -> Self {
        Self {
            runner,
            launcher,
            program: "git".to_string(),
        }
    }

    fn git_in(&self, path: &Path, args: &[&str]) -> Result<String, SyncError> {
        let inv = Invocation::new(&self.program)
            .arg("-C")
            .arg(path.display().to_string())
            .args(args.iter().copied());
        self.run(inv)
    }

    fn run(&self, inner: Invocation) -> Result<String, SyncError> {
        let inv = self.launcher.wrap(inner);
        tracing::debug!("running: {inv}");
        let output = self.runner.run(&inv, OutputMode::Capture)?;
        if !output.success() {
            return Err(SyncError::Git {
                command: inv.command_line(),
                message: output.failure_message(),
            });
        }
        Ok(output.stdout)
    }
}

impl<R: ProcessRunner> Git for GitCli<R> {
    fn is_repository(&self, path: &Path) -> Result<bool, SyncError> {
        let inv = self.launcher.wrap(
            Invocation::new("test")
                .arg("-e")
                .arg(path.join(".git").display().to_string()),
        );
        let output = self.runner.run(&inv, OutputMode::Capture)?;
        match output.status_code {
            0 => Ok(true),
            1 => Ok(false),
            _ => Err(SyncError::Git {
                command: inv.command_line(),
                message: output.failure_message(),
            }),
        }
    }

    fn fetch(&self, path: &Path, remote: &str, namespace: &str) -> Result<(), SyncError> {
        let refspec = format!("+refs/heads/*:refs/remotes/{namespace}/*");
        self.git_in(path, &["fetch", "--prune", remote, &refspec])?;
        Ok(())
    }

    fn current_branch(&self, path: &Path) -> Result<String, SyncError> {
        let out = self.git_in(path, &["rev-parse", "--abbrev-ref", "HEAD"])?;
        Ok(out.trim().to_string())
    }

    fn modified_files(&self, path: &Path) -> Result<Vec<String>, SyncError> {
        let out = self.git_in(path, &["status", "--porcelain"])?;
        Ok(parse_porcelain(&out))
    }

    fn stash(&self, path: &Path, message: &str) -> Result<(), SyncError> {
        self.git_in(path, &["stash", "push", "--include-untracked", "-m", message])?;
        Ok(())
    }

    fn remote_branches(&self, path: &Path, namespace: &str) -> Result<Vec<String>, SyncError> {
        let prefix = format!("refs/remotes/{namespace}/");
        let out = self.git_in(
            path,
            &["for-each-ref", "--format=%(refname:strip=3)", &prefix],
        )?;
        let mut branches: Vec<String> = out
            .lines()
            .map(str::trim)
            .filter(|name| !name.is_empty() && *name != "HEAD")
            .map(str::to_string)
            .collect();
        branches.sort();
        Ok(branches)
    }

    fn pull(&self, path: &Path, remote: &str, branch: &str) -> Result<(), SyncError> {
        let out = self.git_in(path, &["pull", "--no-rebase", "--no-edit", remote, branch])?;
        for line in out.lines() {
            tracing::info!("{line}");
        }
        Ok(())
    }

    fn head_summary(&self, path: &Path) -> Result<String, SyncError> {
        let out = self.git_in(path, &["log", "-1", "--format=%h %s (%an, %ar)"])?;
        Ok(out.trim().to_string())
    }

    fn clone_into(&self, remote: &str, path: &Path) -> Result<(), SyncError> {
        self.run(
            Invocation::new(&self.program)
                .arg("clone")
                .arg(remote)
                .arg(path.display().to_string()),
        )?;
        Ok(())
    }

    fn discard_working_copy(&self, path: &Path) -> Result<(), SyncError> {
        self.run(
            Invocation::new("find")
                .arg(path.display().to_string())
                .args(["-mindepth", "1", "-delete"]),
        )?;
        Ok(())
    }
}

/// Paths from `git status --porcelain` (v1) output. Renames report the new path.
pub fn parse_porcelain(output: &str) -> Vec<String> {
    output
        .lines()
        .filter(|line| line.len() > 3)
        .map(|line| {
            let path = &line[3..];
            match path.split_once(" -> ") {
                Some((_, to)) => to.to_string(),
                None => path.to_string(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use devbox_core::testing::FakeRunner;
    use devbox_core::CommandOutput;

    use super::*;

    #[test]
    fn porcelain_parsing_handles_renames_and_untracked() {
        let out = " M src/main.c\n?? notes.txt\nR  old.c -> new.c\n";
        assert_eq!(parse_porcelain(out), vec!["src/main.c", "notes.txt", "new.c"]);
        assert!(parse_porcelain("").is_empty());
    }

    #[test]
    fn fetch_uses_namespaced_refspec_inside_container() {
        let runner = FakeRunner::new();
        let git = GitCli::new(&runner, Launcher::exec("docker", "devbox"));
        git.fetch(Path::new("/workspace"), "/source", "source").unwrap();
        assert_eq!(
            runner.command_lines(),
            vec![
                "docker exec devbox git -C /workspace fetch --prune /source \
                 +refs/heads/*:refs/remotes/source/*"
            ]
        );
    }

    #[test]
    fn remote_branches_drop_head_and_sort() {
        let runner = FakeRunner::new().respond("for-each-ref", "main\nHEAD\nfeature/x\n");
        let git = GitCli::new(&runner, Launcher::Host);
        let branches = git.remote_branches(Path::new("/w"), "source").unwrap();
        assert_eq!(branches, vec!["feature/x", "main"]);
    }

    #[test]
    fn pull_failure_keeps_git_message_verbatim() {
        let runner = FakeRunner::new().respond_with(
            "pull",
            CommandOutput {
                status_code: 1,
                stderr: "fatal: couldn't find remote ref nope\n".to_string(),
                ..CommandOutput::default()
            },
        );
        let git = GitCli::new(&runner, Launcher::Host);
        let err = git.pull(Path::new("/w"), "/source", "nope").unwrap_err();
        assert_eq!(err.reason(), "fatal: couldn't find remote ref nope");
    }

    #[test]
    fn repository_check_looks_for_git_metadata() {
        let runner = FakeRunner::new().respond_status("test -e", 1);
        let git = GitCli::new(&runner, Launcher::Host);
        assert!(!git.is_repository(Path::new("/tmp/w")).unwrap());
        assert_eq!(runner.command_lines(), vec!["test -e /tmp/w/.git"]);
    }
}
