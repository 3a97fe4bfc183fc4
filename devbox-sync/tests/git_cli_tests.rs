//! Sync engine driving the real `git` binary on the host, against a source
//! repository and a clone of it in temporary directories.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use devbox_core::{Launcher, RepositorySyncRequest, ScriptedPrompt, SyncOutcome, SystemRunner};
use devbox_sync::{Git, GitCli, SyncEngine};
use tempfile::TempDir;

fn git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .arg("-C")
        .arg(dir)
        .args(args)
        .output()
        .expect("run git");
    assert!(
        output.status.success(),
        "git {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn configure_identity(dir: &Path) {
    git(dir, &["config", "user.name", "devbox"]);
    git(dir, &["config", "user.email", "devbox@example.com"]);
    git(dir, &["config", "commit.gpgsign", "false"]);
}

fn commit(dir: &Path, file: &str, contents: &str, message: &str) {
    fs::write(dir.join(file), contents).expect("write file");
    git(dir, &["add", file]);
    git(dir, &["commit", "-q", "-m", message]);
}

/// Source repository with one commit on `main`, and a clone of it made by
/// [`GitCli::clone_into`].
struct Fixture {
    _root: TempDir,
    source: PathBuf,
    work: PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let root = TempDir::new().expect("tempdir");
        let source = root.path().join("source");
        let work = root.path().join("work");

        fs::create_dir_all(&source).expect("source dir");
        git(&source, &["init", "-q"]);
        git(&source, &["symbolic-ref", "HEAD", "refs/heads/main"]);
        configure_identity(&source);
        fs::write(source.join("README"), "devbox fixture\n").expect("README");
        git(&source, &["add", "README"]);
        commit(&source, "kernel.c", "int main(void) { return 0; }\n", "initial commit");

        cli().clone_into(&source_arg(&source), &work).expect("clone");
        configure_identity(&work);

        Self {
            _root: root,
            source,
            work,
        }
    }

    fn request(&self) -> RepositorySyncRequest {
        RepositorySyncRequest::new(&self.work, source_arg(&self.source))
    }
}

fn cli() -> GitCli<SystemRunner> {
    GitCli::new(SystemRunner, Launcher::Host)
}

fn source_arg(path: &Path) -> String {
    path.display().to_string()
}

#[test]
fn dirty_working_copy_is_stashed_then_synced() {
    let _ = env_logger::builder().is_test(true).try_init();
    let fx = Fixture::new();
    commit(&fx.source, "kernel.c", "int main(void) { return 1; }\n", "second commit");
    fs::write(fx.work.join("README"), "local edit\n").expect("local edit");
    fs::write(fx.work.join("notes.txt"), "local scratch\n").expect("untracked file");

    let git_cli = cli();
    let prompt = ScriptedPrompt::new(["y"]);
    let report = SyncEngine::new(&git_cli, &prompt, "source").run(&fx.request());

    assert_eq!(
        git_rev(&fx.work, "HEAD"),
        git_rev(&fx.source, "HEAD"),
        "working copy fast-forwarded to the source"
    );
    match &report.outcome {
        SyncOutcome::Synced(summary) => {
            let short = git(&fx.work, &["rev-parse", "--short", "HEAD"]);
            assert!(summary.starts_with(short.trim()), "{summary}");
            assert!(summary.contains("second commit"), "{summary}");
        }
        other => panic!("expected Synced, got {other:?}"),
    }
    assert_eq!(report.current_branch.as_deref(), Some("main"));
    assert!(git_cli.modified_files(&fx.work).unwrap().is_empty());
    assert!(!fx.work.join("notes.txt").exists());

    let stashes = git(&fx.work, &["stash", "list"]);
    assert_eq!(stashes.lines().count(), 1, "{stashes}");
    assert!(stashes.contains("devbox sync "), "{stashes}");

    // Both the edit and the untracked file come back from the stash.
    git(&fx.work, &["stash", "pop", "-q"]);
    assert_eq!(
        fs::read_to_string(fx.work.join("README")).expect("README"),
        "local edit\n"
    );
    assert_eq!(
        fs::read_to_string(fx.work.join("notes.txt")).expect("notes.txt"),
        "local scratch\n"
    );
}

#[test]
fn fetch_namespaces_nested_branches_and_pulls_them() {
    let fx = Fixture::new();
    git(&fx.source, &["checkout", "-q", "-b", "feature/x"]);
    commit(&fx.source, "irq.c", "void irq(void) {}\n", "add irq handler");
    git(&fx.source, &["checkout", "-q", "main"]);
    git(&fx.work, &["checkout", "-q", "-b", "feature/x"]);

    let git_cli = cli();
    let req = fx.request();
    git_cli.fetch(&fx.work, &req.remote_source, "source").unwrap();
    assert_eq!(
        git_cli.remote_branches(&fx.work, "source").unwrap(),
        vec!["feature/x", "main"]
    );
    // Local branches are left alone by the fetch.
    assert!(!fx.work.join("irq.c").exists());

    let prompt = ScriptedPrompt::default();
    let outcome = SyncEngine::new(&git_cli, &prompt, "source").sync(&req);

    match outcome {
        SyncOutcome::Synced(summary) => assert!(summary.contains("add irq handler"), "{summary}"),
        other => panic!("expected Synced, got {other:?}"),
    }
    assert!(prompt.asked().is_empty());
    assert!(fx.work.join("irq.c").exists());
}

#[test]
fn pulling_a_missing_branch_reports_git_message() {
    let fx = Fixture::new();
    let req = fx.request().with_target_branch("does-not-exist");

    let outcome = SyncEngine::new(&cli(), &ScriptedPrompt::default(), "source").sync(&req);

    match outcome {
        SyncOutcome::Failed(reason) => assert!(reason.contains("does-not-exist"), "{reason}"),
        other => panic!("expected Failed, got {other:?}"),
    }
}

fn git_rev(dir: &Path, rev: &str) -> String {
    git(dir, &["rev-parse", rev]).trim().to_string()
}
