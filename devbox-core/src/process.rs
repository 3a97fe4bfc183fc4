//! External process execution.
//!
//! Every call to `docker`, `git` or `brew` goes through [`ProcessRunner`], so
//! the dispatcher can be exercised against a recording fake.

use std::collections::BTreeMap;
use std::fmt;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::process::{Command, ExitStatus, Stdio};

use crate::error::ProcessError;

/// A fully described external command.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    /// Extra environment for the child, on top of the inherited one.
    pub env: BTreeMap<String, String>,
}

impl Invocation {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            ..Self::default()
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// `program arg1 arg2 …` as shown in logs and error messages.
    pub fn command_line(&self) -> String {
        let mut line = self.program.clone();
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.command_line())
    }
}

/// Where a command runs: directly on the host, or inside a container via
/// `docker exec`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Launcher {
    Host,
    Exec {
        docker: String,
        container: String,
        /// `-w` for the exec'd process.
        workdir: Option<PathBuf>,
        /// Allocate a TTY and keep stdin open (`-it`).
        interactive: bool,
    },
}

impl Launcher {
    pub fn exec(docker: impl Into<String>, container: impl Into<String>) -> Self {
        Launcher::Exec {
            docker: docker.into(),
            container: container.into(),
            workdir: None,
            interactive: false,
        }
    }

    pub fn in_dir(self, dir: impl Into<PathBuf>) -> Self {
        match self {
            Launcher::Host => Launcher::Host,
            Launcher::Exec {
                docker,
                container,
                interactive,
                ..
            } => Launcher::Exec {
                docker,
                container,
                workdir: Some(dir.into()),
                interactive,
            },
        }
    }

    pub fn interactive(self) -> Self {
        match self {
            Launcher::Host => Launcher::Host,
            Launcher::Exec {
                docker,
                container,
                workdir,
                ..
            } => Launcher::Exec {
                docker,
                container,
                workdir,
                interactive: true,
            },
        }
    }

    /// Rewrite `inner` so it runs at this location. For `Exec`, the inner
    /// environment is forwarded with `-e` rather than set on `docker` itself.
    pub fn wrap(&self, inner: Invocation) -> Invocation {
        match self {
            Launcher::Host => inner,
            Launcher::Exec {
                docker,
                container,
                workdir,
                interactive,
            } => {
                let mut inv = Invocation::new(docker.clone()).arg("exec");
                if *interactive {
                    inv = inv.arg("-it");
                }
                if let Some(dir) = workdir {
                    inv = inv.arg("-w").arg(dir.display().to_string());
                }
                for (key, value) in &inner.env {
                    inv = inv.arg("-e").arg(format!("{key}={value}"));
                }
                inv.arg(container.clone())
                    .arg(inner.program)
                    .args(inner.args)
            }
        }
    }
}

/// How the child's standard streams are wired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Collect stdout/stderr for the caller.
    Capture,
    /// Inherit the caller's stdin/stdout/stderr (live output, interactive).
    Stream,
}

/// Exit status plus any captured output.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandOutput {
    pub status_code: i32,
    /// Empty in [`OutputMode::Stream`].
    pub stdout: String,
    /// Empty in [`OutputMode::Stream`].
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status_code == 0
    }

    /// Trimmed stderr, falling back to stdout, for failure messages.
    pub fn failure_message(&self) -> String {
        let stderr = self.stderr.trim();
        if !stderr.is_empty() {
            return stderr.to_string();
        }
        let stdout = self.stdout.trim();
        if !stdout.is_empty() {
            return stdout.to_string();
        }
        format!("exited with status {}", self.status_code)
    }
}

/// Executes external commands.
pub trait ProcessRunner {
    fn run(&self, invocation: &Invocation, mode: OutputMode)
        -> Result<CommandOutput, ProcessError>;
}

impl<R: ProcessRunner + ?Sized> ProcessRunner for &R {
    fn run(
        &self,
        invocation: &Invocation,
        mode: OutputMode,
    ) -> Result<CommandOutput, ProcessError> {
        (**self).run(invocation, mode)
    }
}

/// [`ProcessRunner`] backed by `std::process::Command`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn run(
        &self,
        invocation: &Invocation,
        mode: OutputMode,
    ) -> Result<CommandOutput, ProcessError> {
        let mut cmd = Command::new(&invocation.program);
        cmd.args(&invocation.args).envs(&invocation.env);

        let spawn_err = |source: std::io::Error| {
            if source.kind() == ErrorKind::NotFound {
                ProcessError::NotFound {
                    program: invocation.program.clone(),
                }
            } else {
                ProcessError::Spawn {
                    command: invocation.command_line(),
                    source,
                }
            }
        };

        match mode {
            OutputMode::Capture => {
                let output = cmd.stdin(Stdio::null()).output().map_err(spawn_err)?;
                Ok(CommandOutput {
                    status_code: status_code(output.status),
                    stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                    stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                })
            }
            OutputMode::Stream => {
                let status = cmd
                    .stdin(Stdio::inherit())
                    .stdout(Stdio::inherit())
                    .stderr(Stdio::inherit())
                    .status()
                    .map_err(spawn_err)?;
                Ok(CommandOutput {
                    status_code: status_code(status),
                    ..CommandOutput::default()
                })
            }
        }
    }
}

/// Exit code, or `128 + signal` for signal-terminated children (shell convention).
fn status_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    1
}
