//! One-shot commands inside the running container.

use std::collections::BTreeMap;
use std::path::Path;

use devbox_core::{ExitCode, Invocation, OutputMode, ProcessRunner};

use crate::{ContainerError, DevContainer};

impl<R: ProcessRunner> DevContainer<'_, R> {
    /// Interactive shell in the workspace, attached to the caller's terminal.
    pub fn shell(&self) -> Result<ExitCode, ContainerError> {
        let inv = self
            .launcher()
            .in_dir(&self.config.workspace)
            .interactive()
            .wrap(Invocation::new(&self.config.shell));
        tracing::debug!(command = %inv, "opening shell");
        let output = self.runner.run(&inv, OutputMode::Stream)?;
        Ok(ExitCode(output.status_code))
    }

    /// Whether the workspace holds version-control metadata.
    pub fn is_initialized(&self) -> Result<bool, ContainerError> {
        self.path_exists(&self.config.workspace_git_dir())
    }

    /// `test -e <path>` inside the container.
    pub fn path_exists(&self, path: &Path) -> Result<bool, ContainerError> {
        let inv = self.launcher().wrap(
            Invocation::new("test")
                .arg("-e")
                .arg(path.display().to_string()),
        );
        let output = self.runner.run(&inv, OutputMode::Capture)?;
        match output.status_code {
            0 => Ok(true),
            1 => Ok(false),
            _ => Err(ContainerError::Runtime {
                command: inv.command_line(),
                message: output.failure_message(),
            }),
        }
    }

    /// Contents of `path` if it exists and is non-empty.
    pub fn read_nonempty_file(&self, path: &Path) -> Result<Option<String>, ContainerError> {
        let inv = self.launcher().wrap(
            Invocation::new("sh")
                .arg("-c")
                .arg(r#"if [ -s "$1" ]; then cat "$1"; fi"#)
                .arg("sh")
                .arg(path.display().to_string()),
        );
        let output = self.runner.run(&inv, OutputMode::Capture)?;
        if !output.success() {
            return Err(ContainerError::Runtime {
                command: inv.command_line(),
                message: output.failure_message(),
            });
        }
        if output.stdout.is_empty() {
            Ok(None)
        } else {
            Ok(Some(output.stdout))
        }
    }

    /// `sh -c <script>` in the workspace, output streamed.
    pub fn run_script(
        &self,
        script: &str,
        env: &BTreeMap<String, String>,
    ) -> Result<ExitCode, ContainerError> {
        let mut inner = Invocation::new("sh").arg("-c").arg(script);
        inner.env = env.clone();
        let inv = self.launcher().in_dir(&self.config.workspace).wrap(inner);
        tracing::debug!(command = %inv, "running script");
        let output = self.runner.run(&inv, OutputMode::Stream)?;
        Ok(ExitCode(output.status_code))
    }
}
