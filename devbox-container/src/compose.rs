//! Container lifecycle through the compose CLI.
//!
//! Output is streamed; a non-zero compose exit is returned as-is, never
//! retried.

use devbox_core::{ExitCode, Invocation, OutputMode, ProcessRunner};

use crate::{ContainerError, DevContainer};

impl<R: ProcessRunner> DevContainer<'_, R> {
    /// `compose up -d`: creates the container (building the image if
    /// missing) or starts a stopped one.
    pub fn up(&self) -> Result<ExitCode, ContainerError> {
        self.compose(&["up", "-d"])
    }

    /// `compose stop`
    pub fn stop(&self) -> Result<ExitCode, ContainerError> {
        self.compose(&["stop"])
    }

    /// `compose down` removing volumes, orphans and the locally built image.
    pub fn down(&self) -> Result<ExitCode, ContainerError> {
        self.compose(&["down", "--volumes", "--remove-orphans", "--rmi", "local"])
    }

    fn compose(&self, args: &[&str]) -> Result<ExitCode, ContainerError> {
        let inv = self.compose_invocation(args);
        tracing::info!(command = %inv, "running compose");
        let output = self.runner.run(&inv, OutputMode::Stream)?;
        if !output.success() {
            tracing::warn!(command = %inv, status = output.status_code, "compose failed");
        }
        Ok(ExitCode(output.status_code))
    }

    pub(crate) fn compose_invocation(&self, args: &[&str]) -> Invocation {
        let (program, prefix) = match self.config.compose_command.split_first() {
            Some((program, prefix)) => (program.as_str(), prefix),
            None => ("docker-compose", &[][..]),
        };
        Invocation::new(program)
            .args(prefix.iter().cloned())
            .arg("-f")
            .arg(self.config.compose_file.display().to_string())
            .args(args.iter().copied())
    }
}
