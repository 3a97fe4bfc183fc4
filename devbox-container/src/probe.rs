//! Container State Probe.
//!
//! Two `docker ps` queries filtered by exact name: the running set first,
//! then all containers. `Running` short-circuits after the first query.
//! Nothing is cached; a later call may legitimately see a different state.

use devbox_core::{ContainerState, Invocation, OutputMode, ProcessRunner};

use crate::{ContainerError, DevContainer};

impl<R: ProcessRunner> DevContainer<'_, R> {
    /// Query the runtime for the container's current state.
    pub fn state(&self) -> Result<ContainerState, ContainerError> {
        if self.listed(false)? {
            tracing::debug!(container = %self.name(), "container is running");
            return Ok(ContainerState::Running);
        }
        let state = if self.listed(true)? {
            ContainerState::Stopped
        } else {
            ContainerState::NotCreated
        };
        tracing::debug!(container = %self.name(), state = %state, "container state");
        Ok(state)
    }

    /// Whether the container appears in `docker ps` (or `docker ps -a`).
    fn listed(&self, all: bool) -> Result<bool, ContainerError> {
        let mut inv = Invocation::new(&self.config.docker_program).arg("ps");
        if all {
            inv = inv.arg("-a");
        }
        // Name filters are regexes matched against "/<name>".
        let inv = inv
            .arg("--filter")
            .arg(format!("name=^/{}$", self.name()))
            .arg("--format")
            .arg("{{.Names}}");

        let output = self.runner.run(&inv, OutputMode::Capture)?;
        if !output.success() {
            return Err(ContainerError::Runtime {
                command: inv.command_line(),
                message: output.failure_message(),
            });
        }
        Ok(output.stdout.lines().any(|line| line.trim() == self.name()))
    }
}
