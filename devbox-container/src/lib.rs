//! # devbox-container
//!
//! Everything devbox asks of the container runtime:
//!
//! - [`probe`]: classify the container as not-created / stopped / running
//! - [`compose`]: `up`, `stop`, `down` through the compose CLI
//! - [`exec`]: interactive shell and one-shot queries inside the container
//! - [`build`]: configure → build → test plans for `valgrind` / `sanitizer`
//! - [`script`]: tera rendering of the configurable build command lines
//!
//! All of it is driven through [`DevContainer`], which borrows the loaded
//! [`DevboxConfig`] and a [`ProcessRunner`].

pub mod build;
pub mod compose;
mod error;
pub mod exec;
pub mod probe;
pub mod script;

use devbox_core::{DevboxConfig, Launcher, ProcessRunner};

pub use build::{BuildPlan, BuildStep};
pub use error::ContainerError;

/// Handle on the configured development container.
pub struct DevContainer<'a, R> {
    config: &'a DevboxConfig,
    runner: R,
}

impl<'a, R: ProcessRunner> DevContainer<'a, R> {
    pub fn new(config: &'a DevboxConfig, runner: R) -> Self {
        Self { config, runner }
    }

    pub fn config(&self) -> &DevboxConfig {
        self.config
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    pub fn name(&self) -> &str {
        &self.config.container_name
    }

    /// `docker exec` launcher for this container, no workdir.
    pub fn launcher(&self) -> Launcher {
        Launcher::exec(&self.config.docker_program, &self.config.container_name)
    }
}
