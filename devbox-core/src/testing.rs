//! Recording [`ProcessRunner`] shared by the test suites of every crate.
//!
//! Enabled for downstream crates with the `test-util` feature.

use std::cell::RefCell;

use crate::error::ProcessError;
use crate::process::{CommandOutput, Invocation, OutputMode, ProcessRunner};

/// Answers commands by substring match on the command line and records every
/// call. The first matching rule wins; unmatched commands succeed silently.
#[derive(Debug, Default)]
pub struct FakeRunner {
    rules: Vec<(String, CommandOutput)>,
    calls: RefCell<Vec<(Invocation, OutputMode)>>,
}

impl FakeRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer command lines containing `needle` with `stdout`, exit 0.
    pub fn respond(self, needle: &str, stdout: &str) -> Self {
        self.respond_with(
            needle,
            CommandOutput {
                stdout: stdout.to_string(),
                ..CommandOutput::default()
            },
        )
    }

    /// Answer command lines containing `needle` with an empty output and
    /// `status_code`.
    pub fn respond_status(self, needle: &str, status_code: i32) -> Self {
        self.respond_with(
            needle,
            CommandOutput {
                status_code,
                ..CommandOutput::default()
            },
        )
    }

    pub fn respond_with(mut self, needle: &str, output: CommandOutput) -> Self {
        self.rules.push((needle.to_string(), output));
        self
    }

    pub fn calls(&self) -> Vec<(Invocation, OutputMode)> {
        self.calls.borrow().clone()
    }

    pub fn command_lines(&self) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .map(|(inv, _)| inv.command_line())
            .collect()
    }

    /// Index of the first recorded command line containing `needle`.
    pub fn position(&self, needle: &str) -> Option<usize> {
        self.command_lines().iter().position(|c| c.contains(needle))
    }

    pub fn ran(&self, needle: &str) -> bool {
        self.position(needle).is_some()
    }
}

impl ProcessRunner for FakeRunner {
    fn run(
        &self,
        invocation: &Invocation,
        mode: OutputMode,
    ) -> Result<CommandOutput, ProcessError> {
        self.calls.borrow_mut().push((invocation.clone(), mode));
        let line = invocation.command_line();
        Ok(self
            .rules
            .iter()
            .find(|(needle, _)| line.contains(needle.as_str()))
            .map(|(_, output)| output.clone())
            .unwrap_or_default())
    }
}
