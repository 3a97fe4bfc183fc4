//! Domain types for the devbox dispatcher and sync engine.
//!
//! Everything here is ephemeral: built for a single invocation of the
//! dispatcher and never persisted.

use std::fmt;
use std::path::PathBuf;

use clap::ValueEnum;

// ---------------------------------------------------------------------------
// Container state
// ---------------------------------------------------------------------------

/// State of the development container as reported by the runtime.
///
/// Always derived from a fresh query; never cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerState {
    NotCreated,
    Stopped,
    Running,
}

impl ContainerState {
    pub fn is_running(self) -> bool {
        matches!(self, ContainerState::Running)
    }
}

impl fmt::Display for ContainerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContainerState::NotCreated => write!(f, "not created"),
            ContainerState::Stopped => write!(f, "stopped"),
            ContainerState::Running => write!(f, "running"),
        }
    }
}

// ---------------------------------------------------------------------------
// Exit code
// ---------------------------------------------------------------------------

/// Process exit status produced by a dispatcher action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(pub i32);

impl ExitCode {
    pub const SUCCESS: ExitCode = ExitCode(0);
    pub const FAILURE: ExitCode = ExitCode(1);

    pub fn is_success(self) -> bool {
        self.0 == 0
    }
}

impl From<i32> for ExitCode {
    fn from(code: i32) -> Self {
        Self(code)
    }
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        // Out-of-range codes (negative, > 255) collapse to a generic failure.
        std::process::ExitCode::from(u8::try_from(code.0).unwrap_or(1))
    }
}

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// ---------------------------------------------------------------------------
// Sanitizers
// ---------------------------------------------------------------------------

/// Instrumentation tool for the `sanitizer` verb.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum SanitizerTool {
    /// AddressSanitizer
    Asan,
    /// ThreadSanitizer
    Tsan,
    /// UndefinedBehaviorSanitizer
    Ubsan,
}

impl SanitizerTool {
    pub fn as_str(self) -> &'static str {
        match self {
            SanitizerTool::Asan => "asan",
            SanitizerTool::Tsan => "tsan",
            SanitizerTool::Ubsan => "ubsan",
        }
    }

    /// Compiler/linker instrumentation flag.
    pub fn compile_flag(self) -> &'static str {
        match self {
            SanitizerTool::Asan => "-fsanitize=address",
            SanitizerTool::Tsan => "-fsanitize=thread",
            SanitizerTool::Ubsan => "-fsanitize=undefined",
        }
    }

    /// Runtime options variable read by the sanitizer runtime.
    pub fn options_var(self) -> &'static str {
        match self {
            SanitizerTool::Asan => "ASAN_OPTIONS",
            SanitizerTool::Tsan => "TSAN_OPTIONS",
            SanitizerTool::Ubsan => "UBSAN_OPTIONS",
        }
    }
}

impl fmt::Display for SanitizerTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Sync request / outcome
// ---------------------------------------------------------------------------

/// Input to the repository sync engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositorySyncRequest {
    /// Working copy to update.
    pub local_path: PathBuf,
    /// Path or URL of the repository to fetch from.
    pub remote_source: String,
    /// Branch to merge; defaults to the working copy's current branch.
    pub target_branch: Option<String>,
}

impl RepositorySyncRequest {
    pub fn new(local_path: impl Into<PathBuf>, remote_source: impl Into<String>) -> Self {
        Self {
            local_path: local_path.into(),
            remote_source: remote_source.into(),
            target_branch: None,
        }
    }

    pub fn with_target_branch(mut self, branch: impl Into<String>) -> Self {
        self.target_branch = Some(branch.into());
        self
    }
}

/// Result of a sync run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Merge completed; carries the latest commit summary.
    Synced(String),
    /// Local changes were stashed but there was nothing to merge.
    Stashed,
    /// Operator declined to continue; nothing was changed.
    Cancelled,
    /// The requested branch has no remote-tracking counterpart.
    BranchNotFound(Vec<String>),
    /// A git operation failed; carries its message verbatim.
    Failed(String),
}

impl SyncOutcome {
    pub fn exit_code(&self) -> ExitCode {
        match self {
            SyncOutcome::Synced(_) | SyncOutcome::Stashed | SyncOutcome::Cancelled => {
                ExitCode::SUCCESS
            }
            SyncOutcome::BranchNotFound(_) | SyncOutcome::Failed(_) => ExitCode::FAILURE,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
