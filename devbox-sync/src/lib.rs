//! # devbox-sync
//!
//! Repository synchronisation between a source repository and the
//! container's working copy.
//!
//! Call [`SyncEngine::sync`] to fetch and merge, or [`initialize`] to clone
//! the working copy in the first place. Both talk to git only through the
//! [`Git`] trait; [`GitCli`] is the real implementation.

pub mod engine;
pub mod error;
pub mod git;
pub mod init;

pub use engine::{SyncEngine, SyncReport};
pub use error::SyncError;
pub use git::{Git, GitCli};
pub use init::{initialize, InitOutcome};
