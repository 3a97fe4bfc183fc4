//! One module per action. Container verbs take a [`DevContainer`] and
//! return the exit code to report; `brew` and `link` are the installer
//! binaries' argument structs.
//!
//! [`DevContainer`]: devbox_container::DevContainer

pub mod brew;
pub mod build;
pub mod clean;
pub mod init;
pub mod lifecycle;
pub mod link;
pub mod shell;
pub mod status;
pub mod sync;
