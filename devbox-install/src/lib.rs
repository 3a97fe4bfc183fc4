//! # devbox-install
//!
//! Host-side installers behind the `devbox-brew` and `devbox-link`
//! binaries:
//!
//! - [`brew`]: package catalog, installed-package detection, `brew install`
//! - [`binaries`]: discover local executables and copy them into a bin dir
//! - [`shell_profile`]: append the bin dir to the shell's PATH, idempotently
//! - [`selection`]: parse menu answers such as `all` or `1 3 5-7`

pub mod binaries;
pub mod brew;
pub mod error;
pub mod selection;
pub mod shell_profile;

pub use binaries::{discover_executables, install_binary, LinkResult};
pub use brew::{Brew, Catalog, InstallReport, Installed, Package};
pub use error::InstallError;
pub use selection::{parse_selection, Selection};
pub use shell_profile::{dir_on_path, ProfileUpdate, ShellProfile};
