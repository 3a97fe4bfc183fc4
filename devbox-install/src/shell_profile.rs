//! PATH patching for the operator's login shell.
//!
//! Each supported shell knows its startup file and the line that puts a
//! directory on `PATH`. Appending is idempotent: the line is written only
//! if the file does not already contain it.

use std::ffi::OsStr;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{io_err, InstallError};

/// Marker written above every line we add.
const MARKER: &str = "# added by devbox-link";

/// A shell whose startup file we know how to extend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellProfile {
    Bash,
    Zsh,
    Fish,
}

/// What [`ShellProfile::ensure_on_path`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileUpdate {
    Appended(PathBuf),
    AlreadyPresent(PathBuf),
}

impl ShellProfile {
    /// Resolve from a shell path or name (`/usr/bin/zsh`, `fish`), by basename.
    pub fn from_shell(shell: &str) -> Result<Self, InstallError> {
        let name = Path::new(shell)
            .file_name()
            .and_then(OsStr::to_str)
            .unwrap_or(shell);
        match name {
            "bash" => Ok(ShellProfile::Bash),
            "zsh" => Ok(ShellProfile::Zsh),
            "fish" => Ok(ShellProfile::Fish),
            other => Err(InstallError::UnsupportedShell(other.to_string())),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ShellProfile::Bash => "bash",
            ShellProfile::Zsh => "zsh",
            ShellProfile::Fish => "fish",
        }
    }

    /// Startup file under `home`.
    pub fn rc_path(self, home: &Path) -> PathBuf {
        match self {
            ShellProfile::Bash => home.join(".bashrc"),
            ShellProfile::Zsh => home.join(".zshrc"),
            ShellProfile::Fish => home.join(".config").join("fish").join("config.fish"),
        }
    }

    /// The line that prepends `dir` to `PATH`.
    pub fn path_line(self, dir: &Path) -> String {
        match self {
            ShellProfile::Bash | ShellProfile::Zsh => {
                format!("export PATH=\"{}:$PATH\"", dir.display())
            }
            ShellProfile::Fish => format!("fish_add_path {}", dir.display()),
        }
    }

    /// Append [`Self::path_line`] to the startup file under `home` unless an
    /// identical line is already there.
    pub fn ensure_on_path(self, home: &Path, dir: &Path) -> Result<ProfileUpdate, InstallError> {
        let rc = self.rc_path(home);
        let line = self.path_line(dir);

        let existing = match fs::read_to_string(&rc) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(e) => return Err(io_err(&rc, e)),
        };
        if existing.lines().any(|l| l.trim() == line) {
            tracing::debug!("{} already adds {}", rc.display(), dir.display());
            return Ok(ProfileUpdate::AlreadyPresent(rc));
        }

        if let Some(parent) = rc.parent() {
            fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&rc)
            .map_err(|e| io_err(&rc, e))?;

        let mut block = String::new();
        if !existing.is_empty() && !existing.ends_with('\n') {
            block.push('\n');
        }
        block.push_str(&format!("\n{MARKER}\n{line}\n"));
        file.write_all(block.as_bytes())
            .map_err(|e| io_err(&rc, e))?;

        tracing::info!("appended PATH entry for {} to {}", dir.display(), rc.display());
        Ok(ProfileUpdate::Appended(rc))
    }
}

/// Whether `dir` is one of the entries of a `PATH`-style value.
pub fn dir_on_path(dir: &Path, path_var: &OsStr) -> bool {
    std::env::split_paths(path_var).any(|entry| entry == dir)
}
