//! Local binary installation.
//!
//! ## `install_binary`
//!
//! 1. Existing target → ask before overwriting; decline skips.
//! 2. Copy to `<target>.devbox.tmp` and set the executable bits.
//! 3. Rename over the final path so a running binary is never truncated.

use std::fs;
use std::path::{Path, PathBuf};

use devbox_core::Prompt;

use crate::error::{io_err, InstallError};

/// Outcome of a single binary installation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkResult {
    Installed(PathBuf),
    /// Target existed and the operator declined to overwrite it.
    Skipped(PathBuf),
}

/// Executable regular files directly inside `dir`, sorted by name.
pub fn discover_executables(dir: &Path) -> Result<Vec<PathBuf>, InstallError> {
    let entries = fs::read_dir(dir).map_err(|e| io_err(dir, e))?;
    let mut found = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| io_err(dir, e))?;
        let path = entry.path();
        let meta = fs::metadata(&path).map_err(|e| io_err(&path, e))?;
        if meta.is_file() && is_executable(&meta) {
            found.push(path);
        }
    }
    found.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(found)
}

#[cfg(unix)]
fn is_executable(meta: &fs::Metadata) -> bool {
    use std::os::unix::fs::PermissionsExt;
    meta.permissions().mode() & 0o111 != 0
}

#[cfg(not(unix))]
fn is_executable(_meta: &fs::Metadata) -> bool {
    true
}

/// Copy `source` into `target_dir` under the same file name.
pub fn install_binary<P>(source: &Path, target_dir: &Path, prompt: &P) -> Result<LinkResult, InstallError>
where
    P: Prompt + ?Sized,
{
    let name = source
        .file_name()
        .ok_or_else(|| io_err(source, std::io::ErrorKind::InvalidInput.into()))?;
    let target = target_dir.join(name);

    if target.exists() {
        let question = format!("{} already exists. Overwrite?", target.display());
        if !prompt.confirm(&question)? {
            tracing::info!("kept existing {}", target.display());
            return Ok(LinkResult::Skipped(target));
        }
    }

    fs::create_dir_all(target_dir).map_err(|e| io_err(target_dir, e))?;
    let tmp = PathBuf::from(format!("{}.devbox.tmp", target.display()));
    fs::copy(source, &tmp).map_err(|e| io_err(&tmp, e))?;
    if let Err(e) = make_executable(&tmp) {
        let _ = fs::remove_file(&tmp);
        return Err(e);
    }
    if let Err(e) = fs::rename(&tmp, &target) {
        let _ = fs::remove_file(&tmp);
        return Err(io_err(&target, e));
    }

    tracing::info!("installed {} -> {}", source.display(), target.display());
    Ok(LinkResult::Installed(target))
}

#[cfg(unix)]
fn make_executable(path: &Path) -> Result<(), InstallError> {
    use std::os::unix::fs::PermissionsExt;
    let mut perms = fs::metadata(path).map_err(|e| io_err(path, e))?.permissions();
    perms.set_mode(perms.mode() | 0o755);
    fs::set_permissions(path, perms).map_err(|e| io_err(path, e))
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> Result<(), InstallError> {
    Ok(())
}
