//! Homebrew package catalog and installation.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use devbox_core::{ExitCode, Invocation, OutputMode, ProcessError, ProcessRunner};

use crate::error::{io_err, InstallError};

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// One installable package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Install with `--cask`.
    #[serde(default)]
    pub cask: bool,
}

impl Package {
    fn new(name: &str, description: &str, cask: bool) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            cask,
        }
    }
}

/// Ordered package menu. The YAML form is a plain list of packages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    pub packages: Vec<Package>,
}

impl Catalog {
    /// Tools for cross-architecture embedded development on a macOS host.
    pub fn builtin() -> Self {
        Self {
            packages: vec![
                Package::new("git", "Distributed version control", false),
                Package::new("cmake", "Cross-platform build system generator", false),
                Package::new("ninja", "Small build system focused on speed", false),
                Package::new("llvm", "Clang, LLD and the LLVM toolchain", false),
                Package::new("arm-none-eabi-gcc", "GCC for bare-metal ARM targets", false),
                Package::new("qemu", "Machine emulator for foreign architectures", false),
                Package::new("colima", "Container runtime for macOS", false),
                Package::new("docker", "Docker CLI", false),
                Package::new("docker-compose", "Multi-container orchestration", false),
                Package::new("visual-studio-code", "Code editor", true),
            ],
        }
    }

    pub fn load(path: &Path) -> Result<Self, InstallError> {
        let text = fs::read_to_string(path).map_err(|e| io_err(path, e))?;
        serde_yaml::from_str(&text).map_err(|source| InstallError::Catalog {
            path: path.to_path_buf(),
            source,
        })
    }

    /// `path` when given, otherwise the built-in catalog.
    pub fn load_or_builtin(path: Option<&Path>) -> Result<Self, InstallError> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::builtin()),
        }
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Installed set
// ---------------------------------------------------------------------------

/// Formulae and casks already present on the host.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Installed {
    pub formulae: BTreeSet<String>,
    pub casks: BTreeSet<String>,
}

impl Installed {
    pub fn contains(&self, package: &Package) -> bool {
        if package.cask {
            self.casks.contains(&package.name)
        } else {
            self.formulae.contains(&package.name)
        }
    }
}

// ---------------------------------------------------------------------------
// Brew
// ---------------------------------------------------------------------------

/// Result of installing a selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallReport {
    pub installed: Vec<String>,
    /// Already present; not reinstalled.
    pub skipped: Vec<String>,
    /// Name and `brew install` exit code.
    pub failed: Vec<(String, ExitCode)>,
}

impl InstallReport {
    pub fn exit_code(&self) -> ExitCode {
        if self.failed.is_empty() {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        }
    }
}

/// The `brew` CLI, driven through a [`ProcessRunner`].
pub struct Brew<R> {
    runner: R,
    program: String,
}

impl<R: ProcessRunner> Brew<R> {
    pub fn new(runner: R) -> Self {
        Self {
            runner,
            program: "brew".to_string(),
        }
    }

    /// Confirm brew runs; returns its version line.
    pub fn check(&self) -> Result<String, InstallError> {
        let inv = Invocation::new(&self.program).arg("--version");
        let output = match self.runner.run(&inv, OutputMode::Capture) {
            Ok(output) => output,
            Err(ProcessError::NotFound { program }) => {
                return Err(InstallError::BrewUnavailable(format!("`{program}` not found on PATH")))
            }
            Err(e) => return Err(e.into()),
        };
        if !output.success() {
            return Err(InstallError::BrewUnavailable(output.failure_message()));
        }
        Ok(output.stdout.lines().next().unwrap_or_default().trim().to_string())
    }

    pub fn installed(&self) -> Result<Installed, InstallError> {
        Ok(Installed {
            formulae: self.list("--formula")?,
            casks: self.list("--cask")?,
        })
    }

    fn list(&self, kind: &str) -> Result<BTreeSet<String>, InstallError> {
        let inv = Invocation::new(&self.program).args(["list", kind, "-1"]);
        let output = self.runner.run(&inv, OutputMode::Capture)?;
        if !output.success() {
            return Err(InstallError::Brew {
                command: inv.command_line(),
                message: output.failure_message(),
            });
        }
        Ok(output
            .stdout
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect())
    }

    /// `brew install [--cask] <name>` with live output.
    pub fn install(&self, package: &Package) -> Result<ExitCode, InstallError> {
        let mut inv = Invocation::new(&self.program).arg("install");
        if package.cask {
            inv = inv.arg("--cask");
        }
        let inv = inv.arg(&package.name);
        tracing::info!("running: {inv}");
        let output = self.runner.run(&inv, OutputMode::Stream)?;
        Ok(ExitCode(output.status_code))
    }

    /// Install every package not already in `installed`. Failures are
    /// collected; the remaining packages are still attempted.
    pub fn install_all(
        &self,
        packages: &[&Package],
        installed: &Installed,
    ) -> Result<InstallReport, InstallError> {
        let mut report = InstallReport::default();
        for package in packages {
            if installed.contains(package) {
                tracing::info!("{} already installed", package.name);
                report.skipped.push(package.name.clone());
                continue;
            }
            let code = self.install(package)?;
            if code.is_success() {
                report.installed.push(package.name.clone());
            } else {
                tracing::warn!("brew install {} exited with {code}", package.name);
                report.failed.push((package.name.clone(), code));
            }
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use devbox_core::testing::FakeRunner;

    use super::*;

    #[test]
    fn check_reports_version_line() {
        let runner = FakeRunner::new().respond("--version", "Homebrew 4.3.1\nHomebrew/homebrew-core\n");
        assert_eq!(Brew::new(&runner).check().unwrap(), "Homebrew 4.3.1");
    }

    #[test]
    fn check_fails_when_brew_errors() {
        let runner = FakeRunner::new().respond_status("--version", 127);
        assert!(matches!(
            Brew::new(&runner).check(),
            Err(InstallError::BrewUnavailable(_))
        ));
    }

    #[test]
    fn installed_set_splits_formulae_and_casks() {
        let runner = FakeRunner::new()
            .respond("list --formula", "cmake\nninja\n")
            .respond("list --cask", "visual-studio-code\n");
        let installed = Brew::new(&runner).installed().unwrap();
        assert!(installed.contains(&Package::new("cmake", "", false)));
        assert!(!installed.contains(&Package::new("cmake", "", true)));
        assert!(installed.contains(&Package::new("visual-studio-code", "", true)));
    }

    #[test]
    fn install_all_skips_present_and_collects_failures() {
        let runner = FakeRunner::new().respond_status("install qemu", 1);
        let brew = Brew::new(&runner);
        let catalog = Catalog::builtin();
        let wanted: Vec<&Package> = catalog
            .packages
            .iter()
            .filter(|p| ["cmake", "qemu", "visual-studio-code"].contains(&p.name.as_str()))
            .collect();
        let installed = Installed {
            formulae: BTreeSet::from(["cmake".to_string()]),
            ..Installed::default()
        };

        let report = brew.install_all(&wanted, &installed).unwrap();

        assert_eq!(report.skipped, vec!["cmake"]);
        assert_eq!(report.installed, vec!["visual-studio-code"]);
        assert_eq!(report.failed, vec![("qemu".to_string(), ExitCode(1))]);
        assert_eq!(report.exit_code(), ExitCode::FAILURE);
        assert_eq!(
            runner.command_lines(),
            vec!["brew install qemu", "brew install --cask visual-studio-code"]
        );
    }
}
