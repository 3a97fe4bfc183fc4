//! `devbox-link`: copy locally built executables into a user bin
//! directory and put that directory on the shell's PATH.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use tabled::{settings::Style, Table, Tabled};

use devbox_core::{AssumeYes, ExitCode, Prompt};
use devbox_install::{
    dir_on_path, discover_executables, install_binary, parse_selection, InstallError,
    LinkResult, ProfileUpdate, Selection, ShellProfile,
};

use crate::output;

/// Arguments for `devbox-link`.
#[derive(Parser, Debug)]
#[command(
    name = "devbox-link",
    version,
    about = "Install locally built binaries into ~/.local/bin",
    long_about = None,
)]
pub struct LinkArgs {
    /// Directory holding the built executables.
    #[arg(long, value_name = "DIR", default_value = "bin")]
    pub source: PathBuf,

    /// Install directory. Defaults to ~/.local/bin.
    #[arg(long, value_name = "DIR")]
    pub target: Option<PathBuf>,

    /// Shell whose startup file receives the PATH entry. Defaults to $SHELL.
    #[arg(long)]
    pub shell: Option<String>,

    /// Install every discovered executable without the menu prompt.
    #[arg(long)]
    pub all: bool,

    /// Overwrite existing binaries without asking.
    #[arg(short = 'y', long)]
    pub yes: bool,

    /// Raise log verbosity (-v info, -vv debug).
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Tabled)]
struct MenuRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "binary")]
    name: String,
}

impl LinkArgs {
    pub fn run<P: Prompt + ?Sized>(&self, prompt: &P) -> Result<ExitCode> {
        let home = dirs::home_dir().context("could not determine home directory")?;
        let target = self
            .target
            .clone()
            .unwrap_or_else(|| home.join(".local").join("bin"));

        let found = discover_executables(&self.source)
            .with_context(|| format!("failed to scan {}", self.source.display()))?;
        if found.is_empty() {
            println!("No executables found in {}.", self.source.display());
            return Ok(ExitCode::SUCCESS);
        }
        print_menu(&found);

        let selection = if self.all {
            Selection::all(found.len())
        } else {
            let answer = prompt
                .ask("Binaries to install (e.g. 1 3 5-7, or all):")
                .context("failed to read the selection")?;
            parse_selection(&answer, found.len())
        };
        for warning in &selection.warnings {
            output::warning(warning);
        }
        if selection.is_empty() {
            println!("Nothing selected.");
            return Ok(ExitCode::SUCCESS);
        }

        let mut failed = 0usize;
        for source in selection.pick(&found) {
            let result = if self.yes {
                install_binary(source, &target, &AssumeYes)
            } else {
                install_binary(source, &target, prompt)
            };
            match result {
                Ok(LinkResult::Installed(path)) => {
                    output::success(format!("installed {}", path.display()))
                }
                Ok(LinkResult::Skipped(path)) => {
                    println!("- kept existing {}", path.display())
                }
                Err(err) => {
                    output::failure(err.to_string());
                    failed += 1;
                }
            }
        }

        let path_code = self.ensure_on_path(&home, &target)?;
        if failed > 0 {
            return Ok(ExitCode::FAILURE);
        }
        Ok(path_code)
    }

    fn ensure_on_path(&self, home: &Path, target: &Path) -> Result<ExitCode> {
        let path_var = std::env::var_os("PATH").unwrap_or_default();
        if dir_on_path(target, &path_var) {
            return Ok(ExitCode::SUCCESS);
        }

        let shell = self
            .shell
            .clone()
            .or_else(|| std::env::var("SHELL").ok())
            .unwrap_or_default();
        let profile = match ShellProfile::from_shell(&shell) {
            Ok(profile) => profile,
            Err(err @ InstallError::UnsupportedShell(_)) => {
                output::error(err);
                eprintln!("Add {} to PATH in your shell's startup file.", target.display());
                return Ok(ExitCode::FAILURE);
            }
            Err(err) => return Err(err.into()),
        };

        let update = profile
            .ensure_on_path(home, target)
            .with_context(|| format!("failed to update the {} startup file", profile.name()))?;
        match update {
            ProfileUpdate::Appended(rc) => output::success(format!(
                "added {} to PATH in {}; open a new shell or run `source {}`",
                target.display(),
                rc.display(),
                rc.display()
            )),
            ProfileUpdate::AlreadyPresent(rc) => println!(
                "{} already puts {} on PATH; open a new shell to pick it up",
                rc.display(),
                target.display()
            ),
        }
        Ok(ExitCode::SUCCESS)
    }
}

fn print_menu(found: &[PathBuf]) {
    let rows: Vec<MenuRow> = found
        .iter()
        .enumerate()
        .map(|(i, path)| MenuRow {
            index: i + 1,
            name: path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
}
