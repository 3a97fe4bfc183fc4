//! `devbox-brew`: pick Homebrew packages from a numbered menu and install
//! the ones that are missing.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use tabled::{settings::Style, Table, Tabled};

use devbox_core::{ExitCode, ProcessRunner, Prompt};
use devbox_install::{
    parse_selection, Brew, Catalog, InstallError, InstallReport, Installed, Selection,
};

use crate::output;

/// Catalog picked up from the working directory when `--catalog` is absent.
pub const CATALOG_FILE_NAME: &str = "packages.yaml";

/// Arguments for `devbox-brew`.
#[derive(Parser, Debug)]
#[command(
    name = "devbox-brew",
    version,
    about = "Install development packages with Homebrew",
    long_about = None,
)]
pub struct BrewArgs {
    /// Select every package in the catalog instead of showing the menu prompt.
    #[arg(long)]
    pub all: bool,

    /// Install the selection without a final confirmation.
    #[arg(short = 'y', long)]
    pub yes: bool,

    /// YAML list of `{name, description, cask}`. Defaults to ./packages.yaml,
    /// then the built-in catalog.
    #[arg(long, value_name = "PATH")]
    pub catalog: Option<PathBuf>,

    /// Raise log verbosity (-v info, -vv debug).
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Tabled)]
struct MenuRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "package")]
    name: String,
    #[tabled(rename = "kind")]
    kind: &'static str,
    #[tabled(rename = "installed")]
    installed: &'static str,
    #[tabled(rename = "description")]
    description: String,
}

impl BrewArgs {
    pub fn run<R, P>(&self, runner: R, prompt: &P) -> Result<ExitCode>
    where
        R: ProcessRunner,
        P: Prompt + ?Sized,
    {
        let brew = Brew::new(runner);
        match brew.check() {
            Ok(version) => tracing::info!("using {version}"),
            Err(err @ InstallError::BrewUnavailable(_)) => {
                output::error(err);
                eprintln!("Install Homebrew from https://brew.sh, then run devbox-brew again.");
                return Ok(ExitCode::FAILURE);
            }
            Err(err) => return Err(err.into()),
        }

        let catalog = self.load_catalog()?;
        if catalog.is_empty() {
            println!("The package catalog is empty.");
            return Ok(ExitCode::SUCCESS);
        }
        let installed = brew
            .installed()
            .context("failed to list installed packages")?;
        print_menu(&catalog, &installed);

        let selection = if self.all {
            Selection::all(catalog.len())
        } else {
            let answer = prompt
                .ask("Packages to install (e.g. 1 3 5-7, or all):")
                .context("failed to read the selection")?;
            parse_selection(&answer, catalog.len())
        };
        for warning in &selection.warnings {
            output::warning(warning);
        }
        if selection.is_empty() {
            println!("Nothing selected.");
            return Ok(ExitCode::SUCCESS);
        }

        let picked = selection.pick(&catalog.packages);
        let names: Vec<&str> = picked.iter().map(|p| p.name.as_str()).collect();
        if !self.yes {
            let question = format!("Install {}?", names.join(", "));
            if !prompt
                .confirm(&question)
                .context("failed to ask for confirmation")?
            {
                println!("Nothing installed.");
                return Ok(ExitCode::SUCCESS);
            }
        }

        let report = brew
            .install_all(&picked, &installed)
            .context("failed to run brew install")?;
        print_report(&report);
        Ok(report.exit_code())
    }

    fn load_catalog(&self) -> Result<Catalog> {
        let path = match &self.catalog {
            Some(path) => Some(path.clone()),
            None => {
                let local = PathBuf::from(CATALOG_FILE_NAME);
                local.exists().then_some(local)
            }
        };
        Catalog::load_or_builtin(path.as_deref()).context("failed to load the package catalog")
    }
}

fn print_menu(catalog: &Catalog, installed: &Installed) {
    let rows: Vec<MenuRow> = catalog
        .packages
        .iter()
        .enumerate()
        .map(|(i, package)| MenuRow {
            index: i + 1,
            name: package.name.clone(),
            kind: if package.cask { "cask" } else { "formula" },
            installed: if installed.contains(package) { "yes" } else { "" },
            description: package.description.clone(),
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
}

fn print_report(report: &InstallReport) {
    for name in &report.installed {
        output::success(format!("installed {name}"));
    }
    for name in &report.skipped {
        println!("- {name} already installed");
    }
    for (name, code) in &report.failed {
        output::failure(format!("brew install {name} exited with {code}"));
    }
    if !report.failed.is_empty() {
        let names: Vec<&str> = report.failed.iter().map(|(n, _)| n.as_str()).collect();
        output::failure(format!("failed: {}", names.join(", ")));
    }
}

#[cfg(test)]
mod tests {
    use devbox_core::testing::FakeRunner;
    use devbox_core::ScriptedPrompt;

    use super::*;

    /// Everything succeeds; `brew list --formula` reports cmake as present.
    fn brew_with_cmake() -> FakeRunner {
        FakeRunner::new().respond("list --formula", "cmake\n")
    }

    fn args(all: bool, yes: bool) -> BrewArgs {
        BrewArgs {
            all,
            yes,
            catalog: None,
            verbose: 0,
        }
    }

    fn installs(runner: &FakeRunner) -> Vec<String> {
        runner
            .command_lines()
            .into_iter()
            .filter(|l| l.starts_with("brew install"))
            .collect()
    }

    #[test]
    fn menu_selection_installs_missing_packages_only() {
        let runner = brew_with_cmake();
        // 2 = cmake (installed), 3 = ninja; 99 is skipped with a warning.
        let prompt = ScriptedPrompt::new(["2-3 99", "y"]);
        let code = args(false, false).run(&runner, &prompt).unwrap();

        assert_eq!(code, ExitCode::SUCCESS);
        assert_eq!(installs(&runner), vec!["brew install ninja"]);
    }

    #[test]
    fn declining_confirmation_installs_nothing() {
        let runner = brew_with_cmake();
        let prompt = ScriptedPrompt::new(["1", "n"]);
        let code = args(false, false).run(&runner, &prompt).unwrap();
        assert_eq!(code, ExitCode::SUCCESS);
        assert!(installs(&runner).is_empty());
    }

    #[test]
    fn empty_selection_is_success() {
        let runner = brew_with_cmake();
        let code = args(false, false)
            .run(&runner, &ScriptedPrompt::new(["nope"]))
            .unwrap();
        assert_eq!(code, ExitCode::SUCCESS);
        assert!(installs(&runner).is_empty());
    }

    #[test]
    fn all_with_yes_needs_no_answers() {
        let runner = brew_with_cmake();
        let prompt = ScriptedPrompt::default();
        let code = args(true, true).run(&runner, &prompt).unwrap();

        assert_eq!(code, ExitCode::SUCCESS);
        assert!(prompt.asked().is_empty());
        let installs = installs(&runner);
        assert!(!installs.contains(&"brew install cmake".to_string()));
        assert!(installs.contains(&"brew install --cask visual-studio-code".to_string()));
    }
}
