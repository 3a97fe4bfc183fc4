//! devbox: manage the cross-architecture development container.
//!
//! # Usage
//!
//! ```text
//! devbox [--config <path>] [-v...] [-y] <command> [args]
//!
//! devbox start | stop | restart
//! devbox shell
//! devbox init
//! devbox sync
//! devbox status [--json]
//! devbox clean
//! devbox valgrind [test-target] [test-tags]
//! devbox sanitizer <asan|tsan|ubsan> [test-target]
//! devbox help
//! ```

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};

use devbox_cli::{dispatch, init_tracing, output, Dispatcher};
use devbox_core::{AssumeYes, DevboxConfig, Prompt, SystemRunner, TerminalPrompt};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "devbox",
    version,
    about = "Manage the Docker-based development container",
    long_about = None,
)]
struct Cli {
    /// Configuration file. Defaults to ./devbox.yaml when present.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Raise log verbosity (-v info, -vv debug).
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Answer yes to confirmations.
    #[arg(short = 'y', long)]
    yes: bool,

    /// Command to run; `devbox help` lists them.
    verb: Option<String>,

    /// Arguments for the command.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    args: Vec<String>,
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match run(cli) {
        Ok(code) => code.into(),
        Err(err) => {
            output::error(format!("{err:#}"));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<devbox_core::ExitCode> {
    let Some(verb) = cli.verb else {
        eprintln!("{}", dispatch::usage());
        return Ok(devbox_core::ExitCode::FAILURE);
    };

    let config = load_config(cli.config.as_deref())?;
    let prompt: Box<dyn Prompt> = if cli.yes {
        Box::new(AssumeYes)
    } else {
        Box::new(TerminalPrompt)
    };

    let dispatcher = Dispatcher::new(&config, SystemRunner, prompt.as_ref());
    Ok(dispatcher.dispatch(&verb, &cli.args))
}

fn load_config(explicit: Option<&Path>) -> Result<DevboxConfig> {
    let config = match explicit {
        Some(path) => DevboxConfig::load_at(path)
            .with_context(|| format!("failed to load config '{}'", path.display()))?,
        None => {
            let cwd = std::env::current_dir().context("cannot resolve current directory")?;
            DevboxConfig::load_or_default(&cwd).context("failed to load devbox.yaml")?
        }
    };
    let config = config.with_env_overrides(|key| std::env::var(key).ok());
    config.validate().context("invalid configuration")?;
    tracing::debug!(container = %config.container_name, "configuration loaded");
    Ok(config)
}
