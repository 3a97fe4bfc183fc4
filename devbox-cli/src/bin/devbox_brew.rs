//! devbox-brew: choose and install development packages with Homebrew.

use std::process::ExitCode;

use clap::Parser;

use devbox_cli::commands::brew::BrewArgs;
use devbox_cli::{init_tracing, output};
use devbox_core::{SystemRunner, TerminalPrompt};

fn main() -> ExitCode {
    let args = BrewArgs::parse();
    init_tracing(args.verbose);
    match args.run(SystemRunner, &TerminalPrompt) {
        Ok(code) => code.into(),
        Err(err) => {
            output::error(format!("{err:#}"));
            ExitCode::FAILURE
        }
    }
}
