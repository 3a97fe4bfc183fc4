//! devbox-link: install locally built binaries and patch PATH.

use std::process::ExitCode;

use clap::Parser;

use devbox_cli::commands::link::LinkArgs;
use devbox_cli::{init_tracing, output};
use devbox_core::TerminalPrompt;

fn main() -> ExitCode {
    let args = LinkArgs::parse();
    init_tracing(args.verbose);
    match args.run(&TerminalPrompt) {
        Ok(code) => code.into(),
        Err(err) => {
            output::error(format!("{err:#}"));
            ExitCode::FAILURE
        }
    }
}
