//! Command Dispatcher.
//!
//! Maps one verb plus its positional arguments to exactly one action:
//!
//! 1. Parse `<verb> [args]` with clap; unknown verbs, bad arity and bad
//!    sanitizer names print usage and exit 1 before anything external runs.
//! 2. Gated verbs query the container (and the workspace `.git`) and stop
//!    with exit 1 when the precondition does not hold.
//! 3. Run the action and return its exit code.

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser, Subcommand};

use devbox_container::DevContainer;
use devbox_core::{DevboxConfig, ExitCode, ProcessRunner, Prompt};

use crate::commands;
use crate::commands::build::{SanitizerArgs, ValgrindArgs};
use crate::commands::status::StatusArgs;
use crate::output;

// ---------------------------------------------------------------------------
// Verbs
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "devbox",
    override_usage = "devbox [--config <PATH>] [-v...] [-y] <COMMAND> [ARGS]...",
    disable_help_subcommand = true,
    disable_version_flag = true
)]
struct VerbLine {
    #[command(subcommand)]
    verb: Verb,
}

/// The closed set of dispatcher verbs.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Verb {
    /// Create (if needed) and start the development container.
    Start,
    /// Stop the development container.
    Stop,
    /// Stop, then start the development container.
    Restart,
    /// Open an interactive shell in the workspace.
    Shell,
    /// Clone the source repository into the workspace.
    Init,
    /// Fetch and merge the source repository into the workspace.
    Sync,
    /// Show container and workspace status.
    Status(StatusArgs),
    /// Remove the container, its volumes and its image.
    Clean,
    /// Build and run tests under valgrind.
    Valgrind(ValgrindArgs),
    /// Build and run tests with a sanitizer.
    Sanitizer(SanitizerArgs),
    /// Show this help.
    Help,
}

/// What must hold before a verb may run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precondition {
    None,
    /// Container must be running.
    Running,
    /// Container must be running and the workspace must hold a working copy.
    RunningInitialized,
    /// Operator must confirm interactively.
    Confirmation,
}

impl Verb {
    /// Parse `verb` and its arguments.
    pub fn parse(verb: &str, args: &[String]) -> Result<Self, clap::Error> {
        let argv = ["devbox", verb]
            .into_iter()
            .chain(args.iter().map(String::as_str));
        VerbLine::try_parse_from(argv).map(|line| line.verb)
    }

    pub fn precondition(&self) -> Precondition {
        match self {
            Verb::Start | Verb::Stop | Verb::Restart | Verb::Status(_) | Verb::Help => {
                Precondition::None
            }
            Verb::Shell | Verb::Init => Precondition::Running,
            Verb::Sync | Verb::Valgrind(_) | Verb::Sanitizer(_) => {
                Precondition::RunningInitialized
            }
            Verb::Clean => Precondition::Confirmation,
        }
    }
}

/// Usage text listing every verb.
pub fn usage() -> String {
    VerbLine::command().render_help().to_string()
}

// ---------------------------------------------------------------------------
// Dispatcher
// ---------------------------------------------------------------------------

/// Routes verbs to commands for one loaded configuration.
pub struct Dispatcher<'a, R, P: ?Sized> {
    config: &'a DevboxConfig,
    runner: R,
    prompt: &'a P,
}

impl<'a, R, P> Dispatcher<'a, R, P>
where
    R: ProcessRunner,
    P: Prompt + ?Sized,
{
    pub fn new(config: &'a DevboxConfig, runner: R, prompt: &'a P) -> Self {
        Self {
            config,
            runner,
            prompt,
        }
    }

    /// Run `verb` with `args`. Errors from external tools are printed and
    /// become exit code 1.
    pub fn dispatch(&self, verb: &str, args: &[String]) -> ExitCode {
        let verb = match Verb::parse(verb, args) {
            Ok(verb) => verb,
            Err(err) => return parse_failure(&err),
        };
        match self.run(verb) {
            Ok(code) => code,
            Err(err) => {
                output::error(format!("{err:#}"));
                ExitCode::FAILURE
            }
        }
    }

    fn run(&self, verb: Verb) -> Result<ExitCode> {
        tracing::debug!(?verb, "dispatching");
        let container = DevContainer::new(self.config, &self.runner);
        let precondition = verb.precondition();

        match verb {
            Verb::Help => {
                println!("{}", usage());
                Ok(ExitCode::SUCCESS)
            }
            Verb::Start => commands::lifecycle::start(&container),
            Verb::Stop => commands::lifecycle::stop(&container),
            Verb::Restart => commands::lifecycle::restart(&container),
            Verb::Status(args) => commands::status::run(&container, &args),
            Verb::Clean => commands::clean::run(&container, self.prompt),
            Verb::Shell => gated(&container, precondition, || {
                commands::shell::run(&container)
            }),
            Verb::Init => gated(&container, precondition, || {
                commands::init::run(&container, self.prompt)
            }),
            Verb::Sync => gated(&container, precondition, || {
                commands::sync::run(&container, self.prompt)
            }),
            Verb::Valgrind(args) => gated(&container, precondition, || {
                commands::build::valgrind(&container, &args)
            }),
            Verb::Sanitizer(args) => gated(&container, precondition, || {
                commands::build::sanitizer(&container, &args)
            }),
        }
    }
}

/// Run `action` only when `precondition` holds; otherwise the reason is
/// printed and the run exits 1.
fn gated<R, F>(
    container: &DevContainer<'_, R>,
    precondition: Precondition,
    action: F,
) -> Result<ExitCode>
where
    R: ProcessRunner,
    F: FnOnce() -> Result<ExitCode>,
{
    let needs_init = match precondition {
        Precondition::None | Precondition::Confirmation => return action(),
        Precondition::Running => false,
        Precondition::RunningInitialized => true,
    };

    let state = container
        .state()
        .context("failed to query container state")?;
    if !state.is_running() {
        output::error(format!(
            "container '{}' is {state}; run `devbox start` first",
            container.name()
        ));
        return Ok(ExitCode::FAILURE);
    }

    if needs_init
        && !container
            .is_initialized()
            .context("failed to inspect the workspace")?
    {
        output::error(format!(
            "workspace {} is not initialized; run `devbox init` first",
            container.config().workspace.display()
        ));
        return Ok(ExitCode::FAILURE);
    }
    action()
}

/// `--help` on a verb prints to stdout and succeeds; every other parse
/// error goes to stderr with the usage line and exits 1.
fn parse_failure(err: &clap::Error) -> ExitCode {
    match err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
            print!("{err}");
            ExitCode::SUCCESS
        }
        _ => {
            eprint!("{err}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use devbox_core::SanitizerTool;

    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|a| a.to_string()).collect()
    }

    #[test]
    fn usage_lists_every_verb() {
        let text = usage();
        for verb in [
            "start", "stop", "restart", "shell", "init", "sync", "status", "clean", "valgrind",
            "sanitizer", "help",
        ] {
            assert!(text.contains(verb), "missing {verb}");
        }
        assert!(text.contains("Usage: devbox [--config <PATH>]"));
    }

    #[test]
    fn verbs_parse_with_their_arguments() {
        assert_eq!(Verb::parse("start", &[]).unwrap(), Verb::Start);
        assert_eq!(
            Verb::parse("status", &args(&["--json"])).unwrap(),
            Verb::Status(StatusArgs { json: true })
        );
        assert_eq!(
            Verb::parse("sanitizer", &args(&["ubsan", "smoke"])).unwrap(),
            Verb::Sanitizer(SanitizerArgs {
                tool: SanitizerTool::Ubsan,
                test_target: Some("smoke".into()),
            })
        );
        assert_eq!(
            Verb::parse("valgrind", &args(&["net_tests", "[fast]"])).unwrap(),
            Verb::Valgrind(ValgrindArgs {
                test_target: Some("net_tests".into()),
                test_tags: Some("[fast]".into()),
            })
        );
    }

    #[test]
    fn parse_errors_name_the_offending_input() {
        let unknown = Verb::parse("deploy", &[]).unwrap_err();
        assert_eq!(unknown.kind(), ErrorKind::InvalidSubcommand);
        assert!(unknown.to_string().contains("deploy"));

        let tool = Verb::parse("sanitizer", &args(&["msan"])).unwrap_err();
        assert_eq!(tool.kind(), ErrorKind::InvalidValue);
        assert!(tool.to_string().contains("msan"));

        let missing = Verb::parse("sanitizer", &[]).unwrap_err();
        assert_eq!(missing.kind(), ErrorKind::MissingRequiredArgument);

        let extra = Verb::parse("start", &args(&["now"])).unwrap_err();
        assert_eq!(extra.kind(), ErrorKind::UnknownArgument);

        let flag = Verb::parse("status", &args(&["--yaml"])).unwrap_err();
        assert_eq!(flag.kind(), ErrorKind::UnknownArgument);
    }

    #[test]
    fn verb_help_flag_is_not_a_failure() {
        let err = Verb::parse("status", &args(&["--help"])).unwrap_err();
        assert_eq!(parse_failure(&err), ExitCode::SUCCESS);
    }

    #[test]
    fn only_gated_verbs_need_a_running_container() {
        assert_eq!(Verb::Start.precondition(), Precondition::None);
        assert_eq!(Verb::Shell.precondition(), Precondition::Running);
        assert_eq!(Verb::Sync.precondition(), Precondition::RunningInitialized);
        assert_eq!(Verb::Clean.precondition(), Precondition::Confirmation);
    }
}
