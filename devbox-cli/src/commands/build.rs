//! `devbox valgrind` and `devbox sanitizer`.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use devbox_container::{BuildPlan, DevContainer};
use devbox_core::{ExitCode, ProcessRunner, SanitizerTool};

use crate::output;

/// Arguments for `devbox valgrind`.
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct ValgrindArgs {
    /// Test binary in the build directory. Defaults to `build.test_target`.
    pub test_target: Option<String>,

    /// Tag filter passed to the test binary, e.g. `[fast]`.
    #[arg(allow_hyphen_values = true)]
    pub test_tags: Option<String>,
}

/// Arguments for `devbox sanitizer`.
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct SanitizerArgs {
    /// Instrumentation to build with.
    #[arg(value_enum)]
    pub tool: SanitizerTool,

    /// Test binary in the build directory. Defaults to `build.test_target`.
    pub test_target: Option<String>,
}

pub fn valgrind<R: ProcessRunner>(
    container: &DevContainer<'_, R>,
    args: &ValgrindArgs,
) -> Result<ExitCode> {
    let plan = BuildPlan::valgrind(
        container.config(),
        args.test_target.as_deref(),
        args.test_tags.as_deref(),
    )
    .context("failed to render the valgrind build commands")?;
    execute(container, &plan)
}

pub fn sanitizer<R: ProcessRunner>(
    container: &DevContainer<'_, R>,
    args: &SanitizerArgs,
) -> Result<ExitCode> {
    let tool = args.tool;
    let plan = BuildPlan::sanitizer(container.config(), tool, args.test_target.as_deref())
        .with_context(|| format!("failed to render the {tool} build commands"))?;
    execute(container, &plan)
}

fn execute<R: ProcessRunner>(container: &DevContainer<'_, R>, plan: &BuildPlan) -> Result<ExitCode> {
    println!(
        "{} build in {}",
        plan.label.bold(),
        plan.build_dir.display()
    );
    let report = container
        .run_in_container(plan)
        .with_context(|| format!("{} run could not be executed", plan.label))?;

    if let Some(log) = &report.sanitizer_log {
        eprintln!("{}", log.trim_end());
    }

    match report.failed_step {
        _ if report.exit.is_success() => output::success(format!("{} run passed", plan.label)),
        Some(step) => output::failure(format!(
            "{}: {step} step exited with {}",
            plan.label, report.exit
        )),
        None => {
            let log = plan
                .log_file
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default();
            output::failure(format!("{}: sanitizer reported errors in {log}", plan.label));
        }
    }
    Ok(report.exit)
}
