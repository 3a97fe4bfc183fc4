//! `devbox status [--json]`: container state and, when running, the
//! workspace branch and HEAD.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use devbox_container::DevContainer;
use devbox_core::{ContainerState, ExitCode, ProcessRunner};
use devbox_sync::{Git, GitCli};

/// Arguments for `devbox status`.
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct StatusArgs {
    /// Print the status as JSON instead of a table.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct StatusReport {
    container: String,
    state: String,
    running: bool,
    workspace: String,
    /// Only known while the container runs.
    initialized: Option<bool>,
    branch: Option<String>,
    head: Option<String>,
}

#[derive(Tabled)]
struct StatusTableRow {
    #[tabled(rename = "item")]
    key: &'static str,
    #[tabled(rename = "value")]
    value: String,
}

pub fn run<R: ProcessRunner>(container: &DevContainer<'_, R>, args: &StatusArgs) -> Result<ExitCode> {
    let state = container
        .state()
        .context("failed to query container state")?;
    let report = build_report(container, state)?;

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("failed to serialize status JSON")?
        );
    } else {
        print_table(state, report);
    }
    Ok(ExitCode::SUCCESS)
}

fn build_report<R: ProcessRunner>(
    container: &DevContainer<'_, R>,
    state: ContainerState,
) -> Result<StatusReport> {
    let config = container.config();
    let mut report = StatusReport {
        container: container.name().to_string(),
        state: state.to_string(),
        running: state.is_running(),
        workspace: config.workspace.display().to_string(),
        initialized: None,
        branch: None,
        head: None,
    };
    if !state.is_running() {
        return Ok(report);
    }

    let initialized = container
        .is_initialized()
        .context("failed to inspect the workspace")?;
    report.initialized = Some(initialized);
    if initialized {
        let git = GitCli::new(container.runner(), container.launcher());
        report.branch = Some(
            git.current_branch(&config.workspace)
                .context("failed to read the current branch")?,
        );
        report.head = Some(
            git.head_summary(&config.workspace)
                .context("failed to read the workspace HEAD")?,
        );
    }
    Ok(report)
}

fn print_table(state: ContainerState, report: StatusReport) {
    let marker = match state {
        ContainerState::Running => "●".green().bold(),
        ContainerState::Stopped => "●".yellow().bold(),
        ContainerState::NotCreated => "●".red().bold(),
    };
    println!("{marker} {} ({})", report.container.bold(), report.state);

    let mut rows = vec![StatusTableRow {
        key: "workspace",
        value: report.workspace,
    }];
    match (report.initialized, report.branch, report.head) {
        (None, ..) => rows.push(StatusTableRow {
            key: "repository",
            value: "unknown (container not running)".to_string(),
        }),
        (Some(false), ..) => rows.push(StatusTableRow {
            key: "repository",
            value: "not initialized".to_string(),
        }),
        (Some(true), branch, head) => {
            rows.push(StatusTableRow {
                key: "branch",
                value: branch.unwrap_or_default(),
            });
            rows.push(StatusTableRow {
                key: "HEAD",
                value: head.unwrap_or_default(),
            });
        }
    }

    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");

    if !state.is_running() {
        println!("Run 'devbox start' to start the container.");
    }
}
