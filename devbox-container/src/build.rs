//! Instrumented build/test plans for the `valgrind` and `sanitizer` verbs.
//!
//! A plan is three streamed steps run in the workspace: configure, build,
//! test. The first failing step abandons the rest and its exit code is
//! returned unchanged.
//!
//! For UBSan the runtime writes one report file per process into a private
//! directory that the test step recreates on every run; when the test binary
//! exits, the step concatenates those reports into the single file
//! `<build_dir>/ubsan.log`. A non-empty `ubsan.log` sets the exit code to 1,
//! whatever the test binary itself returned.

use std::collections::BTreeMap;
use std::path::PathBuf;

use devbox_core::{DevboxConfig, ExitCode, ProcessRunner, SanitizerTool};

use crate::script::{self, quote_path, shell_quote, ScriptVars};
use crate::{ContainerError, DevContainer};

/// Log file checked after a UBSan test run.
pub const UBSAN_LOG_FILE: &str = "ubsan.log";

const UBSAN_REPORT_DIR: &str = "ubsan-reports";

/// One named shell step of a plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildStep {
    pub name: &'static str,
    pub script: String,
    pub env: BTreeMap<String, String>,
}

/// Ordered steps plus the optional sanitizer log to inspect afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildPlan {
    /// `valgrind`, `asan`, `tsan`, `ubsan`.
    pub label: String,
    pub build_dir: PathBuf,
    pub steps: Vec<BuildStep>,
    pub log_file: Option<PathBuf>,
}

/// What happened when a plan ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildReport {
    pub exit: ExitCode,
    /// Step that stopped the plan, if any.
    pub failed_step: Option<&'static str>,
    /// Contents of a non-empty sanitizer log.
    pub sanitizer_log: Option<String>,
}

impl BuildPlan {
    /// configure → build → `valgrind <options> <target> [tags]`
    pub fn valgrind(
        config: &DevboxConfig,
        test_target: Option<&str>,
        test_tags: Option<&str>,
    ) -> Result<Self, ContainerError> {
        let label = "valgrind";
        let build_dir = config.build_dir(label);
        let mut launcher = vec!["valgrind".to_string()];
        launcher.extend(config.valgrind.options.iter().map(|o| shell_quote(o)));

        let vars = ScriptVars {
            workspace: quote_path(&config.workspace),
            build_dir: quote_path(&build_dir),
            cxx_flags: "-g -O0".to_string(),
            launcher: launcher.join(" "),
            test_target: shell_quote(test_target.unwrap_or(&config.build.test_target)),
            test_tags: test_tags.map(shell_quote).unwrap_or_default(),
            tool: label.to_string(),
        };
        let test = script::render("test", &config.build.test, &vars)?;
        Self::assemble(config, label, build_dir, &vars, test, BTreeMap::new(), None)
    }

    /// configure with the tool's `-fsanitize=` flag → build → run the target
    /// with the tool's options variable set.
    pub fn sanitizer(
        config: &DevboxConfig,
        tool: SanitizerTool,
        test_target: Option<&str>,
    ) -> Result<Self, ContainerError> {
        let label = tool.as_str();
        let build_dir = config.build_dir(label);
        let vars = ScriptVars {
            workspace: quote_path(&config.workspace),
            build_dir: quote_path(&build_dir),
            cxx_flags: format!("{} -fno-omit-frame-pointer -g -O1", tool.compile_flag()),
            launcher: String::new(),
            test_target: shell_quote(test_target.unwrap_or(&config.build.test_target)),
            test_tags: String::new(),
            tool: label.to_string(),
        };
        let mut test = script::render("test", &config.build.test, &vars)?;

        let report_dir = build_dir.join(UBSAN_REPORT_DIR);
        let options = match tool {
            SanitizerTool::Asan => "detect_leaks=1:abort_on_error=1:strict_string_checks=1".to_string(),
            SanitizerTool::Tsan => "halt_on_error=1:second_deadlock_stack=1".to_string(),
            SanitizerTool::Ubsan => format!(
                "print_stacktrace=1:halt_on_error=0:log_path={}",
                report_dir.join("ubsan").display()
            ),
        };
        let env = BTreeMap::from([(tool.options_var().to_string(), options)]);

        let log_file = match tool {
            SanitizerTool::Ubsan => {
                let log = build_dir.join(UBSAN_LOG_FILE);
                test = format!(
                    "rm -rf {dir} {log} && mkdir -p {dir} || exit 1; {test}; status=$?; \
                     cat {dir}/* > {log} 2>/dev/null; exit $status",
                    dir = quote_path(&report_dir),
                    log = quote_path(&log),
                );
                Some(log)
            }
            SanitizerTool::Asan | SanitizerTool::Tsan => None,
        };

        Self::assemble(config, label, build_dir, &vars, test, env, log_file)
    }

    fn assemble(
        config: &DevboxConfig,
        label: &str,
        build_dir: PathBuf,
        vars: &ScriptVars,
        test: String,
        test_env: BTreeMap<String, String>,
        log_file: Option<PathBuf>,
    ) -> Result<Self, ContainerError> {
        let steps = vec![
            BuildStep {
                name: "configure",
                script: script::render("configure", &config.build.configure, vars)?,
                env: BTreeMap::new(),
            },
            BuildStep {
                name: "build",
                script: script::render("build", &config.build.build, vars)?,
                env: BTreeMap::new(),
            },
            BuildStep {
                name: "test",
                script: test,
                env: test_env,
            },
        ];
        Ok(Self {
            label: label.to_string(),
            build_dir,
            steps,
            log_file,
        })
    }
}

impl<R: ProcessRunner> DevContainer<'_, R> {
    /// Run `plan` step by step inside the container.
    pub fn run_in_container(&self, plan: &BuildPlan) -> Result<BuildReport, ContainerError> {
        let last = plan.steps.len().saturating_sub(1);
        let mut exit = ExitCode::SUCCESS;
        let mut failed_step = None;

        for (index, step) in plan.steps.iter().enumerate() {
            tracing::info!(plan = %plan.label, step = step.name, "running build step");
            let code = self.run_script(&step.script, &step.env)?;
            if code.is_success() {
                continue;
            }
            tracing::warn!(plan = %plan.label, step = step.name, status = code.0, "build step failed");
            exit = code;
            failed_step = Some(step.name);
            if index < last {
                return Ok(BuildReport {
                    exit,
                    failed_step,
                    sanitizer_log: None,
                });
            }
        }

        let mut sanitizer_log = None;
        if let Some(log) = &plan.log_file {
            sanitizer_log = self.read_nonempty_file(log)?;
            if sanitizer_log.is_some() {
                tracing::warn!(log = %log.display(), status = exit.0, "sanitizer reported errors");
                exit = ExitCode::FAILURE;
            }
        }

        Ok(BuildReport {
            exit,
            failed_step,
            sanitizer_log,
        })
    }
}
