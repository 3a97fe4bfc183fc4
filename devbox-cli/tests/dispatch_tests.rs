//! Dispatcher behaviour against a recording process runner.
//!
//! Nothing here touches docker or git: every external command is answered by
//! a recording `FakeRunner` and every prompt by a `ScriptedPrompt`.

use devbox_cli::Dispatcher;
use devbox_core::testing::FakeRunner;
use devbox_core::{
    CommandOutput, DevboxConfig, ExitCode, Invocation, OutputMode, ProcessError, ProcessRunner,
    ScriptedPrompt,
};

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

fn running() -> FakeRunner {
    FakeRunner::new().respond("ps --filter", "devbox\n")
}

fn stopped() -> FakeRunner {
    FakeRunner::new()
        .respond("ps --filter", "")
        .respond("ps -a", "devbox\n")
}

fn not_initialized(runner: FakeRunner) -> FakeRunner {
    runner.respond_status("test -e /workspace/.git", 1)
}

fn dispatch(runner: &FakeRunner, prompt: &ScriptedPrompt, verb: &str, args: &[&str]) -> ExitCode {
    let config = DevboxConfig::default();
    let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
    Dispatcher::new(&config, runner, prompt).dispatch(verb, &args)
}

// ---------------------------------------------------------------------------
// Argument validation
// ---------------------------------------------------------------------------

#[test]
fn unknown_verb_exits_1_without_any_process() {
    let runner = running();
    let code = dispatch(&runner, &ScriptedPrompt::default(), "deploy", &[]);
    assert_eq!(code, ExitCode::FAILURE);
    assert!(runner.command_lines().is_empty());
}

#[test]
fn extra_arguments_are_rejected() {
    let runner = running();
    let code = dispatch(&runner, &ScriptedPrompt::default(), "start", &["now"]);
    assert_eq!(code, ExitCode::FAILURE);
    assert!(runner.command_lines().is_empty());
}

#[test]
fn unknown_sanitizer_is_rejected_before_any_process() {
    let runner = running();
    let code = dispatch(&runner, &ScriptedPrompt::default(), "sanitizer", &["foo"]);
    assert_eq!(code, ExitCode::FAILURE);
    assert!(runner.command_lines().is_empty());
}

#[test]
fn sanitizer_without_tool_is_rejected() {
    let runner = running();
    let code = dispatch(&runner, &ScriptedPrompt::default(), "sanitizer", &[]);
    assert_eq!(code, ExitCode::FAILURE);
    assert!(runner.command_lines().is_empty());
}

#[test]
fn help_exits_0_without_any_process() {
    let runner = running();
    let code = dispatch(&runner, &ScriptedPrompt::default(), "help", &[]);
    assert_eq!(code, ExitCode::SUCCESS);
    assert!(runner.command_lines().is_empty());
}

#[test]
fn status_rejects_unknown_flag() {
    let runner = running();
    let code = dispatch(&runner, &ScriptedPrompt::default(), "status", &["--yaml"]);
    assert_eq!(code, ExitCode::FAILURE);
    assert!(runner.command_lines().is_empty());
}

// ---------------------------------------------------------------------------
// Preconditions
// ---------------------------------------------------------------------------

#[test]
fn gated_verbs_refuse_when_container_is_not_running() {
    for verb in ["shell", "init", "sync", "valgrind"] {
        let runner = stopped();
        let code = dispatch(&runner, &ScriptedPrompt::default(), verb, &[]);
        assert_eq!(code, ExitCode::FAILURE, "{verb}");
        assert!(
            runner.command_lines().iter().all(|c| c.starts_with("docker ps")),
            "{verb} ran more than the probe: {:?}",
            runner.command_lines()
        );
    }
}

#[test]
fn sync_refuses_uninitialized_workspace() {
    let runner = not_initialized(running());
    let code = dispatch(&runner, &ScriptedPrompt::default(), "sync", &[]);
    assert_eq!(code, ExitCode::FAILURE);
    assert!(!runner.ran("git -C"));
}

#[test]
fn sanitizer_refuses_uninitialized_workspace() {
    let runner = not_initialized(running());
    let code = dispatch(&runner, &ScriptedPrompt::default(), "sanitizer", &["asan"]);
    assert_eq!(code, ExitCode::FAILURE);
    assert!(!runner.ran("sh -c"));
}

#[test]
fn missing_docker_is_reported_as_failure() {
    struct NoDocker;
    impl ProcessRunner for NoDocker {
        fn run(&self, inv: &Invocation, _: OutputMode) -> Result<CommandOutput, ProcessError> {
            Err(ProcessError::NotFound {
                program: inv.program.clone(),
            })
        }
    }
    let config = DevboxConfig::default();
    let prompt = ScriptedPrompt::default();
    let code = Dispatcher::new(&config, NoDocker, &prompt).dispatch("shell", &[]);
    assert_eq!(code, ExitCode::FAILURE);
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

#[test]
fn start_runs_compose_up_then_reports_state() {
    let runner = running();
    let code = dispatch(&runner, &ScriptedPrompt::default(), "start", &[]);
    assert_eq!(code, ExitCode::SUCCESS);
    assert_eq!(
        runner.command_lines()[0],
        "docker-compose -f docker-compose.yml up -d"
    );
    assert!(runner.ran("docker ps"));
}

#[test]
fn restart_stops_before_starting() {
    let runner = running();
    dispatch(&runner, &ScriptedPrompt::default(), "restart", &[]);
    let stop = runner.position("docker-compose -f docker-compose.yml stop").unwrap();
    let up = runner.position("docker-compose -f docker-compose.yml up -d").unwrap();
    assert!(stop < up);
}

#[test]
fn failed_stop_code_is_propagated_and_restart_stops_there() {
    let runner = running().respond_status("compose.yml stop", 3);
    let code = dispatch(&runner, &ScriptedPrompt::default(), "restart", &[]);
    assert_eq!(code, ExitCode(3));
    assert!(!runner.ran("up -d"));
}

#[test]
fn shell_opens_interactive_exec_in_workspace() {
    let runner = running();
    dispatch(&runner, &ScriptedPrompt::default(), "shell", &[]);
    assert!(runner.ran("docker exec -it -w /workspace devbox /bin/bash"));
}

#[test]
fn clean_declined_removes_nothing() {
    let runner = running();
    let prompt = ScriptedPrompt::new(["n"]);
    let code = dispatch(&runner, &prompt, "clean", &[]);
    assert_eq!(code, ExitCode::SUCCESS);
    assert!(runner.command_lines().is_empty());
    assert_eq!(prompt.asked().len(), 1);
}

#[test]
fn clean_confirmed_removes_container_volumes_and_image() {
    let runner = running();
    let code = dispatch(&runner, &ScriptedPrompt::new(["y"]), "clean", &[]);
    assert_eq!(code, ExitCode::SUCCESS);
    assert_eq!(
        runner.command_lines(),
        vec!["docker-compose -f docker-compose.yml down --volumes --remove-orphans --rmi local"]
    );
}

#[test]
fn status_of_missing_container_succeeds_without_git() {
    let runner = FakeRunner::new();
    let code = dispatch(&runner, &ScriptedPrompt::default(), "status", &["--json"]);
    assert_eq!(code, ExitCode::SUCCESS);
    assert!(!runner.ran("git -C"));
}

#[test]
fn status_of_running_container_reads_branch_and_head() {
    let runner = running()
        .respond("rev-parse --abbrev-ref HEAD", "main\n")
        .respond("log -1", "abc1234 fix scheduler (dev, 2 hours ago)\n");
    let code = dispatch(&runner, &ScriptedPrompt::default(), "status", &[]);
    assert_eq!(code, ExitCode::SUCCESS);
    assert!(runner.ran("git -C /workspace rev-parse --abbrev-ref HEAD"));
    assert!(runner.ran("git -C /workspace log -1"));
}

// ---------------------------------------------------------------------------
// Init / sync
// ---------------------------------------------------------------------------

#[test]
fn init_declined_over_existing_copy_is_success() {
    let runner = running();
    let code = dispatch(&runner, &ScriptedPrompt::new(["no"]), "init", &[]);
    assert_eq!(code, ExitCode::SUCCESS);
    assert!(!runner.ran("git clone"));
    assert!(!runner.ran("-delete"));
}

#[test]
fn init_clones_into_empty_workspace() {
    let runner = not_initialized(running());
    let code = dispatch(&runner, &ScriptedPrompt::default(), "init", &[]);
    assert_eq!(code, ExitCode::SUCCESS);
    assert!(runner.ran("docker exec devbox git clone /source /workspace"));
}

#[test]
fn clean_sync_fetches_then_pulls_current_branch() {
    let runner = running()
        .respond("rev-parse --abbrev-ref HEAD", "main\n")
        .respond("status --porcelain", "")
        .respond("for-each-ref", "main\ndevelop\n")
        .respond("log -1", "abc1234 latest\n");
    let code = dispatch(&runner, &ScriptedPrompt::default(), "sync", &[]);

    assert_eq!(code, ExitCode::SUCCESS);
    let fetch = runner.position("fetch --prune /source").unwrap();
    let pull = runner.position("pull --no-rebase --no-edit /source main").unwrap();
    assert!(fetch < pull);
    assert!(!runner.ran("stash"));
}

#[test]
fn sync_cancel_with_local_changes_is_success_without_stash() {
    let runner = running()
        .respond("rev-parse --abbrev-ref HEAD", "main\n")
        .respond("status --porcelain", " M src/main.c\n");
    let prompt = ScriptedPrompt::new(["n"]);
    let code = dispatch(&runner, &prompt, "sync", &[]);

    assert_eq!(code, ExitCode::SUCCESS);
    assert!(!runner.ran("stash"));
    assert!(!runner.ran("pull"));
    assert!(prompt.asked()[0].contains("src/main.c"));
}

#[test]
fn sync_git_failure_exits_1() {
    let runner = running().respond_status("fetch --prune", 128);
    let code = dispatch(&runner, &ScriptedPrompt::default(), "sync", &[]);
    assert_eq!(code, ExitCode::FAILURE);
    assert!(!runner.ran("pull"));
}

// ---------------------------------------------------------------------------
// Build verbs
// ---------------------------------------------------------------------------

#[test]
fn ubsan_log_fails_run_even_when_tests_pass() {
    let runner = running().respond("if [ -s", "main.c:12:5: runtime error: signed integer overflow\n");
    let code = dispatch(&runner, &ScriptedPrompt::default(), "sanitizer", &["ubsan"]);
    assert_eq!(code, ExitCode::FAILURE);
    assert!(runner.ran("UBSAN_OPTIONS="));
}

#[test]
fn ubsan_log_fails_run_even_when_tests_fail_with_their_own_code() {
    let runner = running()
        .respond("if [ -s", "main.c:12:5: runtime error: signed integer overflow\n")
        .respond_status("mkdir -p", 3);
    let code = dispatch(&runner, &ScriptedPrompt::default(), "sanitizer", &["ubsan"]);
    assert_eq!(code, ExitCode::FAILURE);
}

#[test]
fn failing_asan_tests_propagate_their_code() {
    let runner = running().respond_status("build-asan/unit_tests", 3);
    let code = dispatch(&runner, &ScriptedPrompt::default(), "sanitizer", &["asan"]);
    assert_eq!(code, ExitCode(3));
}

#[test]
fn verb_help_flag_exits_0_without_any_process() {
    let runner = running();
    let code = dispatch(&runner, &ScriptedPrompt::default(), "sanitizer", &["--help"]);
    assert_eq!(code, ExitCode::SUCCESS);
    assert!(runner.command_lines().is_empty());
}

#[test]
fn clean_ubsan_run_passes() {
    let runner = running();
    let code = dispatch(&runner, &ScriptedPrompt::default(), "sanitizer", &["ubsan", "smoke"]);
    assert_eq!(code, ExitCode::SUCCESS);
    assert!(runner.ran("/workspace/build-ubsan/smoke"));
}

#[test]
fn asan_sets_flag_and_options() {
    let runner = running();
    let code = dispatch(&runner, &ScriptedPrompt::default(), "sanitizer", &["asan"]);
    assert_eq!(code, ExitCode::SUCCESS);
    assert!(runner.ran("-fsanitize=address"));
    assert!(runner.ran("ASAN_OPTIONS="));
    assert!(!runner.ran("if [ -s"));
}

#[test]
fn failing_build_step_abandons_tests_and_propagates_code() {
    let runner = running().respond_status("cmake --build", 2);
    let code = dispatch(&runner, &ScriptedPrompt::default(), "valgrind", &[]);
    assert_eq!(code, ExitCode(2));
    assert!(!runner.ran("valgrind --leak-check"));
}

#[test]
fn valgrind_runs_target_with_tags() {
    let runner = running();
    let code = dispatch(
        &runner,
        &ScriptedPrompt::default(),
        "valgrind",
        &["mutex_tests", "[fast]"],
    );
    assert_eq!(code, ExitCode::SUCCESS);
    assert!(runner.ran("valgrind --leak-check=full"));
    assert!(runner.ran("/workspace/build-valgrind/mutex_tests '[fast]'"));
}
