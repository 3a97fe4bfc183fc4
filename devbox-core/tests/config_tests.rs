//! Config loading error messages and fallback behaviour.

use std::path::PathBuf;

use assert_fs::prelude::*;
use devbox_core::{config::CONFIG_FILE_NAME, ConfigError, DevboxConfig};
use predicates::prelude::predicate;
use rstest::rstest;

// ---------------------------------------------------------------------------
// 1. Load errors
// ---------------------------------------------------------------------------

#[test]
fn load_missing_file_returns_not_found_with_path() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    let path = dir.path().join("missing.yaml");
    let err = DevboxConfig::load_at(&path).unwrap_err();
    assert!(matches!(err, ConfigError::NotFound { .. }), "got: {err}");
    assert!(err.to_string().contains("missing.yaml"));
}

#[test]
fn load_corrupt_yaml_returns_parse_error_with_path() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    let file = dir.child(CONFIG_FILE_NAME);
    file.write_str(": : corrupt : yaml : !!!\n  - broken: [unclosed")
        .expect("write");

    let err = DevboxConfig::load_at(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }), "got: {err}");
    assert!(err.to_string().contains(CONFIG_FILE_NAME));
}

#[test]
fn load_wrong_type_yaml_returns_parse_error() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    let file = dir.child(CONFIG_FILE_NAME);
    file.write_str("compose_command: docker-compose\n").expect("write");

    let err = DevboxConfig::load_at(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }), "got: {err}");
}

#[rstest]
#[case("container_name: ''\n", "container_name")]
#[case("compose_command: []\n", "compose_command")]
#[case("workspace: relative/dir\n", "workspace")]
#[case("source: ' '\n", "source")]
fn invalid_values_are_rejected(#[case] yaml: &str, #[case] field: &str) {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    let file = dir.child(CONFIG_FILE_NAME);
    file.write_str(yaml).expect("write");

    let err = DevboxConfig::load_at(file.path()).unwrap_err();
    match err {
        ConfigError::Invalid { field: f, .. } => assert_eq!(f, field),
        other => panic!("expected invalid {field}, got {other}"),
    }
}

// ---------------------------------------------------------------------------
// 2. Fallback
// ---------------------------------------------------------------------------

#[test]
fn load_or_default_without_file_uses_defaults() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    let cfg = DevboxConfig::load_or_default(dir.path()).expect("defaults");
    assert_eq!(cfg, DevboxConfig::default());
    dir.child(CONFIG_FILE_NAME).assert(predicate::path::missing());
}

#[test]
fn load_or_default_reads_present_file() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    dir.child(CONFIG_FILE_NAME)
        .write_str(
            "container_name: rtos-dev\n\
             compose_command: [docker, compose]\n\
             workspace: /home/dev/rtos\n\
             build:\n  test_target: integration_tests\n",
        )
        .expect("write");

    let cfg = DevboxConfig::load_or_default(dir.path()).expect("load");
    assert_eq!(cfg.container_name, "rtos-dev");
    assert_eq!(cfg.compose_command, vec!["docker", "compose"]);
    assert_eq!(cfg.workspace, PathBuf::from("/home/dev/rtos"));
    assert_eq!(cfg.build.test_target, "integration_tests");
    assert_eq!(cfg.build.build_dir_prefix, "build");
    assert_eq!(cfg.workspace_git_dir(), PathBuf::from("/home/dev/rtos/.git"));
}
