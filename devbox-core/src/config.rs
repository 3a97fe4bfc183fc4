//! `devbox.yaml` configuration.
//!
//! Every section is `#[serde(default)]`, so a file only needs the keys it
//! overrides:
//!
//! ```yaml
//! container_name: rtos-dev
//! source: /mnt/source
//! build:
//!   test_target: integration_tests
//! ```
//!
//! The `build.*` command lines are tera templates rendered per build plan
//! with `workspace`, `build_dir`, `cxx_flags`, `launcher`, `test_target`,
//! `test_tags` and `tool` in scope.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{io_err, ConfigError};

/// Default file name looked up in the current directory.
pub const CONFIG_FILE_NAME: &str = "devbox.yaml";

/// Environment variable overriding [`DevboxConfig::container_name`].
pub const ENV_CONTAINER: &str = "DEVBOX_CONTAINER";

/// Environment variable overriding [`DevboxConfig::source`].
pub const ENV_SOURCE: &str = "DEVBOX_SOURCE";

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Top-level devbox configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DevboxConfig {
    /// Exact container name used for probing and exec.
    pub container_name: String,
    /// Compose file on the host.
    pub compose_file: PathBuf,
    /// Compose launcher, e.g. `["docker-compose"]` or `["docker", "compose"]`.
    pub compose_command: Vec<String>,
    /// Container runtime CLI.
    pub docker_program: String,
    /// Working copy path *inside* the container.
    pub workspace: PathBuf,
    /// Repository the workspace is cloned from and synced with (path inside
    /// the container, or a URL).
    pub source: String,
    /// Prefix for remote-tracking refs created by sync.
    pub remote_namespace: String,
    /// Interactive shell started by `devbox shell`.
    pub shell: String,
    pub build: BuildConfig,
    pub valgrind: ValgrindConfig,
}

/// Build/test command templates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Build directories are `<workspace>/<prefix>-<tool>`.
    pub build_dir_prefix: String,
    /// Test binary run when no target is given on the command line.
    pub test_target: String,
    pub configure: String,
    pub build: String,
    pub test: String,
}

/// Valgrind invocation settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValgrindConfig {
    pub options: Vec<String>,
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

impl Default for DevboxConfig {
    fn default() -> Self {
        Self {
            container_name: "devbox".to_string(),
            compose_file: PathBuf::from("docker-compose.yml"),
            compose_command: vec!["docker-compose".to_string()],
            docker_program: "docker".to_string(),
            workspace: PathBuf::from("/workspace"),
            source: "/source".to_string(),
            remote_namespace: "source".to_string(),
            shell: "/bin/bash".to_string(),
            build: BuildConfig::default(),
            valgrind: ValgrindConfig::default(),
        }
    }
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            build_dir_prefix: "build".to_string(),
            test_target: "unit_tests".to_string(),
            configure: concat!(
                "cmake -S {{ workspace }} -B {{ build_dir }} -DCMAKE_BUILD_TYPE=Debug ",
                "-DCMAKE_C_FLAGS=\"{{ cxx_flags }}\" -DCMAKE_CXX_FLAGS=\"{{ cxx_flags }}\" ",
                "-DCMAKE_EXE_LINKER_FLAGS=\"{{ cxx_flags }}\""
            )
            .to_string(),
            build: "cmake --build {{ build_dir }} --parallel".to_string(),
            test: "{{ launcher }} {{ build_dir }}/{{ test_target }} {{ test_tags }}".to_string(),
        }
    }
}

impl Default for ValgrindConfig {
    fn default() -> Self {
        Self {
            options: vec![
                "--leak-check=full".to_string(),
                "--track-origins=yes".to_string(),
                "--error-exitcode=1".to_string(),
            ],
        }
    }
}

// ---------------------------------------------------------------------------
// Load
// ---------------------------------------------------------------------------

impl DevboxConfig {
    /// Load and validate the config at `path`.
    ///
    /// Returns `ConfigError::NotFound` if absent, `ConfigError::Parse`
    /// (with path + line context) if malformed YAML.
    pub fn load_at(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound {
                path: path.to_path_buf(),
            });
        }
        let contents = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
        let config: DevboxConfig =
            serde_yaml::from_str(&contents).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Load `<dir>/devbox.yaml`, or built-in defaults when the file is absent.
    pub fn load_or_default(dir: &Path) -> Result<Self, ConfigError> {
        let path = dir.join(CONFIG_FILE_NAME);
        if path.exists() {
            Self::load_at(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Apply `DEVBOX_*` overrides using `lookup` (normally `std::env::var`).
    pub fn with_env_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(name) = lookup(ENV_CONTAINER).filter(|v| !v.trim().is_empty()) {
            self.container_name = name;
        }
        if let Some(source) = lookup(ENV_SOURCE).filter(|v| !v.trim().is_empty()) {
            self.source = source;
        }
        self
    }

    /// Reject values that would produce nonsensical runtime commands.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.container_name.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "container_name",
                message: "must not be empty".to_string(),
            });
        }
        if self.compose_command.is_empty() {
            return Err(ConfigError::Invalid {
                field: "compose_command",
                message: "must name at least the compose program".to_string(),
            });
        }
        if !self.workspace.is_absolute() {
            return Err(ConfigError::Invalid {
                field: "workspace",
                message: format!(
                    "must be an absolute path inside the container, got '{}'",
                    self.workspace.display()
                ),
            });
        }
        if self.source.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "source",
                message: "must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// `<workspace>/.git`: presence marks the workspace as initialized.
    pub fn workspace_git_dir(&self) -> PathBuf {
        self.workspace.join(".git")
    }

    /// `<workspace>/<prefix>-<label>`
    pub fn build_dir(&self, label: &str) -> PathBuf {
        self.workspace
            .join(format!("{}-{}", self.build.build_dir_prefix, label))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        DevboxConfig::default().validate().expect("defaults are valid");
    }

    #[test]
    fn partial_yaml_keeps_other_defaults() {
        let cfg: DevboxConfig = serde_yaml::from_str("container_name: rtos\n").expect("parse");
        assert_eq!(cfg.container_name, "rtos");
        assert_eq!(cfg.workspace, PathBuf::from("/workspace"));
        assert_eq!(cfg.build.test_target, "unit_tests");
    }

    #[test]
    fn env_overrides_replace_container_and_source() {
        let cfg = DevboxConfig::default().with_env_overrides(|key| match key {
            ENV_CONTAINER => Some("other".to_string()),
            ENV_SOURCE => Some("git@host:repo.git".to_string()),
            _ => None,
        });
        assert_eq!(cfg.container_name, "other");
        assert_eq!(cfg.source, "git@host:repo.git");
    }

    #[test]
    fn blank_env_override_is_ignored() {
        let cfg = DevboxConfig::default().with_env_overrides(|_| Some("  ".to_string()));
        assert_eq!(cfg.container_name, "devbox");
    }

    #[test]
    fn build_dir_joins_prefix_and_label() {
        let cfg = DevboxConfig::default();
        assert_eq!(cfg.build_dir("asan"), PathBuf::from("/workspace/build-asan"));
    }

    #[test]
    fn relative_workspace_is_invalid() {
        let cfg = DevboxConfig {
            workspace: PathBuf::from("workspace"),
            ..DevboxConfig::default()
        };
        let err = cfg.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "workspace", .. }));
    }
}
