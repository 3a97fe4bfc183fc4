//! Rendering of the `build.*` command templates from `devbox.yaml`.

use std::path::Path;

use tera::{Context, Tera};

use crate::ContainerError;

/// Variables visible to build command templates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptVars {
    pub workspace: String,
    pub build_dir: String,
    /// Compiler and linker flags for the instrumented build.
    pub cxx_flags: String,
    /// Command prefix for the test binary (e.g. `valgrind --leak-check=full`).
    pub launcher: String,
    /// Shell-quoted test binary name.
    pub test_target: String,
    /// Shell-quoted test filter, or empty.
    pub test_tags: String,
    pub tool: String,
}

impl ScriptVars {
    fn context(&self) -> Context {
        let mut ctx = Context::new();
        ctx.insert("workspace", &self.workspace);
        ctx.insert("build_dir", &self.build_dir);
        ctx.insert("cxx_flags", &self.cxx_flags);
        ctx.insert("launcher", &self.launcher);
        ctx.insert("test_target", &self.test_target);
        ctx.insert("test_tags", &self.test_tags);
        ctx.insert("tool", &self.tool);
        ctx
    }
}

/// Render one step template. Undefined variables are errors.
pub fn render(step: &'static str, template: &str, vars: &ScriptVars) -> Result<String, ContainerError> {
    Tera::one_off(template, &vars.context(), false)
        .map(|rendered| rendered.trim().to_string())
        .map_err(|source| ContainerError::Template { step, source })
}

/// Quote `value` for POSIX `sh` unless it only has safe characters.
pub fn shell_quote(value: &str) -> String {
    let safe = !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./=:,+@%".contains(c));
    if safe {
        value.to_string()
    } else {
        format!("'{}'", value.replace('\'', r"'\''"))
    }
}

/// [`shell_quote`] for paths.
pub fn quote_path(path: &Path) -> String {
    shell_quote(&path.display().to_string())
}
