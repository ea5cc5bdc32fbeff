//! Scripting runtime invocation settings.
//!
//! Argument lists may contain the `{script}` placeholder, which is replaced by
//! the absolute script path at call time.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Placeholder substituted with the script path.
pub const SCRIPT_PLACEHOLDER: &str = "{script}";

const IMPORT_SNIPPET: &str = "import importlib.util, os, sys
path = os.path.abspath(sys.argv[1])
sys.path.insert(0, os.path.dirname(path))
spec = importlib.util.spec_from_file_location('skill_under_check', path)
module = importlib.util.module_from_spec(spec)
spec.loader.exec_module(module)
";

fn default_program() -> String {
    "python3".to_string()
}

fn default_syntax_args() -> Vec<String> {
    vec!["-m".into(), "py_compile".into(), SCRIPT_PLACEHOLDER.into()]
}

fn default_import_args() -> Vec<String> {
    vec!["-c".into(), IMPORT_SNIPPET.into(), SCRIPT_PLACEHOLDER.into()]
}

fn default_run_args() -> Vec<String> {
    vec![SCRIPT_PLACEHOLDER.into()]
}

fn default_script_extension() -> String {
    "py".to_string()
}

fn default_entry_point_marker() -> String {
    "if __name__ == \"__main__\"".to_string()
}

const fn default_check_timeout_secs() -> u64 {
    5
}

const fn default_run_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Interpreter executable.
    #[serde(default = "default_program")]
    pub program: String,

    /// Arguments for the syntax-only compile check.
    #[serde(default = "default_syntax_args")]
    pub syntax_args: Vec<String>,

    /// Arguments that load the script's top-level code without running its entry point.
    #[serde(default = "default_import_args")]
    pub import_args: Vec<String>,

    /// Arguments that run the script as a program.
    #[serde(default = "default_run_args")]
    pub run_args: Vec<String>,

    /// Extension of script files, without the dot.
    #[serde(default = "default_script_extension")]
    pub script_extension: String,

    /// Text that marks a conventional "run as a program" entry point.
    #[serde(default = "default_entry_point_marker")]
    pub entry_point_marker: String,

    #[serde(default = "default_check_timeout_secs")]
    pub check_timeout_secs: u64,

    #[serde(default = "default_run_timeout_secs")]
    pub run_timeout_secs: u64,
}

impl RuntimeConfig {
    #[must_use]
    pub const fn check_timeout(&self) -> Duration {
        Duration::from_secs(self.check_timeout_secs)
    }

    #[must_use]
    pub const fn run_timeout(&self) -> Duration {
        Duration::from_secs(self.run_timeout_secs)
    }

    /// Expand `{script}` in `args` to `script`.
    #[must_use]
    pub fn expand(args: &[String], script: &Path) -> Vec<String> {
        let script = script.to_string_lossy();
        args.iter()
            .map(|arg| arg.replace(SCRIPT_PLACEHOLDER, &script))
            .collect()
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            program: default_program(),
            syntax_args: default_syntax_args(),
            import_args: default_import_args(),
            run_args: default_run_args(),
            script_extension: default_script_extension(),
            entry_point_marker: default_entry_point_marker(),
            check_timeout_secs: default_check_timeout_secs(),
            run_timeout_secs: default_run_timeout_secs(),
        }
    }
}
