//! Health verdicts for real script fixtures, using `sh` as the runtime.

use std::path::Path;

use pretty_assertions::assert_eq;
use rstest::rstest;
use sk_config::RuntimeConfig;
use sk_core::{HealthStatus, RegistryEntry, StorageLayout};
use sk_health::{HealthChecker, HealthProbe};
use tempfile::TempDir;

const MANIFEST: &str = "---\nname: skill\ndescription: fixture\n---\n# Skill\n";

fn sh_runtime(check_timeout_secs: u64) -> RuntimeConfig {
    RuntimeConfig {
        program: "sh".into(),
        syntax_args: vec!["-n".into(), "{script}".into()],
        import_args: vec!["{script}".into()],
        run_args: vec!["{script}".into()],
        script_extension: "sh".into(),
        entry_point_marker: "main".into(),
        check_timeout_secs,
        run_timeout_secs: 5,
    }
}

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    std::fs::create_dir_all(path.parent().expect("has parent")).expect("mkdir should succeed");
    std::fs::write(path, content).expect("write should succeed");
}

/// A structured-folder skill whose script body is `script`.
fn structured_skill(root: &Path, name: &str, script: &str) -> RegistryEntry {
    let folder = name.replace('_', "-");
    write(root, &format!("{folder}/SKILL.md"), MANIFEST);
    write(root, &format!("{folder}/scripts/{name}.sh"), script);
    let mut entry = RegistryEntry::new(
        name,
        format!("{folder}/scripts/{name}.sh"),
        format!("{folder}/SKILL.md"),
    );
    entry.storage_layout = StorageLayout::StructuredFolder;
    entry.has_manifest = true;
    entry
}

#[test]
fn clean_structured_skill_is_healthy() {
    let temp = TempDir::new().expect("tempdir should create");
    let entry = structured_skill(temp.path(), "get_trials", "echo ok\n");
    let checker = HealthChecker::new(temp.path(), sh_runtime(5));

    let report = checker.check(&entry);

    assert_eq!(report.status, HealthStatus::Healthy, "issues: {:?}", report.issues);
    assert!(report.checks.exists);
    assert!(report.checks.structure_valid);
    assert!(report.checks.syntax_valid);
    assert!(report.checks.executable);
    assert!(report.issues.is_empty());
    assert!(report.recommendations.is_empty());
}

#[test]
fn deleted_files_are_broken_without_crashing() {
    let temp = TempDir::new().expect("tempdir should create");
    let entry = structured_skill(temp.path(), "get_trials", "echo ok\n");
    std::fs::remove_dir_all(temp.path().join("get-trials")).expect("delete should succeed");
    let checker = HealthChecker::new(temp.path(), sh_runtime(5));

    let report = checker.check(&entry);

    assert_eq!(report.status, HealthStatus::Broken);
    assert!(!report.checks.exists);
    assert!(!report.checks.syntax_valid);
    assert!(!report.checks.executable);
    assert!(report.issues.iter().any(|issue| issue.starts_with("script not found")));
}

#[test]
fn syntax_error_is_broken() {
    let temp = TempDir::new().expect("tempdir should create");
    let entry = structured_skill(temp.path(), "get_trials", "if true; then\n  echo unterminated\n");
    let checker = HealthChecker::new(temp.path(), sh_runtime(5));

    let report = checker.check(&entry);

    assert_eq!(report.status, HealthStatus::Broken);
    assert!(report.checks.exists);
    assert!(!report.checks.syntax_valid);
    assert!(!report.checks.executable, "import is skipped after a syntax failure");
    assert!(report.issues.iter().any(|issue| issue.starts_with("syntax check failed")));
}

#[rstest]
#[case::failing_import("echo 'No module named mcp' >&2\nexit 1\n", "No module named mcp")]
#[case::slow_import("sleep 10\n", "timed out after 1s")]
fn import_failure_is_degraded(#[case] script: &str, #[case] expected_issue: &str) {
    let temp = TempDir::new().expect("tempdir should create");
    let entry = structured_skill(temp.path(), "get_trials", script);
    let checker = HealthChecker::new(temp.path(), sh_runtime(1));

    let report = checker.check(&entry);

    assert_eq!(report.status, HealthStatus::Degraded);
    assert!(report.checks.syntax_valid);
    assert!(!report.checks.executable);
    assert!(
        report.issues.iter().any(|issue| issue.contains(expected_issue)),
        "issues: {:?}",
        report.issues
    );
    assert!(
        report
            .recommendations
            .contains(&"install missing dependencies or fix imports".to_string())
    );
}

#[test]
fn legacy_layout_is_degraded_with_migration_advice() {
    let temp = TempDir::new().expect("tempdir should create");
    write(temp.path(), "get_trials.sh", "echo ok\n");
    write(temp.path(), "get_trials.md", "# no frontmatter\n");
    let entry = RegistryEntry::new("get_trials", "get_trials.sh", "get_trials.md");
    let checker = HealthChecker::new(temp.path(), sh_runtime(5));

    let report = checker.probe(&entry);

    assert_eq!(report.status, HealthStatus::Degraded);
    assert!(!report.checks.structure_valid);
    assert_eq!(
        report.recommendations,
        vec!["migrate to folder layout", "add manifest header"]
    );
}

#[test]
fn declared_manifest_must_exist_in_doc() {
    let temp = TempDir::new().expect("tempdir should create");
    let entry = structured_skill(temp.path(), "get_trials", "echo ok\n");
    write(temp.path(), "get-trials/SKILL.md", "# frontmatter was removed\n");
    let checker = HealthChecker::new(temp.path(), sh_runtime(5));

    let report = checker.check(&entry);

    assert_eq!(report.status, HealthStatus::Degraded);
    assert!(report.issues.iter().any(|issue| issue.contains("no frontmatter")));
}

#[test]
fn batch_reports_every_entry_by_name() {
    let temp = TempDir::new().expect("tempdir should create");
    let healthy = structured_skill(temp.path(), "a_skill", "echo ok\n");
    let missing = RegistryEntry::new("b_skill", "b_skill.sh", "b_skill.md");
    let checker = HealthChecker::new(temp.path(), sh_runtime(5));

    let mut seen = Vec::new();
    let reports = checker.batch_health_check_with(&[healthy, missing], |report| {
        seen.push(report.skill.clone());
    });

    assert_eq!(seen, vec!["a_skill", "b_skill"]);
    assert_eq!(reports["a_skill"].status, HealthStatus::Healthy);
    assert_eq!(reports["b_skill"].status, HealthStatus::Broken);
}

#[test]
fn missing_runtime_degrades_to_issues() {
    let temp = TempDir::new().expect("tempdir should create");
    let entry = structured_skill(temp.path(), "get_trials", "echo ok\n");
    let runtime = RuntimeConfig {
        program: "definitely-not-a-real-runtime".into(),
        ..sh_runtime(5)
    };

    let report = HealthChecker::new(temp.path(), runtime).check(&entry);

    assert_eq!(report.status, HealthStatus::Broken);
    assert!(report.issues.iter().any(|issue| issue.contains("failed to start")));
}
