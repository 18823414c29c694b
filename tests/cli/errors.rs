use crate::support::{codejudge, Project, SCORE_RESPONSE};
use predicates::prelude::*;

#[test]
fn test_help_lists_commands() {
    codejudge()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage: codejudge"))
        .stdout(predicate::str::contains("judge"))
        .stdout(predicate::str::contains("batch"))
        .stdout(predicate::str::contains("report"));
}

#[test]
fn test_unknown_rubric_is_data_error() {
    let project = Project::new(SCORE_RESPONSE);
    project.session("run-1");

    project
        .cmd()
        .args(["judge", "run-1", "--rubric", "missing"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("rubric not found"));
}

#[test]
fn test_rubric_traversal_stays_in_rubrics_dir() {
    let project = Project::new(SCORE_RESPONSE);
    project.session("run-1");
    project.write("secret.md", "5: leaked\n");

    project
        .cmd()
        .args(["judge", "run-1", "--rubric", "../secret"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("rubrics"));

    assert!(!project.join("run-1/scores").exists());
}

#[test]
fn test_json_error_envelope() {
    let project = Project::new(SCORE_RESPONSE);
    project.session("run-1");

    let output = project
        .cmd()
        .args(["--format", "json", "judge", "run-1", "--rubric", "missing"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(3));

    let envelope: serde_json::Value = serde_json::from_slice(&output.stderr).unwrap();
    assert_eq!(envelope["error"]["type"], "not_found");
    assert_eq!(envelope["error"]["code"], 3);
}

#[test]
fn test_json_usage_error_envelope() {
    let output = codejudge()
        .args(["--format", "json", "judge"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));

    let envelope: serde_json::Value = serde_json::from_slice(&output.stderr).unwrap();
    assert_eq!(envelope["error"]["type"], "usage_error");
}

#[test]
fn test_invalid_config_is_usage_error() {
    let project = Project::new(SCORE_RESPONSE);
    project.write("codejudge.toml", "alpha = 2.0\n");

    project
        .cmd()
        .arg("rubrics")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("invalid alpha"));
}

#[test]
fn test_explicit_config_path() {
    let project = Project::new(SCORE_RESPONSE);
    project.write("other/rubrics/style.md", "5: tidy\n");
    project.write("custom.toml", "rubrics_dir = \"other/rubrics\"\n");

    project
        .cmd()
        .args(["--config", "custom.toml", "rubrics"])
        .assert()
        .success()
        .stdout("style\n");
}

#[test]
fn test_quiet_suppresses_error_line() {
    let project = Project::new(SCORE_RESPONSE);

    project
        .cmd()
        .args(["--quiet", "judge", "missing-session", "--rubric", "code-quality"])
        .assert()
        .code(3)
        .stderr(predicate::str::is_empty());
}
