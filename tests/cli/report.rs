use crate::support::{Project, SCORE_RESPONSE};
use predicates::prelude::*;

fn scored_experiment() -> Project {
    let project = Project::new(SCORE_RESPONSE);
    for (session, overall) in [
        ("results/with-skill/run-1", 4.25),
        ("results/with-skill/run-2", 4.0),
        ("results/with-skill/run-3", 3.75),
        ("results/without-skill/run-4", 3.0),
        ("results/without-skill/run-5", 3.25),
        ("results/without-skill/run-6", 2.75),
    ] {
        project.score(session, "code-quality", overall);
    }
    project
}

#[test]
fn test_report_writes_both_files() {
    let project = scored_experiment();

    project
        .cmd()
        .args(["report", "results"])
        .assert()
        .success()
        .stdout(predicate::str::contains("report.md"))
        .stdout(predicate::str::contains("report.json"));

    let markdown = project.read("results/report.md");
    assert!(markdown.contains("# Code Quality Evaluation Report"));
    assert!(markdown.contains("> **Significant:** `with-skill`"));
    assert!(markdown.contains("| with-skill | 3 | 4.00 |"));

    let json: serde_json::Value =
        serde_json::from_str(&project.read("results/report.json")).unwrap();
    assert_eq!(json["comparison"]["treatment"], "with-skill");
    assert_eq!(json["comparison"]["control"], "without-skill");
    assert_eq!(json["comparison"]["significant"], true);
}

#[test]
fn test_report_stdout_markdown_only() {
    let project = scored_experiment();

    project
        .cmd()
        .args(["report", "results", "--stdout"])
        .assert()
        .success()
        .stdout(predicate::str::contains("## Per-Rubric Breakdown"));

    assert!(!project.join("results/report.md").exists());
}

#[test]
fn test_report_explicit_pair_as_json() {
    let project = scored_experiment();

    let output = project
        .cmd()
        .args([
            "report",
            "results",
            "--stdout",
            "--output",
            "json",
            "--treatment",
            "without-skill",
            "--control",
            "with-skill",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["comparison"]["treatment"], "without-skill");
    assert_eq!(json["comparison"]["difference"], -1.0);
}

#[test]
fn test_report_collects_warnings() {
    let project = scored_experiment();
    project.write("results/with-skill/run-7/scores/code-quality.json", "{not json");

    project
        .cmd()
        .args(["report", "results", "--output", "markdown"])
        .assert()
        .success()
        .stderr(predicate::str::contains("collection warning(s)"));

    let markdown = project.read("results/report.md");
    assert!(markdown.contains("## Collection Warnings"));
    assert!(markdown.contains("run-7"));
    assert!(!project.join("results/report.json").exists());
}

#[test]
fn test_report_treatment_requires_control() {
    let project = scored_experiment();

    project
        .cmd()
        .args(["report", "results", "--treatment", "with-skill"])
        .assert()
        .code(2);
}

#[test]
fn test_report_pair_must_differ() {
    let project = scored_experiment();

    project
        .cmd()
        .args([
            "report",
            "results",
            "--treatment",
            "with-skill",
            "--control",
            "with-skill",
        ])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("different variants"));
    assert!(!project.join("results/report.md").exists());
}

#[test]
fn test_report_unknown_variant() {
    let project = scored_experiment();

    project
        .cmd()
        .args([
            "report",
            "results",
            "--treatment",
            "with-skill",
            "--control",
            "nope",
        ])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("nope"));
}

#[test]
fn test_report_missing_root() {
    let project = Project::new(SCORE_RESPONSE);

    project
        .cmd()
        .args(["report", "missing"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("not found"));
}
