use crate::support::Project;
use predicates::prelude::*;

#[test]
fn test_compare_writes_comparison_artifact() {
    let project = Project::new(
        r#"{"verdict": "a_better", "margin": "moderate", "score_a": 4.25, "score_b": 3.5}"#,
    );
    project.session("results/run-1");
    project.session("results/run-2");

    project
        .cmd()
        .args([
            "compare",
            "results/run-1",
            "results/run-2",
            "--rubric",
            "code-quality",
            "--results",
            "results",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("run-1 vs run-2: a_better (moderate"));

    let artifact: serde_json::Value = serde_json::from_str(
        &project.read("results/comparisons/run-1-vs-run-2/comparison-code-quality.json"),
    )
    .unwrap();
    assert_eq!(artifact["session_a"], "run-1");
    assert_eq!(artifact["verdict"], "a_better");
}

#[test]
fn test_compare_baseline_mode() {
    let project = Project::new(
        r#"{"verdict": "framework_better", "quality_delta": 2, "time_saved_estimate": "significant", "score_baseline": 2.5, "score_framework": 4.5, "categories": {"testing": "improved"}}"#,
    );
    project.session("results/plain");
    project.session("results/framework");

    project
        .cmd()
        .args([
            "compare",
            "results/plain",
            "results/framework",
            "--rubric",
            "code-quality",
            "--results",
            "results",
            "--baseline",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("framework_better"));

    assert!(project
        .join("results/comparisons/plain-vs-framework/baseline-comparison-code-quality.json")
        .is_file());
}

#[test]
fn test_compare_invalid_verdict_rejected() {
    let project = Project::new(r#"{"verdict": "a_wins", "margin": "slight"}"#);
    project.session("results/run-1");
    project.session("results/run-2");

    project
        .cmd()
        .args([
            "compare",
            "results/run-1",
            "results/run-2",
            "--rubric",
            "code-quality",
            "--results",
            "results",
        ])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("verdict"));
}
