use crate::support::{Project, SCORE_RESPONSE};
use predicates::prelude::*;

fn experiment(project: &Project) {
    project.session("results/with-skill/run-1");
    project.session("results/with-skill/run-2");
    project.session("results/without-skill/run-3");
    project.session("results/without-skill/run-4");
}

#[test]
fn test_batch_judges_every_session() {
    let project = Project::new(SCORE_RESPONSE);
    experiment(&project);

    project
        .cmd()
        .args([
            "batch",
            "results",
            "--rubric",
            "code-quality",
            "--concurrency",
            "2",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("4 succeeded, 0 failed, 0 skipped"));

    for session in [
        "with-skill/run-1",
        "with-skill/run-2",
        "without-skill/run-3",
        "without-skill/run-4",
    ] {
        assert!(project
            .join(&format!("results/{}/scores/code-quality.json", session))
            .is_file());
    }
}

#[test]
fn test_batch_skip_existing() {
    let project = Project::new(SCORE_RESPONSE);
    experiment(&project);
    project.score("results/with-skill/run-1", "code-quality", 3.0);

    project
        .cmd()
        .args(["batch", "results", "--rubric", "code-quality", "--skip-existing"])
        .assert()
        .success()
        .stdout(predicate::str::contains("3 succeeded, 0 failed, 1 skipped"));

    // The pre-existing score is left alone
    assert!(project
        .read("results/with-skill/run-1/scores/code-quality.json")
        .contains("\"overall\": 3"));
}

#[test]
fn test_batch_failure_is_isolated() {
    let project = Project::new(SCORE_RESPONSE);
    experiment(&project);
    project.write("results/with-skill/run-2/code/game.py", "# BROKEN\n");
    project.write(
        "codejudge.toml",
        "retries = 1\n\n[llm]\nprogram = \"sh\"\nargs = [\"-c\", \"if grep -q BROKEN; then exit 1; fi; cat response.json\"]\n",
    );

    project
        .cmd()
        .args(["batch", "results", "--rubric", "code-quality"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("failed  run-2 code-quality"))
        .stdout(predicate::str::contains("3 succeeded, 1 failed, 0 skipped"))
        .stderr(predicate::str::contains("1 of 4 judging call(s) failed"));

    assert!(project
        .join("results/without-skill/run-4/scores/code-quality.json")
        .is_file());
    assert!(!project.join("results/with-skill/run-2/scores").exists());
}

#[test]
fn test_batch_missing_rubric_fails_only_its_calls() {
    let project = Project::new(SCORE_RESPONSE);
    experiment(&project);

    project
        .cmd()
        .args([
            "batch",
            "results",
            "--rubric",
            "code-quality",
            "--rubric",
            "missing",
        ])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("ok      run-1 code-quality"))
        .stdout(predicate::str::contains("failed  run-1 missing"))
        .stdout(predicate::str::contains("4 succeeded, 4 failed, 0 skipped"))
        .stderr(predicate::str::contains("4 of 8 judging call(s) failed"));

    for session in [
        "with-skill/run-1",
        "with-skill/run-2",
        "without-skill/run-3",
        "without-skill/run-4",
    ] {
        assert!(project
            .join(&format!("results/{}/scores/code-quality.json", session))
            .is_file());
    }
}

#[test]
fn test_batch_json_summary() {
    let project = Project::new(SCORE_RESPONSE);
    experiment(&project);

    let output = project
        .cmd()
        .args(["--format", "json", "batch", "results", "--rubric", "code-quality"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let summary: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(summary["succeeded"], 4);
    assert_eq!(summary["failed"], 0);
    assert_eq!(summary["calls"][0]["session"], "run-1");
    assert_eq!(summary["calls"][0]["overall"], 4.25);
}

#[test]
fn test_batch_rejects_zero_concurrency() {
    let project = Project::new(SCORE_RESPONSE);
    experiment(&project);

    project
        .cmd()
        .args(["batch", "results", "--rubric", "code-quality", "--concurrency", "0"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("invalid concurrency"));
}
