use crate::support::{Project, SCORE_RESPONSE};
use predicates::prelude::*;

#[test]
fn test_judge_writes_score_artifact() {
    let project = Project::new(SCORE_RESPONSE);
    project.session("results/with-skill/run-1");

    project
        .cmd()
        .args(["judge", "results/with-skill/run-1", "--rubric", "code-quality"])
        .assert()
        .success()
        .stdout(predicate::str::contains("run-1"))
        .stdout(predicate::str::contains("code-quality: 4.25 (4 strong)"));

    let artifact: serde_json::Value = serde_json::from_str(
        &project.read("results/with-skill/run-1/scores/code-quality.json"),
    )
    .unwrap();
    assert_eq!(artifact["session_id"], "run-1");
    assert_eq!(artifact["scores"]["overall"], 4.25);
    assert_eq!(artifact["scores"]["modifier"], "strong");
    assert_eq!(
        artifact["files_judged"],
        serde_json::json!(["game.py", "test_game.py"])
    );
}

#[test]
fn test_judge_json_output() {
    let project = Project::new(SCORE_RESPONSE);
    project.session("run-1");

    let output = project
        .cmd()
        .args(["--format", "json", "judge", "run-1", "--rubric", "code-quality"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let artifacts: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(artifacts[0]["rubric"], "code-quality");
    assert_eq!(artifacts[0]["scores"]["base_score"], 4);
}

#[test]
fn test_out_of_range_score_is_rejected() {
    let project = Project::new(r#"{"base_score": 7, "modifier": "solid"}"#);
    project.session("run-1");

    project
        .cmd()
        .args(["judge", "run-1", "--rubric", "code-quality"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("invalid score: base_score"));

    assert!(!project.join("run-1/scores").exists());
}

#[test]
fn test_unparseable_response_fails() {
    let project = Project::new("I would rate this a four.");
    project.session("run-1");

    project
        .cmd()
        .args(["judge", "run-1", "--rubric", "code-quality"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("could not parse judge response"));
}

#[test]
fn test_failing_judge_command_exhausts_retries() {
    let project = Project::new(SCORE_RESPONSE);
    project.session("run-1");
    project.write(
        "codejudge.toml",
        "retries = 2\n\n[llm]\nprogram = \"sh\"\nargs = [\"-c\", \"cat >/dev/null; echo boom >&2; exit 3\"]\n",
    );

    project
        .cmd()
        .args(["judge", "run-1", "--rubric", "code-quality"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("after 2 attempt(s)"));
}

#[test]
fn test_judge_unwraps_fenced_envelope() {
    let project = Project::new(
        r#"{"type": "result", "is_error": false, "session_id": "abc", "result": "```json\n{\"base_score\": 3, \"modifier\": \"weak\"}\n```"}"#,
    );
    project.session("run-1");

    project
        .cmd()
        .args(["judge", "run-1", "--rubric", "code-quality"])
        .assert()
        .success()
        .stdout(predicate::str::contains("code-quality: 2.75 (3 weak)"));
}

#[test]
fn test_judge_keeps_scores_when_a_rubric_is_missing() {
    let project = Project::new(SCORE_RESPONSE);
    project.session("run-1");

    project
        .cmd()
        .args([
            "judge",
            "run-1",
            "--rubric",
            "missing",
            "--rubric",
            "code-quality",
        ])
        .assert()
        .code(3)
        .stdout(predicate::str::contains("code-quality: 4.25 (4 strong)"))
        .stderr(predicate::str::contains("rubric not found"));

    assert!(project.join("run-1/scores/code-quality.json").is_file());
}

#[test]
fn test_judge_reports_every_failed_rubric() {
    let project = Project::new(SCORE_RESPONSE);
    project.session("run-1");

    project
        .cmd()
        .args([
            "judge",
            "run-1",
            "--rubric",
            "code-quality",
            "--rubric",
            "missing",
            "--rubric",
            "gone",
        ])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("failed  missing"))
        .stderr(predicate::str::contains("failed  gone"))
        .stderr(predicate::str::contains("2 of 3 rubric(s) failed"));

    assert!(project.join("run-1/scores/code-quality.json").is_file());
}
