use crate::support::{Project, SCORE_RESPONSE};
use predicates::prelude::*;

#[test]
fn test_rubrics_lists_names() {
    let project = Project::new(SCORE_RESPONSE);
    project.write("rubrics/testing.md", "5: thorough\n1: none\n");
    project.write("rubrics/notes.txt", "ignored");

    project
        .cmd()
        .arg("rubrics")
        .assert()
        .success()
        .stdout("code-quality\ntesting\n");
}

#[test]
fn test_rubrics_json() {
    let project = Project::new(SCORE_RESPONSE);
    project.write(
        "rubrics/testing.md",
        "---\nweight: 2.0\ndimensions:\n  - coverage\n  - isolation\n---\n5: thorough\n",
    );

    let output = project
        .cmd()
        .args(["--format", "json", "rubrics"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let rubrics: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(rubrics[1]["name"], "testing");
    assert_eq!(rubrics[1]["weight"], 2.0);
    assert_eq!(rubrics[1]["dimensions"], serde_json::json!(["coverage", "isolation"]));
}

#[test]
fn test_rubrics_missing_directory() {
    let project = Project::new(SCORE_RESPONSE);
    std::fs::remove_dir_all(project.join("rubrics")).unwrap();

    project
        .cmd()
        .arg("rubrics")
        .assert()
        .code(3)
        .stderr(predicate::str::contains("rubrics directory not found"));
}
