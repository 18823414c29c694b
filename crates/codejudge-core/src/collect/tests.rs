//! Tests for score collection.

use super::*;
use tempfile::tempdir;

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn artifact(rubric: &str, overall: f64) -> String {
    serde_json::json!({
        "rubric": rubric,
        "session_id": "ignored",
        "scores": {"overall": overall, "rubric_total": overall, "rubric_max": 5.25},
    })
    .to_string()
}

#[test]
fn test_variant_from_parent_directory() {
    let dir = tempdir().unwrap();
    write(dir.path(), "with-skill/run-1/scores/quality.json", &artifact("quality", 4.0));
    write(dir.path(), "with-skill/run-2/scores/quality.json", &artifact("quality", 4.5));
    write(dir.path(), "without-skill/run-3/scores/quality.json", &artifact("quality", 3.0));

    let collection = collect(dir.path()).unwrap();
    assert_eq!(
        collection.variants.keys().collect::<Vec<_>>(),
        vec!["with-skill", "without-skill"]
    );
    assert_eq!(collection.variants["with-skill"].len(), 2);
    assert_eq!(collection.variants["with-skill"][0].session_id, "run-1");
    assert!(collection.warnings.is_empty());
}

#[test]
fn test_variant_from_metadata_wins() {
    let dir = tempdir().unwrap();
    write(dir.path(), "batch/run-1/scores/quality.json", &artifact("quality", 4.0));
    write(dir.path(), "batch/run-1/metadata.json", r#"{"variant": "treatment"}"#);
    write(dir.path(), "run-2/scores/quality.json", &artifact("quality", 3.0));

    let collection = collect(dir.path()).unwrap();
    assert_eq!(collection.variants["treatment"][0].session_id, "run-1");
    assert_eq!(collection.variants[DEFAULT_VARIANT][0].session_id, "run-2");
}

#[test]
fn test_malformed_metadata_falls_back_with_warning() {
    let dir = tempdir().unwrap();
    write(dir.path(), "arm/run-1/scores/quality.json", &artifact("quality", 4.0));
    write(dir.path(), "arm/run-1/metadata.json", "{not json");

    let collection = collect(dir.path()).unwrap();
    assert!(collection.variants.contains_key("arm"));
    assert_eq!(collection.warnings.len(), 1);
}

#[test]
fn test_mixed_legacy_and_current_trees() {
    let dir = tempdir().unwrap();
    // Current format only
    write(dir.path(), "arm/new/scores/quality.json", &artifact("quality", 4.0));
    // Legacy only
    write(dir.path(), "arm/old/score.json", r#"[{"rubric": "quality", "score": 3}]"#);
    // Both: current wins
    write(dir.path(), "arm/both/scores/quality.json", &artifact("quality", 5.0));
    write(dir.path(), "arm/both/score.json", r#"[{"rubric": "quality", "score": 1}]"#);

    let collection = collect(dir.path()).unwrap();
    let sessions = &collection.variants["arm"];
    assert_eq!(sessions.len(), 3);

    let by_id = |id: &str| sessions.iter().find(|s| s.session_id == id).unwrap();
    assert_eq!(by_id("new").format, "scores-dir");
    assert_eq!(by_id("old").format, "legacy-score-file");
    assert_eq!(by_id("old").scores[0].overall, 3.0);
    assert_eq!(by_id("both").format, "scores-dir");
    assert_eq!(by_id("both").scores[0].overall, 5.0);
}

#[test]
fn test_empty_scores_dir_falls_back_to_legacy() {
    let dir = tempdir().unwrap();
    write(dir.path(), "arm/run/scores/broken.json", "oops");
    write(dir.path(), "arm/run/score.json", r#"{"scores": {"overall": 4}}"#);

    let collection = collect(dir.path()).unwrap();
    let session = &collection.variants["arm"][0];
    assert_eq!(session.format, "legacy-score-file");
    assert_eq!(session.scores[0].rubric, "default");
    assert_eq!(collection.warnings.len(), 1);
}

#[test]
fn test_session_without_valid_scores_is_skipped() {
    let dir = tempdir().unwrap();
    write(dir.path(), "arm/run/score.json", "[]");

    let collection = collect(dir.path()).unwrap();
    assert_eq!(collection.session_count(), 0);
    assert!(collection.warnings[0].contains("no valid scores"));
}

#[test]
fn test_comparisons_dir_is_not_a_session() {
    let dir = tempdir().unwrap();
    write(
        dir.path(),
        "comparisons/a-vs-b/scores/quality.json",
        &artifact("quality", 4.0),
    );
    write(dir.path(), "arm/run/scores/quality.json", &artifact("quality", 4.0));

    let sessions = discover_sessions(dir.path());
    assert_eq!(sessions, vec![dir.path().join("arm/run")]);
}

#[test]
fn test_missing_root_is_not_found() {
    let dir = tempdir().unwrap();
    let err = collect(&dir.path().join("missing")).unwrap_err();
    assert!(matches!(err, JudgeError::NotFound { .. }));
}
