//! Score file layouts, newest first.
//!
//! Each layout is a [`ScoreFormat`] adapter. The collector tries them in
//! [`default_formats`] order and keeps the first non-empty result, so old
//! result trees keep working as the artifact format evolves.

use super::RubricScore;
use crate::judge::artifact::SCORES_DIR;
use crate::judge::types::{MAX_SCORE, MIN_SCORE};
use serde_json::Value;
use std::fs;
use std::path::Path;

pub const LEGACY_SCORE_FILE: &str = "score.json";
const LEGACY_MIN: f64 = 1.0;
const LEGACY_MAX: f64 = 5.0;

/// Reads the scores one session directory holds in a particular layout
pub trait ScoreFormat {
    fn name(&self) -> &'static str;

    /// Whether `session_dir` has files in this layout at all
    fn detect(&self, session_dir: &Path) -> bool;

    /// Valid scores found; problems are appended to `warnings`
    fn read(&self, session_dir: &Path, warnings: &mut Vec<String>) -> Vec<RubricScore>;
}

/// `<session>/scores/<rubric>.json` artifacts
pub struct ScoresDirFormat;

/// `<session>/score.json`, either a `[{rubric, score}]` list or `{rubric?, scores: {overall}}`
pub struct LegacyScoreFileFormat;

pub fn default_formats() -> Vec<Box<dyn ScoreFormat>> {
    vec![Box::new(ScoresDirFormat), Box::new(LegacyScoreFileFormat)]
}

fn warn(warnings: &mut Vec<String>, path: &Path, message: impl std::fmt::Display) {
    let warning = format!("{}: {}", path.display(), message);
    tracing::warn!("{}", warning);
    warnings.push(warning);
}

fn read_value(path: &Path, warnings: &mut Vec<String>) -> Option<Value> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            warn(warnings, path, format!("unreadable: {}", e));
            return None;
        }
    };
    match serde_json::from_str(&content) {
        Ok(value) => Some(value),
        Err(e) => {
            warn(warnings, path, format!("malformed JSON: {}", e));
            None
        }
    }
}

fn check_range(score: &RubricScore, min: f64, max: f64, path: &Path, warnings: &mut Vec<String>) {
    if score.overall < min || score.overall > max {
        warn(
            warnings,
            path,
            format!(
                "rubric {} score {} is outside {}-{}; kept",
                score.rubric, score.overall, min, max
            ),
        );
    }
}

/// A rubric name from the document, falling back to `fallback`
fn rubric_name(object: &serde_json::Map<String, Value>, fallback: &str) -> String {
    object
        .get("rubric")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(fallback)
        .to_string()
}

/// Parse `{rubric?, scores: {overall, rubric_total?, rubric_max?, rubric_weight?}}`
fn scores_block(value: &Value, fallback_rubric: &str) -> Option<RubricScore> {
    let object = value.as_object()?;
    let scores = object.get("scores")?.as_object()?;
    let overall = scores.get("overall")?.as_f64()?;
    let field = |name: &str| scores.get(name).and_then(Value::as_f64);

    Some(RubricScore {
        rubric: rubric_name(object, fallback_rubric),
        overall,
        rubric_total: field("rubric_total").unwrap_or(overall),
        rubric_max: field("rubric_max").unwrap_or(MAX_SCORE),
        weight: field("rubric_weight").unwrap_or(1.0),
    })
}

impl ScoreFormat for ScoresDirFormat {
    fn name(&self) -> &'static str {
        "scores-dir"
    }

    fn detect(&self, session_dir: &Path) -> bool {
        session_dir.join(SCORES_DIR).is_dir()
    }

    fn read(&self, session_dir: &Path, warnings: &mut Vec<String>) -> Vec<RubricScore> {
        let dir = session_dir.join(SCORES_DIR);
        let mut paths: Vec<_> = match fs::read_dir(&dir) {
            Ok(entries) => entries
                .filter_map(|e| e.ok())
                .map(|e| e.path())
                .filter(|p| p.is_file() && p.extension().is_some_and(|e| e == "json"))
                .filter(|p| {
                    !p.file_name()
                        .is_some_and(|n| n.to_string_lossy().starts_with('.'))
                })
                .collect(),
            Err(e) => {
                warn(warnings, &dir, format!("unreadable: {}", e));
                return Vec::new();
            }
        };
        paths.sort();

        let mut scores = Vec::new();
        for path in paths {
            let Some(value) = read_value(&path, warnings) else {
                continue;
            };
            let stem = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            match scores_block(&value, &stem) {
                Some(score) => {
                    check_range(&score, MIN_SCORE, MAX_SCORE, &path, warnings);
                    scores.push(score);
                }
                None => warn(warnings, &path, "missing numeric scores.overall"),
            }
        }
        scores
    }
}

impl ScoreFormat for LegacyScoreFileFormat {
    fn name(&self) -> &'static str {
        "legacy-score-file"
    }

    fn detect(&self, session_dir: &Path) -> bool {
        session_dir.join(LEGACY_SCORE_FILE).is_file()
    }

    fn read(&self, session_dir: &Path, warnings: &mut Vec<String>) -> Vec<RubricScore> {
        let path = session_dir.join(LEGACY_SCORE_FILE);
        let Some(value) = read_value(&path, warnings) else {
            return Vec::new();
        };

        let scores: Vec<RubricScore> = match &value {
            Value::Array(entries) => entries
                .iter()
                .enumerate()
                .filter_map(|(i, entry)| {
                    let parsed = legacy_entry(entry);
                    if parsed.is_none() {
                        warn(warnings, &path, format!("entry {} lacks rubric and numeric score", i));
                    }
                    parsed
                })
                .collect(),
            Value::Object(_) => match scores_block(&value, "default") {
                Some(score) => vec![score],
                None => {
                    warn(warnings, &path, "missing numeric scores.overall");
                    Vec::new()
                }
            },
            _ => {
                warn(warnings, &path, "expected a JSON array or object");
                Vec::new()
            }
        };

        for score in &scores {
            check_range(score, LEGACY_MIN, LEGACY_MAX, &path, warnings);
        }
        scores
    }
}

/// `{rubric, score}`
fn legacy_entry(entry: &Value) -> Option<RubricScore> {
    let object = entry.as_object()?;
    let rubric = object.get("rubric")?.as_str()?.trim();
    if rubric.is_empty() {
        return None;
    }
    let overall = object.get("score")?.as_f64()?;
    Some(RubricScore {
        rubric: rubric.to_string(),
        overall,
        rubric_total: overall,
        rubric_max: MAX_SCORE,
        weight: 1.0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_scores_dir_reads_artifacts() {
        let dir = tempdir().unwrap();
        let scores = dir.path().join("scores");
        fs::create_dir_all(&scores).unwrap();
        fs::write(
            scores.join("quality.json"),
            r#"{"rubric": "code-quality", "scores": {"overall": 4.25, "rubric_total": 8.5, "rubric_max": 10.5}}"#,
        )
        .unwrap();
        fs::write(scores.join("tests.json"), r#"{"scores": {"overall": 3}}"#).unwrap();
        fs::write(scores.join("broken.json"), "{nope").unwrap();

        let mut warnings = Vec::new();
        let found = ScoresDirFormat.read(dir.path(), &mut warnings);

        assert_eq!(found.len(), 2);
        assert_eq!(found[0].rubric, "code-quality");
        assert_eq!(found[0].rubric_total, 8.5);
        assert_eq!(found[1].rubric, "tests");
        assert_eq!(found[1].rubric_max, MAX_SCORE);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("broken.json"));
    }

    #[test]
    fn test_out_of_range_kept_with_warning() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("scores")).unwrap();
        fs::write(
            dir.path().join("scores/q.json"),
            r#"{"scores": {"overall": 9}}"#,
        )
        .unwrap();

        let mut warnings = Vec::new();
        let found = ScoresDirFormat.read(dir.path(), &mut warnings);
        assert_eq!(found[0].overall, 9.0);
        assert!(warnings[0].contains("outside"));
    }

    #[test]
    fn test_legacy_array() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("score.json"),
            r#"[{"rubric": "quality", "score": 4}, {"rubric": "tests"}, {"rubric": "docs", "score": 2.5}]"#,
        )
        .unwrap();

        let mut warnings = Vec::new();
        let found = LegacyScoreFileFormat.read(dir.path(), &mut warnings);
        let names: Vec<_> = found.iter().map(|s| s.rubric.as_str()).collect();
        assert_eq!(names, vec!["quality", "docs"]);
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_legacy_object() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("score.json"),
            r#"{"rubric": "quality", "scores": {"overall": 3.5}}"#,
        )
        .unwrap();

        let mut warnings = Vec::new();
        let found = LegacyScoreFileFormat.read(dir.path(), &mut warnings);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].overall, 3.5);
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_legacy_range_is_one_to_five() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("score.json"),
            r#"[{"rubric": "quality", "score": 5.25}]"#,
        )
        .unwrap();

        let mut warnings = Vec::new();
        LegacyScoreFileFormat.read(dir.path(), &mut warnings);
        assert_eq!(warnings.len(), 1);
    }
}
