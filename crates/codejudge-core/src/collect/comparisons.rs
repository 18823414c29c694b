//! Pairwise and baseline-relative comparison artifacts

use crate::error::{JudgeError, Result};
use crate::judge::artifact::{BASELINE_COMPARISON_PREFIX, COMPARISONS_DIR, COMPARISON_PREFIX};
use crate::judge::types::{BaselineComparison, Comparison};
use crate::judge::validate::{validate_baseline, validate_comparison};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

/// A validated `comparison-<rubric>.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRecord {
    pub rubric: String,
    pub session_a: String,
    pub session_b: String,
    pub comparison: Comparison,
}

/// A validated `baseline-comparison-<rubric>.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaselineRecord {
    pub rubric: String,
    pub baseline_session: String,
    pub framework_session: String,
    pub comparison: BaselineComparison,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComparisonCollection {
    pub comparisons: Vec<ComparisonRecord>,
    pub baselines: Vec<BaselineRecord>,
    pub warnings: Vec<String>,
}

impl ComparisonCollection {
    pub fn is_empty(&self) -> bool {
        self.comparisons.is_empty() && self.baselines.is_empty()
    }
}

enum Kind {
    Pairwise,
    Baseline,
}

/// Classify a file name, returning the rubric it names
fn classify(file_name: &str) -> Option<(Kind, &str)> {
    let stem = file_name.strip_suffix(".json")?;
    // Checked first: the baseline prefix ends with the pairwise one.
    if let Some(rubric) = stem.strip_prefix(BASELINE_COMPARISON_PREFIX) {
        return Some((Kind::Baseline, rubric));
    }
    stem.strip_prefix(COMPARISON_PREFIX)
        .map(|rubric| (Kind::Pairwise, rubric))
}

/// Session ids from a `<a>-vs-<b>` directory name
fn pair_from_dir(path: &Path) -> Option<(String, String)> {
    let dir = path.parent()?.file_name()?.to_string_lossy().into_owned();
    let (a, b) = dir.split_once("-vs-")?;
    Some((a.to_string(), b.to_string()))
}

fn string_or(value: &Value, field: &str, fallback: Option<&str>) -> Option<String> {
    value
        .get(field)
        .and_then(Value::as_str)
        .map(str::to_string)
        .or_else(|| fallback.map(str::to_string))
}

fn read_record(path: &Path, kind: &Kind, rubric: &str, out: &mut ComparisonCollection) -> Result<()> {
    let content = fs::read_to_string(path)?;
    let value: Value = serde_json::from_str(&content)?;
    let rubric = string_or(&value, "rubric", Some(rubric)).unwrap_or_default();
    let pair = pair_from_dir(path);
    let (dir_a, dir_b) = match &pair {
        Some((a, b)) => (Some(a.as_str()), Some(b.as_str())),
        None => (None, None),
    };
    let missing = |field: &str| JudgeError::invalid_score(field, "missing session id");

    match kind {
        Kind::Pairwise => out.comparisons.push(ComparisonRecord {
            session_a: string_or(&value, "session_a", dir_a).ok_or_else(|| missing("session_a"))?,
            session_b: string_or(&value, "session_b", dir_b).ok_or_else(|| missing("session_b"))?,
            comparison: validate_comparison(&value)?,
            rubric,
        }),
        Kind::Baseline => out.baselines.push(BaselineRecord {
            baseline_session: string_or(&value, "baseline_session", dir_a)
                .ok_or_else(|| missing("baseline_session"))?,
            framework_session: string_or(&value, "framework_session", dir_b)
                .ok_or_else(|| missing("framework_session"))?,
            comparison: validate_baseline(&value)?,
            rubric,
        }),
    }
    Ok(())
}

/// Collect comparison artifacts under `<results_root>/comparisons/`
#[tracing::instrument(fields(root = %results_root.display()))]
pub fn collect_comparisons(results_root: &Path) -> Result<ComparisonCollection> {
    if !results_root.is_dir() {
        return Err(JudgeError::not_found(
            "results directory",
            results_root.display(),
        ));
    }

    let mut out = ComparisonCollection::default();
    let dir = results_root.join(COMPARISONS_DIR);
    if !dir.is_dir() {
        return Ok(out);
    }

    for entry in WalkDir::new(&dir).sort_by_file_name().into_iter() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                let warning = format!("{}: {}", dir.display(), e);
                tracing::warn!("{}", warning);
                out.warnings.push(warning);
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let file_name = entry.file_name().to_string_lossy().into_owned();
        let Some((kind, rubric)) = classify(&file_name) else {
            continue;
        };

        if let Err(e) = read_record(entry.path(), &kind, rubric, &mut out) {
            let warning = format!("{}: {}", entry.path().display(), e);
            tracing::warn!("{}", warning);
            out.warnings.push(warning);
        }
    }

    tracing::debug!(
        comparisons = out.comparisons.len(),
        baselines = out.baselines.len(),
        "collected comparisons"
    );
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_classify() {
        assert!(matches!(
            classify("comparison-quality.json"),
            Some((Kind::Pairwise, "quality"))
        ));
        assert!(matches!(
            classify("baseline-comparison-quality.json"),
            Some((Kind::Baseline, "quality"))
        ));
        assert!(classify("notes.json").is_none());
        assert!(classify("comparison-quality.txt").is_none());
    }

    #[test]
    fn test_collect_both_kinds() {
        let dir = tempdir().unwrap();
        write(
            dir.path(),
            "comparisons/s1-vs-s2/comparison-quality.json",
            r#"{"rubric": "quality", "session_a": "s1", "session_b": "s2",
                "verdict": "b_better", "margin": "slight", "score_a": 3, "score_b": 4}"#,
        );
        write(
            dir.path(),
            "comparisons/base-vs-fw/baseline-comparison-quality.json",
            r#"{"verdict": "equivalent", "quality_delta": 0,
                "score_baseline": 3, "score_framework": 3}"#,
        );
        write(
            dir.path(),
            "comparisons/s1-vs-s2/comparison-tests.json",
            r#"{"verdict": "maybe", "margin": "slight", "score_a": 3, "score_b": 4}"#,
        );

        let found = collect_comparisons(dir.path()).unwrap();
        assert_eq!(found.comparisons.len(), 1);
        assert_eq!(found.comparisons[0].session_b, "s2");
        assert_eq!(found.baselines.len(), 1);
        assert_eq!(found.baselines[0].baseline_session, "base");
        assert_eq!(found.baselines[0].framework_session, "fw");
        assert_eq!(found.baselines[0].rubric, "quality");
        assert_eq!(found.warnings.len(), 1);
        assert!(found.warnings[0].contains("comparison-tests.json"));
    }

    #[test]
    fn test_no_comparisons_dir_is_empty() {
        let dir = tempdir().unwrap();
        assert!(collect_comparisons(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn test_missing_root_is_not_found() {
        let dir = tempdir().unwrap();
        let err = collect_comparisons(&dir.path().join("absent")).unwrap_err();
        assert!(matches!(err, JudgeError::NotFound { .. }));
    }
}
