//! Persisted judging results.
//!
//! One artifact per judging call. Single-mode artifacts live under the
//! session (`<session>/scores/<rubric>.json`); pairwise artifacts live under
//! the results root (`comparisons/<a>-vs-<b>/`).

use super::types::{BaselineComparison, Comparison, DimensionScore, Modifier, Score};
use crate::error::{JudgeError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const SCORES_DIR: &str = "scores";
pub const COMPARISONS_DIR: &str = "comparisons";
pub const COMPARISON_PREFIX: &str = "comparison-";
pub const BASELINE_COMPARISON_PREFIX: &str = "baseline-comparison-";

/// The `scores` block of a score artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactScores {
    pub overall: f64,
    pub base_score: u8,
    pub modifier: Modifier,
    #[serde(default)]
    pub dimensions: BTreeMap<String, DimensionScore>,
    pub rubric_total: f64,
    pub rubric_max: f64,
    #[serde(default = "default_weight")]
    pub rubric_weight: f64,
}

fn default_weight() -> f64 {
    1.0
}

/// `<session>/scores/<rubric>.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreArtifact {
    pub rubric: String,
    pub session_id: String,
    pub judged_at: DateTime<Utc>,
    pub model: String,
    #[serde(default)]
    pub files_judged: Vec<String>,
    pub scores: ArtifactScores,
    #[serde(default)]
    pub metrics: Value,
    #[serde(default)]
    pub justification: String,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub weaknesses: Vec<String>,
    #[serde(default)]
    pub raw_response: String,
}

impl ScoreArtifact {
    pub fn from_score(
        score: Score,
        rubric: &str,
        rubric_weight: f64,
        session_id: &str,
        model: &str,
        files_judged: Vec<String>,
        raw_response: String,
    ) -> Self {
        Self {
            rubric: rubric.to_string(),
            session_id: session_id.to_string(),
            judged_at: Utc::now(),
            model: model.to_string(),
            files_judged,
            scores: ArtifactScores {
                overall: score.overall,
                base_score: score.base_score,
                modifier: score.modifier,
                dimensions: score.dimensions,
                rubric_total: score.rubric_total,
                rubric_max: score.rubric_max,
                rubric_weight,
            },
            metrics: score.metrics,
            justification: score.justification,
            strengths: score.strengths,
            weaknesses: score.weaknesses,
            raw_response,
        }
    }
}

/// `comparisons/<a>-vs-<b>/comparison-<rubric>.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonArtifact {
    pub rubric: String,
    pub session_a: String,
    pub session_b: String,
    pub judged_at: DateTime<Utc>,
    pub model: String,
    #[serde(flatten)]
    pub comparison: Comparison,
    #[serde(default)]
    pub raw_response: String,
}

/// `comparisons/<baseline>-vs-<framework>/baseline-comparison-<rubric>.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaselineArtifact {
    pub rubric: String,
    pub baseline_session: String,
    pub framework_session: String,
    pub judged_at: DateTime<Utc>,
    pub model: String,
    #[serde(flatten)]
    pub comparison: BaselineComparison,
    #[serde(default)]
    pub raw_response: String,
}

/// Replace characters that cannot appear in a single file name component
pub fn artifact_key(name: &str) -> String {
    let key: String = name
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '-'
            }
        })
        .collect();
    let key = key.trim_matches('.');
    if key.is_empty() {
        "unnamed".to_string()
    } else {
        key.to_string()
    }
}

pub fn score_artifact_path(session_dir: &Path, rubric: &str) -> PathBuf {
    session_dir
        .join(SCORES_DIR)
        .join(format!("{}.json", artifact_key(rubric)))
}

pub fn comparison_dir(results_root: &Path, session_a: &str, session_b: &str) -> PathBuf {
    results_root.join(COMPARISONS_DIR).join(format!(
        "{}-vs-{}",
        artifact_key(session_a),
        artifact_key(session_b)
    ))
}

pub fn comparison_artifact_path(
    results_root: &Path,
    session_a: &str,
    session_b: &str,
    rubric: &str,
) -> PathBuf {
    comparison_dir(results_root, session_a, session_b).join(format!(
        "{}{}.json",
        COMPARISON_PREFIX,
        artifact_key(rubric)
    ))
}

pub fn baseline_artifact_path(
    results_root: &Path,
    baseline_session: &str,
    framework_session: &str,
    rubric: &str,
) -> PathBuf {
    comparison_dir(results_root, baseline_session, framework_session).join(format!(
        "{}{}.json",
        BASELINE_COMPARISON_PREFIX,
        artifact_key(rubric)
    ))
}

/// Write `contents` to `path` atomically.
///
/// The bytes go to a sibling temp file first and are renamed into place, so a
/// reader never sees a partial file. An existing file is replaced.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| JudgeError::io_operation("create directory", parent.display(), e))?;
    }

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| JudgeError::invalid_value("output path", path.display()))?;
    let temp_path = path.with_file_name(format!(".{}.tmp", file_name));

    fs::write(&temp_path, contents)
        .map_err(|e| JudgeError::io_operation("write", temp_path.display(), e))?;
    if let Err(e) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(JudgeError::io_operation("write", path.display(), e));
    }
    Ok(())
}

/// Serialize `value` as pretty JSON and write it with [`write_atomic`]
pub fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    write_atomic(path, json.as_bytes())?;
    tracing::info!(path = %path.display(), "wrote artifact");
    Ok(())
}

/// Read a JSON artifact of any kind
pub fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path)
        .map_err(|e| JudgeError::io_operation("read", path.display(), e))?;
    Ok(serde_json::from_str(&content)?)
}
