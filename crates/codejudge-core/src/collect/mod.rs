//! Discovery of score artifacts across a results tree.
//!
//! Collection never aborts on a bad file: anything unreadable or malformed is
//! skipped and reported in [`Collection::warnings`].

pub mod comparisons;
pub mod formats;

pub use comparisons::{collect_comparisons, BaselineRecord, ComparisonCollection, ComparisonRecord};
pub use formats::{default_formats, ScoreFormat};

use crate::error::{JudgeError, Result};
use crate::judge::artifact::{COMPARISONS_DIR, SCORES_DIR};
use formats::LEGACY_SCORE_FILE;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub const METADATA_FILE: &str = "metadata.json";
pub const DEFAULT_VARIANT: &str = "default";

/// One rubric's score for a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RubricScore {
    pub rubric: String,
    pub overall: f64,
    pub rubric_total: f64,
    pub rubric_max: f64,
    pub weight: f64,
}

/// All scores found for one session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionScoreRecord {
    pub session_id: String,
    pub variant: String,
    pub path: PathBuf,
    /// Which layout the scores were read from
    pub format: String,
    pub scores: Vec<RubricScore>,
}

impl SessionScoreRecord {
    pub fn score_for(&self, rubric: &str) -> Option<&RubricScore> {
        self.scores.iter().find(|s| s.rubric == rubric)
    }
}

/// Sessions grouped by variant, plus everything skipped along the way
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    pub variants: BTreeMap<String, Vec<SessionScoreRecord>>,
    pub warnings: Vec<String>,
}

impl Collection {
    pub fn session_count(&self) -> usize {
        self.variants.values().map(Vec::len).sum()
    }

    pub fn sessions(&self) -> impl Iterator<Item = &SessionScoreRecord> {
        self.variants.values().flatten()
    }
}

fn is_session_dir(dir: &Path) -> bool {
    dir.join(SCORES_DIR).is_dir() || dir.join(LEGACY_SCORE_FILE).is_file()
}

/// Session directories below `root`, sorted by path
pub fn discover_sessions(root: &Path) -> Vec<PathBuf> {
    let mut sessions = Vec::new();
    let mut walker = WalkDir::new(root)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter();

    while let Some(entry) = walker.next() {
        let Ok(entry) = entry else {
            continue;
        };
        if !entry.file_type().is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        if name.starts_with('.') || name == COMPARISONS_DIR || name == SCORES_DIR {
            walker.skip_current_dir();
            continue;
        }
        if is_session_dir(entry.path()) {
            sessions.push(entry.path().to_path_buf());
            walker.skip_current_dir();
        }
    }

    sessions
}

/// `metadata.json` variant, else the enclosing directory below the root
pub fn session_variant(root: &Path, session_dir: &Path, warnings: &mut Vec<String>) -> String {
    let metadata_path = session_dir.join(METADATA_FILE);
    if metadata_path.is_file() {
        let parsed = fs::read_to_string(&metadata_path)
            .map_err(|e| e.to_string())
            .and_then(|c| serde_json::from_str::<Value>(&c).map_err(|e| e.to_string()));
        match parsed {
            Ok(value) => {
                if let Some(variant) = value
                    .get("variant")
                    .and_then(Value::as_str)
                    .map(str::trim)
                    .filter(|v| !v.is_empty())
                {
                    return variant.to_string();
                }
            }
            Err(e) => {
                let warning = format!("{}: malformed metadata: {}", metadata_path.display(), e);
                tracing::warn!("{}", warning);
                warnings.push(warning);
            }
        }
    }

    match session_dir.parent() {
        Some(parent) if parent != root => parent
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| DEFAULT_VARIANT.to_string()),
        _ => DEFAULT_VARIANT.to_string(),
    }
}

/// Read one session with the first format that yields scores
fn read_session(
    root: &Path,
    session_dir: &Path,
    formats: &[Box<dyn ScoreFormat>],
    warnings: &mut Vec<String>,
) -> Option<SessionScoreRecord> {
    let session_id = session_dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())?;

    for format in formats {
        if !format.detect(session_dir) {
            continue;
        }
        let scores = format.read(session_dir, warnings);
        if scores.is_empty() {
            continue;
        }
        return Some(SessionScoreRecord {
            variant: session_variant(root, session_dir, warnings),
            session_id,
            path: session_dir.to_path_buf(),
            format: format.name().to_string(),
            scores,
        });
    }

    let warning = format!("{}: no valid scores found", session_dir.display());
    tracing::warn!("{}", warning);
    warnings.push(warning);
    None
}

/// Collect every session's scores under `results_root`, grouped by variant
#[tracing::instrument(fields(root = %results_root.display()))]
pub fn collect(results_root: &Path) -> Result<Collection> {
    collect_with_formats(results_root, &default_formats())
}

pub fn collect_with_formats(
    results_root: &Path,
    formats: &[Box<dyn ScoreFormat>],
) -> Result<Collection> {
    if !results_root.is_dir() {
        return Err(JudgeError::not_found(
            "results directory",
            results_root.display(),
        ));
    }

    let start = std::time::Instant::now();
    let mut collection = Collection::default();

    for session_dir in discover_sessions(results_root) {
        if let Some(record) =
            read_session(results_root, &session_dir, formats, &mut collection.warnings)
        {
            collection
                .variants
                .entry(record.variant.clone())
                .or_default()
                .push(record);
        }
    }

    for records in collection.variants.values_mut() {
        records.sort_by(|a, b| a.session_id.cmp(&b.session_id).then(a.path.cmp(&b.path)));
    }

    crate::trace_time!(start, "collect", sessions = collection.session_count());
    Ok(collection)
}

#[cfg(test)]
mod tests;
