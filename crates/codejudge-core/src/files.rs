//! Source file collection for a session directory

use crate::error::{JudgeError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Directory names never descended into
const SKIPPED_DIRS: &[&str] = &[
    "node_modules",
    "target",
    "__pycache__",
    "venv",
    ".venv",
    "dist",
    "build",
    "scores",
];

/// Directory names whose contents are tests
const TEST_DIRS: &[&str] = &["tests", "test", "__tests__", "spec"];

/// Extensions treated as source code
const SOURCE_EXTENSIONS: &[&str] = &[
    "py", "rs", "js", "jsx", "ts", "tsx", "mjs", "cjs", "go", "java", "kt", "rb", "php", "c",
    "h", "cc", "cpp", "hpp", "cs", "swift", "scala", "sh", "sql", "lua", "ex", "exs", "dart",
];

/// A unit of code submitted to the judge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeFile {
    pub filename: String,
    pub content: String,
}

impl CodeFile {
    pub fn new(filename: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            content: content.into(),
        }
    }
}

/// Code and tests collected from one session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionFiles {
    pub code: Vec<CodeFile>,
    pub tests: Vec<CodeFile>,
}

impl SessionFiles {
    pub fn is_empty(&self) -> bool {
        self.code.is_empty() && self.tests.is_empty()
    }

    pub fn len(&self) -> usize {
        self.code.len() + self.tests.len()
    }

    /// Code first, then tests
    pub fn all(&self) -> Vec<CodeFile> {
        self.code.iter().chain(self.tests.iter()).cloned().collect()
    }

    pub fn filenames(&self) -> Vec<String> {
        self.code
            .iter()
            .chain(self.tests.iter())
            .map(|f| f.filename.clone())
            .collect()
    }
}

/// Whether a relative path names a test file
pub fn is_test_path(path: &Path) -> bool {
    let in_test_dir = path
        .parent()
        .map(|parent| {
            parent.components().any(|c| {
                TEST_DIRS
                    .iter()
                    .any(|d| c.as_os_str().eq_ignore_ascii_case(d))
            })
        })
        .unwrap_or(false);
    if in_test_dir {
        return true;
    }

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    file_name.starts_with("test_")
        || stem.ends_with("_test")
        || stem.ends_with(".test")
        || stem.ends_with("_spec")
        || stem.ends_with(".spec")
}

fn is_source_file(path: &Path) -> bool {
    path.extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .is_some_and(|e| SOURCE_EXTENSIONS.contains(&e.as_str()))
}

fn is_skipped_dir(entry: &DirEntry) -> bool {
    if entry.depth() == 0 || !entry.file_type().is_dir() {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    name.starts_with('.') || SKIPPED_DIRS.contains(&&*name)
}

/// Collect source files from a session directory.
///
/// When `code/` or `tests/` exist only those subtrees are read; everything
/// under `tests/` counts as a test. Otherwise the whole session directory is
/// walked and files are bucketed by [`is_test_path`].
pub fn collect_session_files(session_dir: &Path, max_file_bytes: u64) -> Result<SessionFiles> {
    if !session_dir.is_dir() {
        return Err(JudgeError::not_found(
            "session directory",
            session_dir.display(),
        ));
    }

    let code_dir = session_dir.join("code");
    let tests_dir = session_dir.join("tests");
    let mut files = SessionFiles::default();

    if code_dir.is_dir() || tests_dir.is_dir() {
        if code_dir.is_dir() {
            for (relative, file) in walk_sources(&code_dir, max_file_bytes) {
                if is_test_path(&relative) {
                    files.tests.push(file);
                } else {
                    files.code.push(file);
                }
            }
        }
        if tests_dir.is_dir() {
            files
                .tests
                .extend(walk_sources(&tests_dir, max_file_bytes).into_iter().map(|(_, f)| f));
        }
    } else {
        for (relative, file) in walk_sources(session_dir, max_file_bytes) {
            if is_test_path(&relative) {
                files.tests.push(file);
            } else {
                files.code.push(file);
            }
        }
    }

    tracing::debug!(
        session = %session_dir.display(),
        code = files.code.len(),
        tests = files.tests.len(),
        "collected session files"
    );
    Ok(files)
}

/// Whether `dir` holds a generated session (`code/` or `tests/` inside it)
pub fn is_code_session(dir: &Path) -> bool {
    dir.join("code").is_dir() || dir.join("tests").is_dir()
}

/// Session directories below `root` that can be judged, sorted by path.
///
/// Hidden and result directories are skipped and the walk does not descend
/// into a session once found.
pub fn discover_code_sessions(root: &Path) -> Result<Vec<PathBuf>> {
    if !root.is_dir() {
        return Err(JudgeError::not_found("results root", root.display()));
    }

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
        if name.starts_with('.') || name == "comparisons" || SKIPPED_DIRS.contains(&&*name) {
            walker.skip_current_dir();
            continue;
        }
        if is_code_session(entry.path()) {
            sessions.push(entry.path().to_path_buf());
            walker.skip_current_dir();
        }
    }
    Ok(sessions)
}

/// Source files under `root`, sorted by relative path
fn walk_sources(root: &Path, max_file_bytes: u64) -> Vec<(PathBuf, CodeFile)> {
    let mut found = Vec::new();

    for entry in WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_skipped_dir(e))
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(root = %root.display(), error = %e, "skipping unreadable entry");
                continue;
            }
        };
        let path = entry.path();
        if !entry.file_type().is_file() || !is_source_file(path) {
            continue;
        }

        let size = entry.metadata().map(|m| m.len()).unwrap_or(0);
        if size > max_file_bytes {
            tracing::warn!(path = %path.display(), size, max_file_bytes, "skipping oversized file");
            continue;
        }

        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "skipping unreadable file");
                continue;
            }
        };

        let relative = path.strip_prefix(root).unwrap_or(path).to_path_buf();
        let filename = relative.to_string_lossy().replace('\\', "/");
        found.push((relative, CodeFile::new(filename, content)));
    }

    found.sort_by(|a, b| a.0.cmp(&b.0));
    found
}
