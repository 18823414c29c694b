//! Rubric loading
//!
//! Rubrics are markdown files in a rubrics directory. Names coming from the
//! command line are sanitized so they can never resolve outside that
//! directory.

mod parse;

use crate::error::{JudgeError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Extension every rubric file carries
pub const RUBRIC_EXTENSION: &str = "md";

/// A named sub-aspect of a rubric, scored independently
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimension {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Dimensions may be written as a bare name or as a mapping
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum DimensionSpec {
    Name(String),
    Full {
        id: String,
        #[serde(default)]
        description: Option<String>,
    },
}

impl From<DimensionSpec> for Dimension {
    fn from(spec: DimensionSpec) -> Self {
        match spec {
            DimensionSpec::Name(id) => Dimension {
                id,
                description: None,
            },
            DimensionSpec::Full { id, description } => Dimension { id, description },
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct RubricFrontmatter {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub dimensions: Vec<DimensionSpec>,
}

/// An immutable scoring guide
#[derive(Debug, Clone, PartialEq)]
pub struct Rubric {
    pub name: String,
    pub text: String,
    pub dimensions: Vec<Dimension>,
    pub weight: f64,
    pub path: PathBuf,
}

impl Rubric {
    /// Parse rubric content read from `path`
    pub fn parse(content: &str, path: &Path) -> Result<Self> {
        let (frontmatter, body) = parse::split_frontmatter(content, path)?;
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();

        Ok(Rubric {
            name: frontmatter.name.unwrap_or(stem),
            text: body,
            dimensions: frontmatter
                .dimensions
                .into_iter()
                .map(Dimension::from)
                .collect(),
            weight: frontmatter.weight.unwrap_or(1.0),
            path: path.to_path_buf(),
        })
    }

    pub fn dimension_ids(&self) -> Vec<&str> {
        self.dimensions.iter().map(|d| d.id.as_str()).collect()
    }
}

/// Loads rubrics from a directory
#[derive(Debug, Clone)]
pub struct RubricStore {
    root: PathBuf,
}

impl RubricStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Load a rubric by name or by explicit `.md` path
    #[tracing::instrument(skip(self), fields(root = %self.root.display()))]
    pub fn load(&self, name_or_path: &str) -> Result<Rubric> {
        let explicit = Path::new(name_or_path);
        let path = if has_rubric_extension(explicit) && explicit.is_file() {
            explicit.to_path_buf()
        } else {
            let resolved = resolve_rubric_path(name_or_path, &self.root)?;
            if !resolved.is_file() {
                return Err(JudgeError::not_found("rubric", resolved.display()));
            }
            ensure_canonical_descendant(&resolved, &self.root)?;
            resolved
        };

        let content = fs::read_to_string(&path)
            .map_err(|e| JudgeError::io_operation("read rubric", path.display(), e))?;
        let rubric = Rubric::parse(&content, &path)?;
        tracing::debug!(
            rubric = %rubric.name,
            dimensions = rubric.dimensions.len(),
            "loaded rubric"
        );
        Ok(rubric)
    }

    /// Sorted names of every rubric in the store
    pub fn list(&self) -> Result<Vec<String>> {
        if !self.root.is_dir() {
            return Err(JudgeError::not_found(
                "rubrics directory",
                self.root.display(),
            ));
        }

        let mut names = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();
            if path.is_file() && has_rubric_extension(&path) {
                if let Some(stem) = path.file_stem() {
                    names.push(stem.to_string_lossy().to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }
}

/// Load a rubric by name or path against `rubrics_dir`
pub fn load(name_or_path: &str, rubrics_dir: &Path) -> Result<Rubric> {
    RubricStore::new(rubrics_dir).load(name_or_path)
}

fn has_rubric_extension(path: &Path) -> bool {
    path.extension().is_some_and(|e| e == RUBRIC_EXTENSION)
}

/// Resolve a rubric name to a file path inside `rubrics_dir`.
///
/// Every `..` is removed and only the final path segment is kept, so the
/// result is always `rubrics_dir/<basename>.md`. The lexical containment
/// check runs regardless.
pub fn resolve_rubric_path(name: &str, rubrics_dir: &Path) -> Result<PathBuf> {
    let stripped = name.replace("..", "");
    let basename = stripped
        .split(['/', '\\'])
        .filter(|segment| !segment.trim().is_empty())
        .last()
        .unwrap_or("")
        .trim();

    if basename.is_empty() || basename == "." {
        return Err(JudgeError::not_found("rubric", name));
    }

    let file_name = if basename.ends_with(&format!(".{}", RUBRIC_EXTENSION)) {
        basename.to_string()
    } else {
        format!("{}.{}", basename, RUBRIC_EXTENSION)
    };

    let resolved = rubrics_dir.join(file_name);
    if !is_lexical_descendant(&resolved, rubrics_dir) {
        return Err(JudgeError::Security {
            path: resolved,
            root: rubrics_dir.to_path_buf(),
        });
    }
    Ok(resolved)
}

fn is_lexical_descendant(path: &Path, root: &Path) -> bool {
    let Ok(relative) = path.strip_prefix(root) else {
        return false;
    };
    let mut components = relative.components().peekable();
    components.peek().is_some() && components.all(|c| matches!(c, Component::Normal(_)))
}

/// Symlinks inside the rubrics directory must not point outside it
fn ensure_canonical_descendant(path: &Path, root: &Path) -> Result<()> {
    let canonical_root = root
        .canonicalize()
        .map_err(|_| JudgeError::not_found("rubrics directory", root.display()))?;
    let canonical = path
        .canonicalize()
        .map_err(|_| JudgeError::not_found("rubric", path.display()))?;

    if canonical.starts_with(&canonical_root) && canonical != canonical_root {
        Ok(())
    } else {
        Err(JudgeError::Security {
            path: canonical,
            root: canonical_root,
        })
    }
}
