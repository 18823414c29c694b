use super::{Dimension, RubricFrontmatter};
use crate::error::{JudgeError, Result};
use std::path::Path;

/// Split optional YAML frontmatter from a rubric body.
///
/// Content without a leading `---` has no frontmatter and is returned whole.
pub(crate) fn split_frontmatter(content: &str, path: &Path) -> Result<(RubricFrontmatter, String)> {
    let trimmed = content.trim_start();

    if !trimmed.starts_with("---") {
        return Ok((RubricFrontmatter::default(), content.trim().to_string()));
    }

    let after_first = &trimmed[3..];
    let end_pos = after_first.find("\n---").ok_or_else(|| {
        JudgeError::invalid_value(
            "rubric frontmatter",
            format!("{}: missing closing delimiter (---)", path.display()),
        )
    })?;

    let yaml_content = &after_first[..end_pos];
    let body_start = 3 + end_pos + 4;
    let body = if body_start < trimmed.len() {
        trimmed[body_start..].trim().to_string()
    } else {
        String::new()
    };

    let frontmatter: RubricFrontmatter = if yaml_content.trim().is_empty() {
        RubricFrontmatter::default()
    } else {
        serde_yaml::from_str(yaml_content).map_err(|e| {
            JudgeError::invalid_value("rubric frontmatter", format!("{}: {}", path.display(), e))
        })?
    };

    if let Some(weight) = frontmatter.weight {
        if !(weight.is_finite() && weight > 0.0) {
            return Err(JudgeError::invalid_value(
                "rubric weight",
                format!("{}: {}", path.display(), weight),
            ));
        }
    }

    let mut seen = std::collections::BTreeSet::new();
    for dimension in &frontmatter.dimensions {
        let id = Dimension::from(dimension.clone()).id;
        if id.trim().is_empty() || !seen.insert(id.clone()) {
            return Err(JudgeError::invalid_value(
                "rubric dimension",
                format!("{}: {:?}", path.display(), id),
            ));
        }
    }

    Ok((frontmatter, body))
}
