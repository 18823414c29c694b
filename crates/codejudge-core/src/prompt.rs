//! Judging prompt construction.
//!
//! Every builder is a pure function of its inputs so identical sessions
//! always produce byte-identical prompts.

use crate::files::CodeFile;
use crate::judge::types::{Margin, Modifier, Verdict, BASELINE_CATEGORIES};
use crate::rubric::Rubric;

const SCORING_METHOD: &str = r#"# Scoring Method

Score in two steps:

1. Pick the rubric level (1-5) whose description best matches the code. This is `base_score`.
2. Pick a modifier for how firmly the code sits within that level:
   - "weak": barely meets the level (-0.25)
   - "solid": clearly meets the level (+0)
   - "strong": meets the level and shows some traits of the next one (+0.25)

`overall` is `base_score` plus the modifier adjustment, so it always lies between 0.75 and 5.25."#;

const JSON_ONLY: &str = "Respond with the JSON object only. Do not add any prose, explanation or markdown outside the JSON. The response must be strict JSON: double-quoted keys, no comments, no trailing commas.";

fn push_rubric(out: &mut String, rubric: &Rubric) {
    out.push_str("# Rubric: ");
    out.push_str(&rubric.name);
    out.push_str("\n\n");
    out.push_str(rubric.text.trim());
    out.push_str("\n\n");

    if !rubric.dimensions.is_empty() {
        out.push_str("## Dimensions\n\nScore each dimension separately with the same two-step method:\n\n");
        for dimension in &rubric.dimensions {
            match &dimension.description {
                Some(description) => {
                    out.push_str(&format!("- `{}`: {}\n", dimension.id, description))
                }
                None => out.push_str(&format!("- `{}`\n", dimension.id)),
            }
        }
        out.push('\n');
    }
}

fn push_context(out: &mut String, context: Option<&str>) {
    if let Some(context) = context.map(str::trim).filter(|c| !c.is_empty()) {
        out.push_str("# Task Context\n\n");
        out.push_str(context);
        out.push_str("\n\n");
    }
}

fn fence_language(filename: &str) -> &str {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ext)
        .filter(|ext| !ext.contains('/'))
        .unwrap_or("")
}

fn push_files(out: &mut String, heading: &str, files: &[CodeFile]) {
    out.push_str("# ");
    out.push_str(heading);
    out.push_str("\n\n");

    if files.is_empty() {
        out.push_str("(no files)\n\n");
        return;
    }

    for file in files {
        out.push_str(&format!("## File: {}\n\n", file.filename));
        out.push_str(&format!("```{}\n", fence_language(&file.filename)));
        out.push_str(&file.content);
        if !file.content.ends_with('\n') {
            out.push('\n');
        }
        out.push_str("```\n\n");
    }
}

fn dimension_schema(rubric: &Rubric) -> String {
    if rubric.dimensions.is_empty() {
        return "{}".to_string();
    }
    let entries = rubric
        .dimensions
        .iter()
        .map(|d| {
            format!(
                "    \"{}\": {{\"base\": <1-5>, \"modifier\": \"{}\", \"score\": <number>}}",
                d.id,
                modifier_choices()
            )
        })
        .collect::<Vec<_>>()
        .join(",\n");
    format!("{{\n{}\n  }}", entries)
}

fn modifier_choices() -> String {
    Modifier::ALL
        .iter()
        .map(|m| m.as_str())
        .collect::<Vec<_>>()
        .join("|")
}

fn verdict_choices() -> String {
    Verdict::ALL
        .iter()
        .map(|v| v.as_str())
        .collect::<Vec<_>>()
        .join("|")
}

fn margin_choices() -> String {
    Margin::ALL
        .iter()
        .map(|m| m.as_str())
        .collect::<Vec<_>>()
        .join("|")
}

/// Prompt for scoring one session against a rubric
pub fn build_single_prompt(rubric: &Rubric, files: &[CodeFile], context: Option<&str>) -> String {
    let mut out = String::from(
        "You are an expert code reviewer. Evaluate the code below against the rubric.\n\n",
    );
    push_rubric(&mut out, rubric);
    push_context(&mut out, context);
    push_files(&mut out, "Code Under Review", files);
    out.push_str(SCORING_METHOD);
    out.push_str("\n\n# Required Response Format\n\nReturn JSON with this exact structure:\n");
    out.push_str(&format!(
        r#"{{
  "base_score": <integer 1-5>,
  "modifier": "{modifiers}",
  "overall": <base_score plus modifier adjustment>,
  "dimensions": {dimensions},
  "metrics": {{}},
  "justification": "<two or three sentences>",
  "strengths": ["..."],
  "weaknesses": ["..."]
}}"#,
        modifiers = modifier_choices(),
        dimensions = dimension_schema(rubric),
    ));
    out.push_str("\n\n");
    out.push_str(JSON_ONLY);
    out.push('\n');
    out
}

/// Prompt for comparing two sessions against a rubric
pub fn build_comparative_prompt(
    rubric: &Rubric,
    files_a: &[CodeFile],
    files_b: &[CodeFile],
    context: Option<&str>,
) -> String {
    let mut out = String::from(
        "You are an expert code reviewer. Compare implementation A and implementation B against the rubric.\n\n",
    );
    push_rubric(&mut out, rubric);
    push_context(&mut out, context);
    push_files(&mut out, "Implementation A", files_a);
    push_files(&mut out, "Implementation B", files_b);
    out.push_str(
        "# Comparison Method\n\n\
         Focus on meaningful differences that affect correctness, maintainability or the rubric criteria. \
         Do not decide on nitpicks such as naming taste or formatting. \
         If the differences are not meaningful, the verdict is \"equivalent\".\n\n\
         Score each implementation on the rubric's 1-5 scale as `score_a` and `score_b`.\n\n",
    );
    out.push_str("# Required Response Format\n\nReturn JSON with this exact structure:\n");
    out.push_str(&format!(
        r#"{{
  "verdict": "{verdicts}",
  "margin": "{margins}",
  "score_a": <1-5>,
  "score_b": <1-5>,
  "dimension_comparison": {{"<dimension>": "{verdicts}"}},
  "justification": "<two or three sentences>"
}}"#,
        verdicts = verdict_choices(),
        margins = margin_choices(),
    ));
    out.push_str("\n\n");
    out.push_str(JSON_ONLY);
    out.push('\n');
    out
}

/// Prompt for judging an assisted result against a zero-assistance baseline
pub fn build_baseline_prompt(
    rubric: &Rubric,
    files_baseline: &[CodeFile],
    files_framework: &[CodeFile],
    context: Option<&str>,
) -> String {
    let mut out = String::from(
        "You are an expert code reviewer. Implementation A is a baseline produced with zero assistance. \
         Implementation B was produced with the framework under evaluation. \
         Judge how much the framework improved on the baseline.\n\n",
    );
    push_rubric(&mut out, rubric);
    push_context(&mut out, context);
    push_files(&mut out, "Implementation A (baseline)", files_baseline);
    push_files(&mut out, "Implementation B (framework)", files_framework);

    out.push_str("# Improvement Categories\n\nRate the change from A to B in each category:\n\n");
    for category in BASELINE_CATEGORIES {
        out.push_str(&format!("- `{}`\n", category));
    }
    out.push_str(
        "\nUse `quality_delta` from 0 (no improvement) to 3 (transformative improvement). \
         Focus on meaningful differences, not nitpicks.\n\n",
    );
    out.push_str("# Required Response Format\n\nReturn JSON with this exact structure:\n");
    let categories = BASELINE_CATEGORIES
        .iter()
        .map(|c| {
            format!(
                "    \"{}\": \"significantly_improved|improved|equivalent|degraded\"",
                c
            )
        })
        .collect::<Vec<_>>()
        .join(",\n");
    out.push_str(&format!(
        r#"{{
  "verdict": "framework_better|equivalent|baseline_better",
  "quality_delta": <0-3>,
  "categories": {{
{categories}
  }},
  "time_saved_estimate": "none|minimal|moderate|significant",
  "score_baseline": <1-5>,
  "score_framework": <1-5>,
  "improvements": ["..."],
  "regressions": ["..."],
  "summary": "<two or three sentences>"
}}"#,
    ));
    out.push_str("\n\n");
    out.push_str(JSON_ONLY);
    out.push('\n');
    out
}
