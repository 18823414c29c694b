//! Validation of untyped judge documents into typed judgments.
//!
//! The judge may return any shape. Everything is checked here so loose maps
//! never travel further into the engine.

use super::types::{
    BaselineComparison, BaselineVerdict, CategoryChange, Comparison, DimensionScore, JudgeMode,
    Judgment, Margin, Modifier, Score, TimeSaved, Verdict, DIMENSION_MAX, MAX_SCORE, MIN_SCORE,
};
use crate::bail_score;
use crate::error::{JudgeError, Result};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::str::FromStr;

/// Tolerance when comparing a reported score with the derived one
const SCORE_EPSILON: f64 = 1e-6;

/// Validate a parsed document for the given mode
pub fn validate(mode: JudgeMode, value: &Value) -> Result<Judgment> {
    match mode {
        JudgeMode::Single => validate_score(value).map(Judgment::Score),
        JudgeMode::Comparative => validate_comparison(value).map(Judgment::Comparison),
        JudgeMode::Baseline => validate_baseline(value).map(Judgment::Baseline),
    }
}

fn as_object<'a>(value: &'a Value, field: &str) -> Result<&'a Map<String, Value>> {
    value
        .as_object()
        .ok_or_else(|| JudgeError::invalid_score(field, "expected a JSON object"))
}

/// Numbers may arrive as JSON numbers or numeric strings
fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|n| n.is_finite())
}

fn required_number(object: &Map<String, Value>, field: &str) -> Result<f64> {
    match object.get(field) {
        None | Some(Value::Null) => bail_score!(field, "missing"),
        Some(value) => number(value)
            .ok_or_else(|| JudgeError::invalid_score(field, format!("{} is not a number", value))),
    }
}

fn number_in_range(object: &Map<String, Value>, field: &str, min: f64, max: f64) -> Result<f64> {
    let n = required_number(object, field)?;
    if n < min || n > max {
        bail_score!(field, "{} is outside {}-{}", n, min, max);
    }
    Ok(n)
}

/// An integer rubric level in 1-5
fn base_level(value: &Value, field: &str) -> Result<u8> {
    let n = number(value)
        .ok_or_else(|| JudgeError::invalid_score(field, format!("{} is not a number", value)))?;
    if n.fract() != 0.0 {
        bail_score!(field, "{} is not an integer", n);
    }
    if !(1.0..=5.0).contains(&n) {
        bail_score!(field, "{} is outside 1-5", n);
    }
    Ok(n as u8)
}

fn string_field<'a>(object: &'a Map<String, Value>, field: &str) -> Option<&'a str> {
    object.get(field).and_then(Value::as_str)
}

fn enum_field<T: FromStr<Err = JudgeError>>(object: &Map<String, Value>, field: &str) -> Result<T> {
    match object.get(field) {
        Some(Value::String(s)) => s.parse(),
        None | Some(Value::Null) => bail_score!(field, "missing"),
        Some(other) => bail_score!(field, "{} is not a string", other),
    }
}

fn string_list(object: &Map<String, Value>, field: &str) -> Vec<String> {
    match object.get(field) {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.clone()),
                Value::Null => None,
                other => Some(other.to_string()),
            })
            .collect(),
        Some(Value::String(s)) if !s.trim().is_empty() => vec![s.clone()],
        _ => Vec::new(),
    }
}

/// Top-level modifiers fall back to `solid` when absent or unrecognized
fn lenient_modifier(object: &Map<String, Value>) -> Modifier {
    match object.get("modifier") {
        Some(Value::String(s)) => s.parse().unwrap_or_else(|_| {
            tracing::warn!(modifier = %s, "unrecognized modifier, using solid");
            Modifier::Solid
        }),
        _ => Modifier::Solid,
    }
}

/// Dimension modifiers must be one of the allowed values when present
fn strict_modifier(object: &Map<String, Value>, field: &str) -> Result<Modifier> {
    match object.get("modifier") {
        None | Some(Value::Null) => Ok(Modifier::Solid),
        Some(Value::String(s)) => s
            .parse::<Modifier>()
            .map_err(|_| JudgeError::invalid_score(field, format!("unrecognized modifier {:?}", s))),
        Some(other) => bail_score!(field, "modifier {} is not a string", other),
    }
}

fn check_score_range(score: f64, field: &str) -> Result<()> {
    if !(MIN_SCORE - SCORE_EPSILON..=MAX_SCORE + SCORE_EPSILON).contains(&score) {
        bail_score!(field, "{} is outside {}-{}", score, MIN_SCORE, MAX_SCORE);
    }
    Ok(())
}

fn check_matches_derived(reported: Option<f64>, derived: f64, field: &str) -> Result<f64> {
    match reported {
        Some(reported) if (reported - derived).abs() > SCORE_EPSILON => {
            bail_score!(
                field,
                "{} does not match base plus modifier ({})",
                reported,
                derived
            )
        }
        _ => Ok(derived),
    }
}

fn validate_dimension(name: &str, value: &Value) -> Result<DimensionScore> {
    let field = format!("dimensions.{}", name);

    if let Some(score) = number(value) {
        check_score_range(score, &field)?;
        return Ok(DimensionScore {
            base: None,
            modifier: Modifier::Solid,
            score,
        });
    }

    let object = as_object(value, &field)?;
    let modifier = strict_modifier(object, &field)?;
    let reported = match object.get("score") {
        None | Some(Value::Null) => None,
        Some(v) => Some(number(v).ok_or_else(|| {
            JudgeError::invalid_score(&field, format!("score {} is not a number", v))
        })?),
    };

    let (base, score) = match object.get("base").or_else(|| object.get("base_score")) {
        Some(base_value) if !base_value.is_null() => {
            let base = base_level(base_value, &field)?;
            let score = check_matches_derived(reported, modifier.apply(base), &field)?;
            (Some(base), score)
        }
        _ => match reported {
            Some(score) => (None, score),
            None => bail_score!(&field, "neither base nor score given"),
        },
    };

    check_score_range(score, &field)?;
    Ok(DimensionScore {
        base,
        modifier,
        score,
    })
}

fn validate_dimensions(object: &Map<String, Value>) -> Result<BTreeMap<String, DimensionScore>> {
    match object.get("dimensions") {
        None | Some(Value::Null) => Ok(BTreeMap::new()),
        Some(Value::Object(dimensions)) => dimensions
            .iter()
            .map(|(name, value)| -> Result<(String, DimensionScore)> {
                Ok((name.clone(), validate_dimension(name, value)?))
            })
            .collect(),
        Some(other) => bail_score!("dimensions", "{} is not an object", other),
    }
}

/// Validate a single-session score
pub fn validate_score(value: &Value) -> Result<Score> {
    let object = as_object(value, "response")?;

    let base_score = match object.get("base_score") {
        None | Some(Value::Null) => bail_score!("base_score", "missing"),
        Some(v) => base_level(v, "base_score")?,
    };
    let modifier = lenient_modifier(object);
    let reported = match object.get("overall") {
        None | Some(Value::Null) => None,
        Some(v) => Some(number(v).ok_or_else(|| {
            JudgeError::invalid_score("overall", format!("{} is not a number", v))
        })?),
    };
    let overall = check_matches_derived(reported, modifier.apply(base_score), "overall")?;
    check_score_range(overall, "overall")?;

    let dimensions = validate_dimensions(object)?;
    let (rubric_total, rubric_max) = if dimensions.is_empty() {
        (overall, DIMENSION_MAX)
    } else {
        (
            dimensions.values().map(|d| d.score).sum(),
            dimensions.len() as f64 * DIMENSION_MAX,
        )
    };

    Ok(Score {
        base_score,
        modifier,
        overall,
        dimensions,
        rubric_total,
        rubric_max,
        justification: string_field(object, "justification")
            .unwrap_or_default()
            .to_string(),
        strengths: string_list(object, "strengths"),
        weaknesses: string_list(object, "weaknesses"),
        metrics: object.get("metrics").cloned().unwrap_or(Value::Null),
    })
}

/// Validate a pairwise comparison
pub fn validate_comparison(value: &Value) -> Result<Comparison> {
    let object = as_object(value, "response")?;

    let verdict: Verdict = enum_field(object, "verdict")?;
    let margin = match (object.get("margin"), verdict) {
        (None | Some(Value::Null), Verdict::Equivalent) => Margin::Slight,
        _ => enum_field(object, "margin")?,
    };

    let dimension_comparison = match object.get("dimension_comparison") {
        None | Some(Value::Null) => BTreeMap::new(),
        Some(Value::Object(dimensions)) => dimensions
            .iter()
            .map(|(name, v)| {
                let field = format!("dimension_comparison.{}", name);
                match v {
                    Value::String(s) => s
                        .parse::<Verdict>()
                        .map(|verdict| (name.clone(), verdict))
                        .map_err(|_| JudgeError::invalid_score(&field, format!("{:?}", s))),
                    other => Err(JudgeError::invalid_score(
                        &field,
                        format!("{} is not a string", other),
                    )),
                }
            })
            .collect::<Result<_>>()?,
        Some(other) => bail_score!("dimension_comparison", "{} is not an object", other),
    };

    Ok(Comparison {
        verdict,
        margin,
        score_a: number_in_range(object, "score_a", 1.0, 5.0)?,
        score_b: number_in_range(object, "score_b", 1.0, 5.0)?,
        dimension_comparison,
        justification: string_field(object, "justification")
            .unwrap_or_default()
            .to_string(),
    })
}

/// Validate a baseline-relative comparison
pub fn validate_baseline(value: &Value) -> Result<BaselineComparison> {
    let object = as_object(value, "response")?;

    let verdict: BaselineVerdict = enum_field(object, "verdict")?;
    let time_saved_estimate = match object.get("time_saved_estimate") {
        None | Some(Value::Null) => TimeSaved::None,
        Some(_) => enum_field(object, "time_saved_estimate")?,
    };

    let categories = match object.get("categories") {
        None | Some(Value::Null) => BTreeMap::new(),
        Some(Value::Object(categories)) => categories
            .iter()
            .map(|(name, v)| {
                let field = format!("categories.{}", name);
                match v {
                    Value::String(s) => s
                        .parse::<CategoryChange>()
                        .map(|change| (name.clone(), change))
                        .map_err(|_| JudgeError::invalid_score(&field, format!("{:?}", s))),
                    other => Err(JudgeError::invalid_score(
                        &field,
                        format!("{} is not a string", other),
                    )),
                }
            })
            .collect::<Result<_>>()?,
        Some(other) => bail_score!("categories", "{} is not an object", other),
    };

    Ok(BaselineComparison {
        verdict,
        quality_delta: number_in_range(object, "quality_delta", 0.0, 3.0)?,
        categories,
        time_saved_estimate,
        score_baseline: number_in_range(object, "score_baseline", 1.0, 5.0)?,
        score_framework: number_in_range(object, "score_framework", 1.0, 5.0)?,
        improvements: string_list(object, "improvements"),
        regressions: string_list(object, "regressions"),
        summary: string_field(object, "summary")
            .unwrap_or_default()
            .to_string(),
    })
}
