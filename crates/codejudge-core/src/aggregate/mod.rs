//! Per-variant aggregation and cross-variant comparison.
//!
//! Aggregates are derived on every report run from a [`Collection`]; they are
//! never persisted as authoritative state. Reported values are rounded to two
//! decimals. Per-session values stay unrounded so the t-test sees the raw
//! samples.

pub mod comparisons;

pub use comparisons::{
    aggregate_baseline_comparisons, aggregate_comparisons, BaselineSummary, PairwiseSummary, Tally,
};

use crate::collect::{Collection, SessionScoreRecord};
use crate::error::{JudgeError, Result};
use crate::judge::types::MAX_SCORE;
use crate::stats::{self, describe, Stats, TTest};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Significance level used when none is configured
pub const DEFAULT_ALPHA: f64 = 0.05;

pub fn round2(value: f64) -> f64 {
    if value.is_finite() {
        (value * 100.0).round() / 100.0
    } else {
        0.0
    }
}

fn round_stats(stats: Stats) -> Stats {
    Stats {
        mean: round2(stats.mean),
        median: round2(stats.median),
        stddev: round2(stats.stddev),
        min: round2(stats.min),
        max: round2(stats.max),
    }
}

/// One session's scores reduced across rubrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_id: String,
    pub rubric_count: usize,
    /// Mean of per-rubric overall scores
    pub mean: f64,
    /// Sum of per-rubric overall scores
    pub sum: f64,
    /// Mean weighted by each rubric's weight
    pub weighted_mean: f64,
    /// `sum / (rubric_count * 5.25) * 100`
    pub normalized: f64,
    pub scores: BTreeMap<String, f64>,
}

impl SessionSummary {
    pub fn from_record(record: &SessionScoreRecord) -> Self {
        let overall: Vec<f64> = record.scores.iter().map(|s| s.overall).collect();
        let rubric_count = overall.len();
        let sum: f64 = overall.iter().sum();
        let weight_total: f64 = record.scores.iter().map(|s| s.weight.max(0.0)).sum();
        let weighted_mean = if weight_total > 0.0 {
            record
                .scores
                .iter()
                .map(|s| s.overall * s.weight.max(0.0))
                .sum::<f64>()
                / weight_total
        } else {
            stats::mean(&overall)
        };
        let normalized = if rubric_count == 0 {
            0.0
        } else {
            sum / (rubric_count as f64 * MAX_SCORE) * 100.0
        };

        Self {
            session_id: record.session_id.clone(),
            rubric_count,
            mean: stats::mean(&overall),
            sum,
            weighted_mean,
            normalized,
            scores: record
                .scores
                .iter()
                .map(|s| (s.rubric.clone(), s.overall))
                .collect(),
        }
    }
}

/// Summary of every session in one variant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantAggregate {
    pub variant: String,
    pub session_count: usize,
    /// Statistics over per-session mean scores
    pub mean_score: Stats,
    /// Statistics over per-session score sums
    pub total_score: Stats,
    /// Statistics over per-session weighted means
    pub weighted_score: Stats,
    /// Statistics over per-session normalized (0-100) scores
    pub normalized_score: Stats,
    /// Statistics over each rubric's overall scores
    pub rubrics: BTreeMap<String, Stats>,
    pub sessions: Vec<SessionSummary>,
}

impl VariantAggregate {
    pub fn session_means(&self) -> Vec<f64> {
        self.sessions.iter().map(|s| s.mean).collect()
    }
}

fn aggregate_variant(variant: &str, records: &[SessionScoreRecord]) -> VariantAggregate {
    let sessions: Vec<SessionSummary> = records.iter().map(SessionSummary::from_record).collect();
    let column = |f: fn(&SessionSummary) -> f64| sessions.iter().map(f).collect::<Vec<_>>();

    let mut per_rubric: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    for record in records {
        for score in &record.scores {
            per_rubric
                .entry(score.rubric.clone())
                .or_default()
                .push(score.overall);
        }
    }

    VariantAggregate {
        variant: variant.to_string(),
        session_count: sessions.len(),
        mean_score: round_stats(describe(&column(|s| s.mean))),
        total_score: round_stats(describe(&column(|s| s.sum))),
        weighted_score: round_stats(describe(&column(|s| s.weighted_mean))),
        normalized_score: round_stats(describe(&column(|s| s.normalized))),
        rubrics: per_rubric
            .into_iter()
            .map(|(rubric, values)| (rubric, round_stats(describe(&values))))
            .collect(),
        sessions,
    }
}

/// Aggregate every variant in a collection
pub fn aggregate_by_variant(collection: &Collection) -> BTreeMap<String, VariantAggregate> {
    collection
        .variants
        .iter()
        .map(|(variant, records)| (variant.clone(), aggregate_variant(variant, records)))
        .collect()
}

/// Treatment versus control
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantComparison {
    pub treatment: String,
    pub control: String,
    pub treatment_mean: f64,
    pub control_mean: f64,
    pub difference: f64,
    /// Zero when the control mean is zero
    pub percent_improvement: f64,
    pub t_test: TTest,
    pub alpha: f64,
    pub significant: bool,
    /// Treatment minus control mean for each rubric both variants scored
    pub rubric_deltas: BTreeMap<String, f64>,
}

fn is_control_name(name: &str) -> bool {
    let name = name.to_lowercase();
    name.contains("without") || name.contains("baseline") || name.contains("control")
}

fn is_treatment_name(name: &str) -> bool {
    let name = name.to_lowercase();
    name.contains("with") && !name.contains("without")
}

/// Pick `(treatment, control)` from variant names.
///
/// `with*` names are treatments and `without*`, `baseline` or `control` names
/// are controls. Without a recognisable pair the first two names in order
/// are used.
pub fn pick_treatment_control<'a>(names: &[&'a str]) -> Option<(&'a str, &'a str)> {
    if names.len() < 2 {
        return None;
    }

    let control = names.iter().copied().find(|n| is_control_name(n));
    if let Some(control) = control {
        let treatment = names
            .iter()
            .copied()
            .find(|n| *n != control && is_treatment_name(n))
            .or_else(|| {
                names
                    .iter()
                    .copied()
                    .find(|n| *n != control && !is_control_name(n))
            });
        if let Some(treatment) = treatment {
            return Some((treatment, control));
        }
    }

    Some((names[0], names[1]))
}

/// Compare two variants chosen by name heuristics; `None` with fewer than two
pub fn compare_variants(
    aggregates: &BTreeMap<String, VariantAggregate>,
    alpha: f64,
) -> Option<VariantComparison> {
    let names: Vec<&str> = aggregates.keys().map(String::as_str).collect();
    let (treatment, control) = pick_treatment_control(&names)?;
    compare_pair(aggregates, treatment, control, alpha).ok()
}

/// Compare two explicitly named variants
pub fn compare_pair(
    aggregates: &BTreeMap<String, VariantAggregate>,
    treatment: &str,
    control: &str,
    alpha: f64,
) -> Result<VariantComparison> {
    let lookup = |name: &str| {
        aggregates
            .get(name)
            .ok_or_else(|| JudgeError::not_found("variant", name))
    };
    let t = lookup(treatment)?;
    let c = lookup(control)?;

    let t_samples = t.session_means();
    let c_samples = c.session_means();
    let treatment_mean = stats::mean(&t_samples);
    let control_mean = stats::mean(&c_samples);
    let difference = treatment_mean - control_mean;
    let percent_improvement = if control_mean == 0.0 {
        0.0
    } else {
        difference / control_mean * 100.0
    };
    let test = stats::t_test(&t_samples, &c_samples);

    let rubric_deltas = t
        .rubrics
        .iter()
        .filter_map(|(rubric, t_stats)| {
            c.rubrics
                .get(rubric)
                .map(|c_stats| (rubric.clone(), round2(t_stats.mean - c_stats.mean)))
        })
        .collect();

    Ok(VariantComparison {
        treatment: treatment.to_string(),
        control: control.to_string(),
        treatment_mean: round2(treatment_mean),
        control_mean: round2(control_mean),
        difference: round2(difference),
        percent_improvement: round2(percent_improvement),
        t_test: TTest {
            t: round2(test.t),
            p: (test.p * 10_000.0).round() / 10_000.0,
            df: round2(test.df),
        },
        alpha,
        significant: test.p < alpha,
        rubric_deltas,
    })
}
