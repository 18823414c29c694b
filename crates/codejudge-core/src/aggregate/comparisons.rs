//! Roll-ups of pairwise and baseline-relative judgments

use super::round2;
use crate::collect::{BaselineRecord, ComparisonRecord};
use crate::judge::types::{
    BaselineVerdict, CategoryChange, Margin, TimeSaved, Verdict, BASELINE_CATEGORIES,
};
use crate::stats;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Win/loss/tie counts, from session A's side for pairwise judgments and the
/// framework's side for baseline judgments
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    pub wins: usize,
    pub losses: usize,
    pub ties: usize,
}

impl Tally {
    pub fn total(&self) -> usize {
        self.wins + self.losses + self.ties
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PairwiseSummary {
    pub total: usize,
    pub verdicts: BTreeMap<String, usize>,
    pub margins: BTreeMap<String, usize>,
    pub mean_score_a: f64,
    pub mean_score_b: f64,
    pub by_rubric: BTreeMap<String, Tally>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BaselineSummary {
    pub total: usize,
    pub verdicts: BTreeMap<String, usize>,
    /// Count of judgments per rounded quality delta (0-3)
    pub quality_delta_histogram: BTreeMap<String, usize>,
    pub mean_quality_delta: f64,
    /// Category -> change -> count
    pub categories: BTreeMap<String, BTreeMap<String, usize>>,
    pub time_saved: BTreeMap<String, usize>,
    pub mean_score_baseline: f64,
    pub mean_score_framework: f64,
    pub by_rubric: BTreeMap<String, Tally>,
}

/// Every value starts at zero so the shape of the output is stable
fn zeroed<'a>(keys: impl IntoIterator<Item = &'a str>) -> BTreeMap<String, usize> {
    keys.into_iter().map(|k| (k.to_string(), 0)).collect()
}

fn bump(map: &mut BTreeMap<String, usize>, key: &str) {
    *map.entry(key.to_string()).or_default() += 1;
}

/// Verdict distribution, margins, mean scores and per-rubric tallies
pub fn aggregate_comparisons(records: &[ComparisonRecord]) -> PairwiseSummary {
    let mut summary = PairwiseSummary {
        total: records.len(),
        verdicts: zeroed(Verdict::ALL.iter().map(Verdict::as_str)),
        margins: zeroed(Margin::ALL.iter().map(Margin::as_str)),
        ..Default::default()
    };

    for record in records {
        let comparison = &record.comparison;
        bump(&mut summary.verdicts, comparison.verdict.as_str());
        bump(&mut summary.margins, comparison.margin.as_str());

        let tally = summary.by_rubric.entry(record.rubric.clone()).or_default();
        match comparison.verdict {
            Verdict::ABetter => tally.wins += 1,
            Verdict::BBetter => tally.losses += 1,
            Verdict::Equivalent => tally.ties += 1,
        }
    }

    let a: Vec<f64> = records.iter().map(|r| r.comparison.score_a).collect();
    let b: Vec<f64> = records.iter().map(|r| r.comparison.score_b).collect();
    summary.mean_score_a = round2(stats::mean(&a));
    summary.mean_score_b = round2(stats::mean(&b));
    summary
}

/// Verdicts, quality deltas, category and time-saved distributions
pub fn aggregate_baseline_comparisons(records: &[BaselineRecord]) -> BaselineSummary {
    let mut summary = BaselineSummary {
        total: records.len(),
        verdicts: zeroed(BaselineVerdict::ALL.iter().map(BaselineVerdict::as_str)),
        quality_delta_histogram: zeroed(["0", "1", "2", "3"]),
        time_saved: zeroed(TimeSaved::ALL.iter().map(TimeSaved::as_str)),
        categories: BASELINE_CATEGORIES
            .iter()
            .map(|c| {
                (
                    c.to_string(),
                    zeroed(CategoryChange::ALL.iter().map(CategoryChange::as_str)),
                )
            })
            .collect(),
        ..Default::default()
    };

    for record in records {
        let comparison = &record.comparison;
        bump(&mut summary.verdicts, comparison.verdict.as_str());
        bump(
            &mut summary.quality_delta_histogram,
            &format!("{}", comparison.quality_delta.round().clamp(0.0, 3.0) as u8),
        );
        bump(&mut summary.time_saved, comparison.time_saved_estimate.as_str());
        for (category, change) in &comparison.categories {
            let counts = summary.categories.entry(category.clone()).or_default();
            bump(counts, change.as_str());
        }

        let tally = summary.by_rubric.entry(record.rubric.clone()).or_default();
        match comparison.verdict {
            BaselineVerdict::FrameworkBetter => tally.wins += 1,
            BaselineVerdict::BaselineBetter => tally.losses += 1,
            BaselineVerdict::Equivalent => tally.ties += 1,
        }
    }

    let column = |f: fn(&BaselineRecord) -> f64| records.iter().map(f).collect::<Vec<_>>();
    summary.mean_quality_delta = round2(stats::mean(&column(|r| r.comparison.quality_delta)));
    summary.mean_score_baseline = round2(stats::mean(&column(|r| r.comparison.score_baseline)));
    summary.mean_score_framework =
        round2(stats::mean(&column(|r| r.comparison.score_framework)));
    summary
}
