//! Report synthesis.
//!
//! [`ReportData`] is the single input to both renderers. It is rebuilt from
//! the artifacts on every run.

mod markdown;

pub use markdown::to_markdown;

use crate::aggregate::{
    aggregate_baseline_comparisons, aggregate_by_variant, aggregate_comparisons, compare_pair,
    compare_variants, BaselineSummary, PairwiseSummary, VariantAggregate, VariantComparison,
    DEFAULT_ALPHA,
};
use crate::collect::{Collection, ComparisonCollection};
use crate::error::Result;
use crate::judge::artifact::write_atomic;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const MARKDOWN_REPORT: &str = "report.md";
pub const JSON_REPORT: &str = "report.json";

/// Which report files to produce
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportOutput {
    Markdown,
    Json,
    Both,
}

impl ReportOutput {
    pub fn markdown(&self) -> bool {
        matches!(self, ReportOutput::Markdown | ReportOutput::Both)
    }

    pub fn json(&self) -> bool {
        matches!(self, ReportOutput::Json | ReportOutput::Both)
    }
}

/// How variants are compared
#[derive(Debug, Clone, PartialEq)]
pub struct ReportOptions {
    pub alpha: f64,
    /// Explicit `(treatment, control)`; inferred from names when absent
    pub pair: Option<(String, String)>,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            alpha: DEFAULT_ALPHA,
            pair: None,
        }
    }
}

/// Everything a report shows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportData {
    pub generated_at: DateTime<Utc>,
    pub results_root: String,
    pub alpha: f64,
    pub variants: BTreeMap<String, VariantAggregate>,
    pub comparison: Option<VariantComparison>,
    pub pairwise: Option<PairwiseSummary>,
    pub baseline: Option<BaselineSummary>,
    pub warnings: Vec<String>,
}

impl ReportData {
    /// Aggregate collected scores and comparisons into report data
    pub fn build(
        results_root: &Path,
        collection: &Collection,
        comparisons: &ComparisonCollection,
        options: &ReportOptions,
    ) -> Result<Self> {
        let variants = aggregate_by_variant(collection);
        let comparison = match &options.pair {
            Some((treatment, control)) => {
                Some(compare_pair(&variants, treatment, control, options.alpha)?)
            }
            None => compare_variants(&variants, options.alpha),
        };

        let pairwise = (!comparisons.comparisons.is_empty())
            .then(|| aggregate_comparisons(&comparisons.comparisons));
        let baseline = (!comparisons.baselines.is_empty())
            .then(|| aggregate_baseline_comparisons(&comparisons.baselines));

        let mut warnings = collection.warnings.clone();
        warnings.extend(comparisons.warnings.iter().cloned());

        Ok(Self {
            generated_at: Utc::now(),
            results_root: results_root.display().to_string(),
            alpha: options.alpha,
            variants,
            comparison,
            pairwise,
            baseline,
            warnings,
        })
    }

    pub fn session_count(&self) -> usize {
        self.variants.values().map(|v| v.session_count).sum()
    }
}

/// Pretty-printed JSON that parses back into the same [`ReportData`]
pub fn to_json(report: &ReportData) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

/// Write the requested report files under `results_root`
pub fn write_reports(
    report: &ReportData,
    results_root: &Path,
    output: ReportOutput,
) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();

    if output.markdown() {
        let path = results_root.join(MARKDOWN_REPORT);
        write_atomic(&path, to_markdown(report).as_bytes())?;
        written.push(path);
    }
    if output.json() {
        let path = results_root.join(JSON_REPORT);
        let mut json = to_json(report)?;
        json.push('\n');
        write_atomic(&path, json.as_bytes())?;
        written.push(path);
    }

    for path in &written {
        tracing::info!(path = %path.display(), "wrote report");
    }
    Ok(written)
}
