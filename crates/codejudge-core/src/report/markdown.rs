use super::ReportData;
use crate::aggregate::{BaselineSummary, PairwiseSummary, Tally};
use crate::judge::types::MAX_SCORE;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write;

const NA: &str = "N/A";

fn num(value: f64) -> String {
    format!("{:.2}", value)
}

fn table_header(out: &mut String, columns: &[&str]) {
    let _ = writeln!(out, "| {} |", columns.join(" | "));
    let _ = writeln!(
        out,
        "|{}",
        columns.iter().map(|_| "---|").collect::<String>()
    );
}

fn table_row(out: &mut String, cells: &[String]) {
    let _ = writeln!(out, "| {} |", cells.join(" | "));
}

/// Render a report as markdown. Sections with no data print `N/A`.
pub fn to_markdown(report: &ReportData) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# Code Quality Evaluation Report\n");
    let _ = writeln!(
        out,
        "Generated: {}  \nResults: `{}`  \nSessions: {}\n",
        report.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
        report.results_root,
        report.session_count()
    );

    summary_section(&mut out, report);
    comparison_section(&mut out, report);
    rubric_section(&mut out, report);
    sessions_section(&mut out, report);
    pairwise_section(&mut out, report.pairwise.as_ref());
    baseline_section(&mut out, report.baseline.as_ref());
    warnings_section(&mut out, &report.warnings);
    methodology_section(&mut out, report.alpha);
    out
}

fn summary_section(out: &mut String, report: &ReportData) {
    let _ = writeln!(out, "## Summary\n");
    if report.variants.is_empty() {
        let _ = writeln!(out, "{}\n", NA);
        return;
    }

    table_header(
        out,
        &[
            "Variant",
            "Sessions",
            "Mean",
            "Median",
            "Std Dev",
            "Min",
            "Max",
            "Normalized (0-100)",
        ],
    );
    for (name, variant) in &report.variants {
        let stats = &variant.mean_score;
        table_row(
            out,
            &[
                name.clone(),
                variant.session_count.to_string(),
                num(stats.mean),
                num(stats.median),
                num(stats.stddev),
                num(stats.min),
                num(stats.max),
                num(variant.normalized_score.mean),
            ],
        );
    }
    out.push('\n');
}

fn comparison_section(out: &mut String, report: &ReportData) {
    let _ = writeln!(out, "## Variant Comparison\n");
    let Some(comparison) = &report.comparison else {
        let _ = writeln!(out, "{}\n", NA);
        return;
    };

    if comparison.significant {
        let _ = writeln!(
            out,
            "> **Significant:** `{}` scored {} points ({}%) {} than `{}` (p = {:.4} < {}).\n",
            comparison.treatment,
            num(comparison.difference.abs()),
            num(comparison.percent_improvement.abs()),
            if comparison.difference >= 0.0 {
                "higher"
            } else {
                "lower"
            },
            comparison.control,
            comparison.t_test.p,
            comparison.alpha
        );
    } else {
        let _ = writeln!(
            out,
            "No significant difference between `{}` and `{}` at alpha = {}.\n",
            comparison.treatment, comparison.control, comparison.alpha
        );
    }

    table_header(out, &["Metric", "Value"]);
    let rows = [
        ("Treatment", comparison.treatment.clone()),
        ("Control", comparison.control.clone()),
        ("Treatment mean", num(comparison.treatment_mean)),
        ("Control mean", num(comparison.control_mean)),
        ("Difference", num(comparison.difference)),
        ("Improvement", format!("{}%", num(comparison.percent_improvement))),
        ("t", num(comparison.t_test.t)),
        ("df", num(comparison.t_test.df)),
        ("p", format!("{:.4}", comparison.t_test.p)),
    ];
    for (label, value) in rows {
        table_row(out, &[label.to_string(), value]);
    }
    out.push('\n');
}

fn rubric_section(out: &mut String, report: &ReportData) {
    let _ = writeln!(out, "## Per-Rubric Breakdown\n");
    let rubrics: BTreeSet<&String> = report
        .variants
        .values()
        .flat_map(|v| v.rubrics.keys())
        .collect();
    if rubrics.is_empty() {
        let _ = writeln!(out, "{}\n", NA);
        return;
    }

    let mut columns = vec!["Rubric"];
    columns.extend(report.variants.keys().map(String::as_str));
    if report.comparison.is_some() {
        columns.push("Delta");
    }
    table_header(out, &columns);

    for rubric in rubrics {
        let mut cells = vec![rubric.clone()];
        for variant in report.variants.values() {
            cells.push(match variant.rubrics.get(rubric) {
                Some(stats) => format!("{} ± {}", num(stats.mean), num(stats.stddev)),
                None => NA.to_string(),
            });
        }
        if let Some(comparison) = &report.comparison {
            cells.push(
                comparison
                    .rubric_deltas
                    .get(rubric)
                    .map(|d| format!("{:+.2}", d))
                    .unwrap_or_else(|| NA.to_string()),
            );
        }
        table_row(out, &cells);
    }
    out.push('\n');
}

fn sessions_section(out: &mut String, report: &ReportData) {
    let _ = writeln!(out, "## Session Scores\n");
    let rubrics: BTreeSet<&String> = report
        .variants
        .values()
        .flat_map(|v| v.sessions.iter())
        .flat_map(|s| s.scores.keys())
        .collect();
    if rubrics.is_empty() {
        let _ = writeln!(out, "{}\n", NA);
        return;
    }

    let mut columns = vec!["Session", "Variant"];
    columns.extend(rubrics.iter().map(|r| r.as_str()));
    columns.extend(["Mean", "Normalized"]);
    table_header(out, &columns);

    for (name, variant) in &report.variants {
        for session in &variant.sessions {
            let mut cells = vec![session.session_id.clone(), name.clone()];
            cells.extend(rubrics.iter().map(|r| {
                session
                    .scores
                    .get(*r)
                    .map(|v| num(*v))
                    .unwrap_or_else(|| NA.to_string())
            }));
            cells.push(num(session.mean));
            cells.push(num(session.normalized));
            table_row(out, &cells);
        }
    }
    out.push('\n');
}

fn distribution(counts: &BTreeMap<String, usize>, total: usize) -> String {
    counts
        .iter()
        .map(|(key, count)| {
            let share = if total == 0 {
                0.0
            } else {
                *count as f64 / total as f64 * 100.0
            };
            format!("{}: {} ({:.0}%)", key, count, share)
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn tally_table(out: &mut String, by_rubric: &BTreeMap<String, Tally>, labels: [&str; 3]) {
    table_header(out, &["Rubric", labels[0], labels[1], labels[2]]);
    for (rubric, tally) in by_rubric {
        table_row(
            out,
            &[
                rubric.clone(),
                tally.wins.to_string(),
                tally.losses.to_string(),
                tally.ties.to_string(),
            ],
        );
    }
    out.push('\n');
}

fn pairwise_section(out: &mut String, summary: Option<&PairwiseSummary>) {
    let _ = writeln!(out, "## Pairwise Comparisons\n");
    let Some(summary) = summary else {
        let _ = writeln!(out, "{}\n", NA);
        return;
    };

    let _ = writeln!(out, "- Judgments: {}", summary.total);
    let _ = writeln!(out, "- Verdicts: {}", distribution(&summary.verdicts, summary.total));
    let _ = writeln!(out, "- Margins: {}", distribution(&summary.margins, summary.total));
    let _ = writeln!(
        out,
        "- Mean scores: A {} / B {}\n",
        num(summary.mean_score_a),
        num(summary.mean_score_b)
    );
    tally_table(out, &summary.by_rubric, ["A wins", "B wins", "Ties"]);
}

fn baseline_section(out: &mut String, summary: Option<&BaselineSummary>) {
    let _ = writeln!(out, "## Baseline Comparisons\n");
    let Some(summary) = summary else {
        let _ = writeln!(out, "{}\n", NA);
        return;
    };

    let _ = writeln!(out, "- Judgments: {}", summary.total);
    let _ = writeln!(out, "- Verdicts: {}", distribution(&summary.verdicts, summary.total));
    let _ = writeln!(
        out,
        "- Quality delta: mean {} ({})",
        num(summary.mean_quality_delta),
        distribution(&summary.quality_delta_histogram, summary.total)
    );
    let _ = writeln!(
        out,
        "- Time saved: {}",
        distribution(&summary.time_saved, summary.total)
    );
    let _ = writeln!(
        out,
        "- Mean scores: baseline {} / framework {}\n",
        num(summary.mean_score_baseline),
        num(summary.mean_score_framework)
    );

    let _ = writeln!(out, "### Categories\n");
    for (category, counts) in &summary.categories {
        let _ = writeln!(out, "- {}: {}", category, distribution(counts, summary.total));
    }
    out.push('\n');
    tally_table(
        out,
        &summary.by_rubric,
        ["Framework better", "Baseline better", "Equivalent"],
    );
}

fn warnings_section(out: &mut String, warnings: &[String]) {
    let _ = writeln!(out, "## Collection Warnings\n");
    if warnings.is_empty() {
        let _ = writeln!(out, "None\n");
        return;
    }
    for warning in warnings {
        let _ = writeln!(out, "- {}", warning);
    }
    out.push('\n');
}

fn methodology_section(out: &mut String, alpha: f64) {
    let _ = writeln!(out, "## Methodology\n");
    let _ = writeln!(
        out,
        "Each session is scored per rubric by an LLM judge on a 1-5 level with a \
         weak/solid/strong modifier (-0.25/0/+0.25), giving scores between 0.75 and {}. \
         Session scores are the mean across rubrics; normalized scores are \
         `sum / (rubrics x {}) x 100`. Variants are compared with Welch's two-sample \
         t-test on per-session means at alpha = {}. Values are rounded to two decimals.",
        MAX_SCORE, MAX_SCORE, alpha
    );
}
