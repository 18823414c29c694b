//! `codejudge report` - collect, aggregate and render

use crate::cli::{OutputFormat, ReportArgs, ReportFormat};
use crate::commands::dispatch::CommandContext;
use codejudge_core::collect::{collect, collect_comparisons};
use codejudge_core::error::Result;
use codejudge_core::report::{to_json, to_markdown, write_reports, ReportData, ReportOptions};
use codejudge_core::trace_time;
use serde_json::json;

pub fn execute(ctx: &CommandContext, args: &ReportArgs) -> Result<()> {
    let start = ctx.start;
    let alpha = args.alpha.unwrap_or(ctx.config.alpha);
    if !(alpha > 0.0 && alpha < 1.0) {
        codejudge_core::bail_invalid!("alpha", format!("{} (must be between 0 and 1)", alpha));
    }

    if args.treatment.is_some() && args.treatment == args.control {
        codejudge_core::bail_usage!("--treatment and --control must name different variants");
    }

    let collection = collect(&args.results_root)?;
    let comparisons = collect_comparisons(&args.results_root)?;
    trace_time!(start, "collect", sessions = collection.session_count());

    let options = ReportOptions {
        alpha,
        pair: args.treatment.clone().zip(args.control.clone()),
    };
    let report = ReportData::build(&args.results_root, &collection, &comparisons, &options)?;
    trace_time!(start, "aggregate");

    if args.stdout {
        if args.output == ReportFormat::Json || ctx.format() == OutputFormat::Json {
            println!("{}", to_json(&report)?);
        } else {
            print!("{}", to_markdown(&report));
        }
        return Ok(());
    }

    let written = write_reports(&report, &args.results_root, args.output.into())?;
    match ctx.format() {
        OutputFormat::Json => {
            let summary = json!({
                "written": written.iter().map(|p| p.display().to_string()).collect::<Vec<_>>(),
                "sessions": report.session_count(),
                "variants": report.variants.len(),
                "significant": report.comparison.as_ref().map(|c| c.significant),
                "warnings": report.warnings.len(),
            });
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        OutputFormat::Human => {
            for path in &written {
                println!("{}", path.display());
            }
            if !ctx.cli.quiet && !report.warnings.is_empty() {
                eprintln!(
                    "{} collection warning(s); see the report for details",
                    report.warnings.len()
                );
            }
        }
    }
    Ok(())
}
