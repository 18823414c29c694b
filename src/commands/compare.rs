//! `codejudge compare` - pairwise and baseline-relative judging

use crate::cli::{CompareArgs, OutputFormat};
use crate::commands::dispatch::CommandContext;
use crate::commands::judge::session_id;
use codejudge_core::error::Result;
use codejudge_core::files::collect_session_files;
use codejudge_core::judge::{Judge, SessionRef};

pub fn execute(ctx: &CommandContext, args: &CompareArgs) -> Result<()> {
    let rubric = ctx.rubric_store().load(&args.rubric)?;
    let max_bytes = ctx.config.max_file_bytes;
    let files_a = collect_session_files(&args.session_a, max_bytes)?.all();
    let files_b = collect_session_files(&args.session_b, max_bytes)?.all();
    let id_a = session_id(&args.session_a)?;
    let id_b = session_id(&args.session_b)?;

    let invoker = ctx.config.invoker();
    let judge = Judge::new(&invoker, ctx.config.judge_options());
    let a = SessionRef::new(&id_a, &files_a);
    let b = SessionRef::new(&id_b, &files_b);
    let context = args.context.as_deref();

    if args.baseline {
        let artifact = judge.judge_baseline(&args.results, a, b, &rubric, context)?;
        match ctx.format() {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&artifact)?),
            OutputFormat::Human => println!(
                "{} vs baseline {}: {} (quality delta {:+.2}, time saved {})",
                artifact.framework_session,
                artifact.baseline_session,
                artifact.comparison.verdict,
                artifact.comparison.quality_delta,
                artifact.comparison.time_saved_estimate
            ),
        }
    } else {
        let artifact = judge.judge_comparative(&args.results, a, b, &rubric, context)?;
        match ctx.format() {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&artifact)?),
            OutputFormat::Human => println!(
                "{} vs {}: {} ({}, {:.2} vs {:.2})",
                artifact.session_a,
                artifact.session_b,
                artifact.comparison.verdict,
                artifact.comparison.margin,
                artifact.comparison.score_a,
                artifact.comparison.score_b
            ),
        }
    }
    Ok(())
}
