//! `codejudge batch` - judge every session below a results root

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde_json::json;

use crate::cli::{BatchArgs, OutputFormat};
use crate::commands::dispatch::CommandContext;
use crate::commands::judge::session_id;
use codejudge_core::error::{JudgeError, Result};
use codejudge_core::files::{collect_session_files, discover_code_sessions};
use codejudge_core::judge::artifact::score_artifact_path;
use codejudge_core::judge::{run_batch, Judge, ScoreArtifact};
use codejudge_core::rubric::RubricStore;
use codejudge_core::trace_time;

/// One judging call in the batch
struct Planned {
    session_id: String,
    session_dir: PathBuf,
    /// Rubric as requested on the command line, resolved when the call runs
    rubric: String,
    /// Rubric name for output and artifact paths
    label: String,
}

pub fn execute(ctx: &CommandContext, args: &BatchArgs) -> Result<()> {
    let start = ctx.start;
    let concurrency = args.concurrency.unwrap_or(ctx.config.concurrency);
    if concurrency == 0 {
        codejudge_core::bail_invalid!("concurrency", "0 (must be at least 1)");
    }

    let store = ctx.rubric_store();
    let sessions = discover_code_sessions(&args.results_root)?;
    let (planned, skipped) = plan(&sessions, &store, &args.rubrics, args.skip_existing)?;
    tracing::debug!(
        sessions = sessions.len(),
        calls = planned.len(),
        skipped,
        "planned batch"
    );

    let interrupted = Arc::new(AtomicBool::new(false));
    let interrupted_clone = Arc::clone(&interrupted);
    let _ = ctrlc::set_handler(move || {
        interrupted_clone.store(true, Ordering::SeqCst);
    });

    let invoker = ctx.config.invoker();
    let judge = Judge::new(&invoker, ctx.config.judge_options());
    let max_file_bytes = ctx.config.max_file_bytes;
    let context = args.context.as_deref();

    let jobs: Vec<_> = planned
        .iter()
        .map(|call| {
            let judge = &judge;
            let store = &store;
            move || {
                let rubric = store.load(&call.rubric)?;
                let files = collect_session_files(&call.session_dir, max_file_bytes)?;
                judge.judge_single(
                    &call.session_id,
                    &call.session_dir,
                    &files.all(),
                    &rubric,
                    context,
                )
            }
        })
        .collect();
    let outcomes = run_batch(jobs, concurrency, Some(interrupted.as_ref()));
    trace_time!(start, "batch", calls = outcomes.len());

    let failed = print_outcomes(ctx, &planned, &outcomes, skipped)?;
    let aborted = outcomes
        .iter()
        .any(|outcome| outcome.as_ref().is_err_and(|e| !e.is_call_local()));
    if aborted || interrupted.load(Ordering::SeqCst) {
        return Err(JudgeError::Interrupted);
    }
    if failed > 0 {
        return Err(JudgeError::Other(format!(
            "{} of {} judging call(s) failed",
            failed,
            outcomes.len()
        )));
    }
    Ok(())
}

/// Expand sessions x rubrics into calls, dropping already-scored pairs when asked.
///
/// A rubric that fails to load is still planned; its calls fail on their own
/// without holding back the other rubrics.
fn plan(
    sessions: &[PathBuf],
    store: &RubricStore,
    rubrics: &[String],
    skip_existing: bool,
) -> Result<(Vec<Planned>, usize)> {
    let labels: Vec<String> = rubrics
        .iter()
        .map(|requested| match store.load(requested) {
            Ok(rubric) => rubric.name,
            Err(e) => {
                tracing::warn!(rubric = %requested, error = %e, "rubric failed to load");
                requested.clone()
            }
        })
        .collect();

    let mut planned = Vec::new();
    let mut skipped = 0;
    for session_dir in sessions {
        let id = session_id(session_dir)?;
        for (requested, label) in rubrics.iter().zip(&labels) {
            if skip_existing && score_artifact_path(session_dir, label).is_file() {
                skipped += 1;
                continue;
            }
            planned.push(Planned {
                session_id: id.clone(),
                session_dir: session_dir.clone(),
                rubric: requested.clone(),
                label: label.clone(),
            });
        }
    }
    Ok((planned, skipped))
}

/// Print one line per call and return the number of failures
fn print_outcomes(
    ctx: &CommandContext,
    planned: &[Planned],
    outcomes: &[Result<ScoreArtifact>],
    skipped: usize,
) -> Result<usize> {
    let failed = outcomes.iter().filter(|o| o.is_err()).count();

    match ctx.format() {
        OutputFormat::Json => {
            let calls: Vec<_> = planned
                .iter()
                .zip(outcomes)
                .map(|(call, outcome)| match outcome {
                    Ok(artifact) => json!({
                        "session": call.session_id,
                        "rubric": call.label,
                        "status": "ok",
                        "overall": artifact.scores.overall,
                    }),
                    Err(e) => json!({
                        "session": call.session_id,
                        "rubric": call.label,
                        "status": "failed",
                        "error": e.to_string(),
                    }),
                })
                .collect();
            let summary = json!({
                "calls": calls,
                "succeeded": outcomes.len() - failed,
                "failed": failed,
                "skipped": skipped,
            });
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        OutputFormat::Human => {
            for (call, outcome) in planned.iter().zip(outcomes) {
                match outcome {
                    Ok(artifact) => {
                        if !ctx.cli.quiet {
                            println!(
                                "ok      {} {} {:.2}",
                                call.session_id,
                                call.label,
                                artifact.scores.overall
                            );
                        }
                    }
                    Err(e) => println!("failed  {} {}: {}", call.session_id, call.label, e),
                }
            }
            if !ctx.cli.quiet {
                println!(
                    "{} succeeded, {} failed, {} skipped",
                    outcomes.len() - failed,
                    failed,
                    skipped
                );
            }
        }
    }
    Ok(failed)
}
