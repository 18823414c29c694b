//! `codejudge judge` - score one session

use std::path::Path;

use crate::cli::{JudgeArgs, OutputFormat};
use crate::commands::dispatch::CommandContext;
use codejudge_core::error::{JudgeError, Result};
use codejudge_core::files::collect_session_files;
use codejudge_core::judge::{Judge, ScoreArtifact};
use codejudge_core::trace_time;

/// Session identifier: the session directory's name
pub fn session_id(session_dir: &Path) -> Result<String> {
    let resolved = session_dir
        .canonicalize()
        .map_err(|_| JudgeError::not_found("session directory", session_dir.display()))?;
    resolved
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .ok_or_else(|| JudgeError::invalid_value("session directory", session_dir.display()))
}

pub fn execute(ctx: &CommandContext, args: &JudgeArgs) -> Result<()> {
    let files = collect_session_files(&args.session, ctx.config.max_file_bytes)?;
    let id = session_id(&args.session)?;
    if files.is_empty() {
        tracing::warn!(session = %id, "no source files found; judging an empty submission");
    }

    let store = ctx.rubric_store();
    let invoker = ctx.config.invoker();
    let judge = Judge::new(&invoker, ctx.config.judge_options());
    let all_files = files.all();

    let mut artifacts = Vec::with_capacity(args.rubrics.len());
    let mut failures = Vec::new();
    for requested in &args.rubrics {
        let outcome = store.load(requested).and_then(|rubric| {
            judge.judge_single(&id, &args.session, &all_files, &rubric, args.context.as_deref())
        });
        match outcome {
            Ok(artifact) => artifacts.push(artifact),
            Err(e) => failures.push((requested.as_str(), e)),
        }
    }
    trace_time!(ctx.start, "judge", rubrics = args.rubrics.len(), failed = failures.len());

    print_scores(ctx, &id, &artifacts)?;
    if failures.len() > 1 {
        for (rubric, e) in &failures {
            eprintln!("failed  {}: {}", rubric, e);
        }
        return Err(JudgeError::Other(format!(
            "{} of {} rubric(s) failed",
            failures.len(),
            args.rubrics.len()
        )));
    }
    // A lone failure keeps its own exit code
    match failures.pop() {
        Some((_, e)) => Err(e),
        None => Ok(()),
    }
}

fn print_scores(ctx: &CommandContext, session: &str, artifacts: &[ScoreArtifact]) -> Result<()> {
    if artifacts.is_empty() {
        return Ok(());
    }
    match ctx.format() {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(artifacts)?);
        }
        OutputFormat::Human => {
            if !ctx.cli.quiet {
                println!("{}", session);
            }
            for artifact in artifacts {
                println!(
                    "  {}: {:.2} ({} {})",
                    artifact.rubric,
                    artifact.scores.overall,
                    artifact.scores.base_score,
                    artifact.scores.modifier
                );
            }
        }
    }
    Ok(())
}
