//! LLM-as-judge evaluation.
//!
//! A judging call builds a prompt, sends it through an [`LlmInvoker`] with a
//! bounded attempt loop, parses and validates the response into a typed
//! [`Judgment`], and persists exactly one artifact.
//!
//! ```rust,no_run
//! use codejudge_core::judge::{CommandInvoker, Judge, JudgeOptions};
//! use codejudge_core::rubric::RubricStore;
//! use codejudge_core::files::collect_session_files;
//! use std::path::Path;
//! use std::time::Duration;
//!
//! let invoker = CommandInvoker::new("claude", vec!["-p".into()], Duration::from_secs(300));
//! let judge = Judge::new(&invoker, JudgeOptions::default());
//! let rubric = RubricStore::new("rubrics").load("code-quality").unwrap();
//! let session = Path::new("results/with-skill/run-1");
//! let files = collect_session_files(session, 200_000).unwrap();
//! let artifact = judge.judge_single("run-1", session, &files.all(), &rubric, None).unwrap();
//! println!("{}", artifact.scores.overall);
//! ```

pub mod artifact;
pub mod batch;
pub mod invoke;
pub mod response;
pub mod types;
pub mod validate;

pub use artifact::{BaselineArtifact, ComparisonArtifact, ScoreArtifact};
pub use batch::run_batch;
pub use invoke::{CommandInvoker, LlmInvoker};
pub use types::*;

use crate::error::{JudgeError, Result};
use crate::files::CodeFile;
use crate::prompt;
use crate::rubric::Rubric;
use crate::trace_time;
use chrono::Utc;
use std::path::Path;
use std::thread;
use std::time::Duration;


/// Attempt and labelling settings for judging calls
#[derive(Debug, Clone, PartialEq)]
pub struct JudgeOptions {
    /// Total invocation attempts per call
    pub retries: u32,
    /// Pause between failed attempts
    pub retry_cooldown: Duration,
    /// Model label recorded in artifacts
    pub model: String,
}

impl Default for JudgeOptions {
    fn default() -> Self {
        Self {
            retries: 3,
            retry_cooldown: Duration::ZERO,
            model: "claude".to_string(),
        }
    }
}

/// One side of a pairwise judgment
#[derive(Debug, Clone, Copy)]
pub struct SessionRef<'a> {
    pub id: &'a str,
    pub files: &'a [CodeFile],
}

impl<'a> SessionRef<'a> {
    pub fn new(id: &'a str, files: &'a [CodeFile]) -> Self {
        Self { id, files }
    }
}

pub struct Judge<'a> {
    invoker: &'a dyn LlmInvoker,
    options: JudgeOptions,
}

impl<'a> Judge<'a> {
    pub fn new(invoker: &'a dyn LlmInvoker, options: JudgeOptions) -> Self {
        Self { invoker, options }
    }

    pub fn options(&self) -> &JudgeOptions {
        &self.options
    }

    /// Invoke the LLM, retrying failed invocations up to `retries` attempts
    pub fn invoke_with_retries(&self, prompt: &str) -> Result<String> {
        let attempts = self.options.retries.max(1);
        let mut last_error = String::new();

        for attempt in 1..=attempts {
            match self.invoker.invoke(prompt) {
                Ok(text) => return Ok(text),
                Err(e) => {
                    tracing::warn!(attempt, attempts, error = %e, "judge invocation failed");
                    last_error = e.to_string();
                    if attempt < attempts && !self.options.retry_cooldown.is_zero() {
                        thread::sleep(self.options.retry_cooldown);
                    }
                }
            }
        }

        Err(JudgeError::InvocationExhausted {
            attempts,
            last_error,
        })
    }

    /// Invoke, parse and validate; parse and validation failures are final
    fn evaluate(&self, mode: JudgeMode, prompt: &str) -> Result<(Judgment, String)> {
        let raw = self.invoke_with_retries(prompt)?;
        let document = response::parse_response(&raw)?;
        let judgment = validate::validate(mode, &document)?;
        Ok((judgment, raw))
    }

    /// Score one session against a rubric and write `<session>/scores/<rubric>.json`
    #[tracing::instrument(skip(self, session_dir, files, rubric, context), fields(rubric = %rubric.name))]
    pub fn judge_single(
        &self,
        session_id: &str,
        session_dir: &Path,
        files: &[CodeFile],
        rubric: &Rubric,
        context: Option<&str>,
    ) -> Result<ScoreArtifact> {
        let start = std::time::Instant::now();
        let prompt = prompt::build_single_prompt(rubric, files, context);
        let (judgment, raw) = self.evaluate(JudgeMode::Single, &prompt)?;
        let Judgment::Score(score) = judgment else {
            return Err(JudgeError::Other("validator returned a non-score judgment".into()));
        };

        let artifact = ScoreArtifact::from_score(
            score,
            &rubric.name,
            rubric.weight,
            session_id,
            &self.options.model,
            files.iter().map(|f| f.filename.clone()).collect(),
            raw,
        );
        artifact::write_json_atomic(
            &artifact::score_artifact_path(session_dir, &rubric.name),
            &artifact,
        )?;
        trace_time!(start, "judge_single");
        Ok(artifact)
    }

    /// Compare two sessions and write `comparisons/<a>-vs-<b>/comparison-<rubric>.json`
    #[tracing::instrument(skip_all, fields(a = a.id, b = b.id, rubric = %rubric.name))]
    pub fn judge_comparative(
        &self,
        results_root: &Path,
        a: SessionRef<'_>,
        b: SessionRef<'_>,
        rubric: &Rubric,
        context: Option<&str>,
    ) -> Result<ComparisonArtifact> {
        let start = std::time::Instant::now();
        let prompt = prompt::build_comparative_prompt(rubric, a.files, b.files, context);
        let (judgment, raw) = self.evaluate(JudgeMode::Comparative, &prompt)?;
        let Judgment::Comparison(comparison) = judgment else {
            return Err(JudgeError::Other("validator returned a non-comparison judgment".into()));
        };

        let artifact = ComparisonArtifact {
            rubric: rubric.name.clone(),
            session_a: a.id.to_string(),
            session_b: b.id.to_string(),
            judged_at: Utc::now(),
            model: self.options.model.clone(),
            comparison,
            raw_response: raw,
        };
        artifact::write_json_atomic(
            &artifact::comparison_artifact_path(results_root, a.id, b.id, &rubric.name),
            &artifact,
        )?;
        trace_time!(start, "judge_comparative");
        Ok(artifact)
    }

    /// Judge a framework session against a zero-assistance baseline and write
    /// `comparisons/<baseline>-vs-<framework>/baseline-comparison-<rubric>.json`
    #[tracing::instrument(skip_all, fields(baseline = baseline.id, framework = framework.id, rubric = %rubric.name))]
    pub fn judge_baseline(
        &self,
        results_root: &Path,
        baseline: SessionRef<'_>,
        framework: SessionRef<'_>,
        rubric: &Rubric,
        context: Option<&str>,
    ) -> Result<BaselineArtifact> {
        let start = std::time::Instant::now();
        let prompt =
            prompt::build_baseline_prompt(rubric, baseline.files, framework.files, context);
        let (judgment, raw) = self.evaluate(JudgeMode::Baseline, &prompt)?;
        let Judgment::Baseline(comparison) = judgment else {
            return Err(JudgeError::Other("validator returned a non-baseline judgment".into()));
        };

        let artifact = BaselineArtifact {
            rubric: rubric.name.clone(),
            baseline_session: baseline.id.to_string(),
            framework_session: framework.id.to_string(),
            judged_at: Utc::now(),
            model: self.options.model.clone(),
            comparison,
            raw_response: raw,
        };
        artifact::write_json_atomic(
            &artifact::baseline_artifact_path(
                results_root,
                baseline.id,
                framework.id,
                &rubric.name,
            ),
            &artifact,
        )?;
        trace_time!(start, "judge_baseline");
        Ok(artifact)
    }
}
