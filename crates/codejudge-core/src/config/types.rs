//! Configuration type definitions

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default config file name looked up in the working directory
pub const CONFIG_FILE_NAME: &str = "codejudge.toml";

/// Judge configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JudgeConfig {
    /// Directory holding `<name>.md` rubrics
    #[serde(default = "default_rubrics_dir")]
    pub rubrics_dir: PathBuf,

    /// Model label recorded in every artifact
    #[serde(default = "default_model")]
    pub model: String,

    /// Maximum invocation attempts per judging call
    #[serde(default = "default_retries")]
    pub retries: u32,

    /// Pause between failed invocation attempts
    #[serde(default)]
    pub retry_cooldown_secs: u64,

    /// Maximum concurrent judging calls in a batch
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Per-invocation timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Significance level for variant comparison
    #[serde(default = "default_alpha")]
    pub alpha: f64,

    /// Source files larger than this are left out of prompts
    #[serde(default = "default_max_file_bytes")]
    pub max_file_bytes: u64,

    /// External LLM command
    #[serde(default)]
    pub llm: LlmCommandConfig,
}

impl Default for JudgeConfig {
    fn default() -> Self {
        Self {
            rubrics_dir: default_rubrics_dir(),
            model: default_model(),
            retries: default_retries(),
            retry_cooldown_secs: 0,
            concurrency: default_concurrency(),
            timeout_secs: default_timeout_secs(),
            alpha: default_alpha(),
            max_file_bytes: default_max_file_bytes(),
            llm: LlmCommandConfig::default(),
        }
    }
}

/// Program used to reach the LLM; the prompt is written to its stdin
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LlmCommandConfig {
    #[serde(default = "default_program")]
    pub program: String,

    #[serde(default = "default_args")]
    pub args: Vec<String>,
}

impl Default for LlmCommandConfig {
    fn default() -> Self {
        Self {
            program: default_program(),
            args: default_args(),
        }
    }
}

fn default_rubrics_dir() -> PathBuf {
    PathBuf::from("rubrics")
}

fn default_model() -> String {
    "claude".to_string()
}

fn default_retries() -> u32 {
    3
}

fn default_concurrency() -> usize {
    2
}

fn default_timeout_secs() -> u64 {
    300
}

fn default_alpha() -> f64 {
    0.05
}

fn default_max_file_bytes() -> u64 {
    200_000
}

fn default_program() -> String {
    "claude".to_string()
}

fn default_args() -> Vec<String> {
    vec![
        "-p".to_string(),
        "--output-format".to_string(),
        "json".to_string(),
    ]
}
