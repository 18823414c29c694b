//! Codejudge Core Library
//!
//! Judging and statistical-aggregation engine: rubric loading, prompt
//! construction, LLM judging with validation, score collection, Welch's
//! t-test, and report rendering.

pub mod aggregate;
pub mod collect;
pub mod config;
pub mod error;
pub mod files;
pub mod format;
pub mod judge;
pub mod logging;
pub mod prompt;
pub mod report;
pub mod rubric;
pub mod stats;
