//! Integration tests for the codejudge CLI
//!
//! The judge is a shell one-liner that discards the prompt and prints a
//! canned `response.json` from the working directory.

mod support;

mod batch;
mod compare;
mod errors;
mod judge;
mod report;
mod rubrics;
