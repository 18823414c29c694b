//! Command dispatch logic for codejudge

use std::env;
use std::time::Instant;

use crate::cli::Cli;
use codejudge_core::config::JudgeConfig;
use codejudge_core::error::Result;
use tracing::debug;

mod command;

pub use command::{Command, CommandContext};

pub fn run(cli: &Cli, start: Instant) -> Result<()> {
    let cwd = env::current_dir()?;
    let config = JudgeConfig::discover(cli.config.as_deref(), &cwd)?;

    debug!(elapsed = ?start.elapsed(), "load_config");

    let ctx = CommandContext::new(cli, config, start);
    cli.command.execute(&ctx)
}
