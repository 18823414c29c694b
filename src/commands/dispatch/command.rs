//! Command trait and context for dispatching commands

use std::time::Instant;

use crate::cli::{Cli, Commands, OutputFormat};
use crate::commands::{batch, compare, judge, report, rubrics};
use codejudge_core::config::JudgeConfig;
use codejudge_core::error::Result;
use codejudge_core::rubric::RubricStore;

/// Shared context for command execution
pub struct CommandContext<'a> {
    pub cli: &'a Cli,
    pub config: JudgeConfig,
    pub start: Instant,
}

impl<'a> CommandContext<'a> {
    pub fn new(cli: &'a Cli, config: JudgeConfig, start: Instant) -> Self {
        Self { cli, config, start }
    }

    pub fn format(&self) -> OutputFormat {
        self.cli.format
    }

    pub fn rubric_store(&self) -> RubricStore {
        RubricStore::new(&self.config.rubrics_dir)
    }
}

/// Trait for commands that can be executed
pub trait Command {
    fn execute(&self, ctx: &CommandContext) -> Result<()>;
}

impl Command for Commands {
    fn execute(&self, ctx: &CommandContext) -> Result<()> {
        match self {
            Commands::Judge(args) => judge::execute(ctx, args),
            Commands::Compare(args) => compare::execute(ctx, args),
            Commands::Batch(args) => batch::execute(ctx, args),
            Commands::Report(args) => report::execute(ctx, args),
            Commands::Rubrics => rubrics::execute(ctx),
        }
    }
}
