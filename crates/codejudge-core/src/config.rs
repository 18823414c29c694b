//! Judge configuration
//!
//! Configuration is read from `codejudge.toml`; every key has a default so an
//! empty or missing file is valid.

pub mod types;

use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::error::{JudgeError, Result};
use crate::judge::{CommandInvoker, JudgeOptions};

pub use types::{JudgeConfig, LlmCommandConfig, CONFIG_FILE_NAME};

impl JudgeConfig {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| JudgeError::io_operation("read config", path.display(), e))?;
        let config: JudgeConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load an explicit config file, or `codejudge.toml` under `dir` if it
    /// exists, or fall back to defaults.
    pub fn discover(explicit: Option<&Path>, dir: &Path) -> Result<Self> {
        if let Some(path) = explicit {
            if !path.is_file() {
                return Err(JudgeError::not_found("config file", path.display()));
            }
            return Self::load(path);
        }

        let candidate = dir.join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            tracing::debug!(path = %candidate.display(), "loading config");
            Self::load(&candidate)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| JudgeError::Other(format!("failed to serialize config: {}", e)))?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Reject settings the engine cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.retries == 0 {
            crate::bail_invalid!("retries", "0 (must be at least 1)");
        }
        if self.concurrency == 0 {
            crate::bail_invalid!("concurrency", "0 (must be at least 1)");
        }
        if !(self.alpha > 0.0 && self.alpha < 1.0) {
            crate::bail_invalid!("alpha", format!("{} (must be between 0 and 1)", self.alpha));
        }
        if self.llm.program.trim().is_empty() {
            crate::bail_invalid!("llm.program", "empty");
        }
        Ok(())
    }

    /// Judge options derived from this configuration
    pub fn judge_options(&self) -> JudgeOptions {
        JudgeOptions {
            retries: self.retries,
            retry_cooldown: Duration::from_secs(self.retry_cooldown_secs),
            model: self.model.clone(),
        }
    }

    /// Invocation timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// The configured judge command
    pub fn invoker(&self) -> CommandInvoker {
        CommandInvoker::new(self.llm.program.clone(), self.llm.args.clone(), self.timeout())
    }
}
