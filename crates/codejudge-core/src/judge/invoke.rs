//! The LLM invocation boundary.
//!
//! The engine only needs `prompt -> text`. `CommandInvoker` reaches the model
//! through an external program that reads the prompt on stdin and prints the
//! response on stdout.

use crate::error::{JudgeError, Result};
use std::io::{Read, Write};
use std::process::{Command, Stdio};
use std::thread;
use std::time::Duration;
use wait_timeout::ChildExt;

/// Anything that can answer a judging prompt
pub trait LlmInvoker: Send + Sync {
    /// Send a prompt and return the raw response text
    fn invoke(&self, prompt: &str) -> Result<String>;
}

/// Invokes an external program once per prompt
#[derive(Debug, Clone)]
pub struct CommandInvoker {
    pub program: String,
    pub args: Vec<String>,
    pub timeout: Duration,
}

impl CommandInvoker {
    pub fn new(program: impl Into<String>, args: Vec<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            args,
            timeout,
        }
    }

    fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn failure(invoker: &CommandInvoker, reason: impl std::fmt::Display) -> JudgeError {
    JudgeError::io_operation("run judge command", invoker.command_line(), reason)
}

impl LlmInvoker for CommandInvoker {
    fn invoke(&self, prompt: &str) -> Result<String> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| failure(self, e))?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| failure(self, "stdin unavailable"))?;
        let mut stdout = child
            .stdout
            .take()
            .ok_or_else(|| failure(self, "stdout unavailable"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| failure(self, "stderr unavailable"))?;

        // Pipes are drained on their own threads so a large prompt or response
        // cannot fill a buffer and stall the child.
        let prompt = prompt.to_string();
        let writer = thread::spawn(move || {
            let result = stdin.write_all(prompt.as_bytes());
            drop(stdin);
            result
        });
        let out_reader = thread::spawn(move || {
            let mut buf = String::new();
            stdout.read_to_string(&mut buf).map(|_| buf)
        });
        let err_reader = thread::spawn(move || {
            let mut buf = String::new();
            let _ = stderr.read_to_string(&mut buf);
            buf
        });

        let status = match child.wait_timeout(self.timeout).map_err(|e| failure(self, e))? {
            Some(status) => status,
            None => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(failure(
                    self,
                    format!("timed out after {}s", self.timeout.as_secs()),
                ));
            }
        };

        if let Ok(Err(e)) = writer.join() {
            // The child may legitimately exit before reading all input.
            tracing::debug!(error = %e, "judge command closed stdin early");
        }
        let output = out_reader
            .join()
            .map_err(|_| failure(self, "stdout reader panicked"))?
            .map_err(|e| failure(self, e))?;
        let errors = err_reader.join().unwrap_or_default();

        if !status.success() {
            let detail = errors.trim();
            return Err(failure(
                self,
                format!(
                    "exited with {}{}",
                    status,
                    if detail.is_empty() {
                        String::new()
                    } else {
                        format!(": {}", detail.lines().last().unwrap_or(detail))
                    }
                ),
            ));
        }

        Ok(output)
    }
}
