//! Subprocess generator backend.
//!
//! Spawns a configured external command per call, writes the instruction to
//! its stdin, and reads the analysis from its stdout. Stderr is captured and
//! only surfaces (truncated) in the error when the command fails.

use std::process::Stdio;

use async_trait::async_trait;
use groundcheck_utils::error::GeneratorError;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use crate::{Generated, GenerationRequest, Generator};

/// Keep at most this many bytes of stderr in a failure report.
const STDERR_TAIL_BYTES: usize = 2048;

/// Generator backend that shells out to a configured command.
///
/// The command is expected to read one instruction from stdin, write one
/// analysis to stdout, and exit 0. `kill_on_drop` is set so a caller that
/// abandons the call on timeout also reaps the child.
#[derive(Debug, Clone)]
pub struct CommandGenerator {
    command: String,
    args: Vec<String>,
}

impl CommandGenerator {
    pub fn new(command: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            command: command.into(),
            args,
        }
    }

    /// The configured command name, used as the backend label.
    #[must_use]
    pub fn command(&self) -> &str {
        &self.command
    }
}

#[async_trait]
impl Generator for CommandGenerator {
    async fn generate(&self, request: GenerationRequest) -> Result<Generated, GeneratorError> {
        debug!(
            command = %self.command,
            rule = %request.rule_id,
            attempt = request.attempt,
            instruction_bytes = request.instruction.len(),
            "spawning generator command"
        );

        let mut cmd = Command::new(&self.command);
        cmd.args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = cmd.spawn().map_err(|err| GeneratorError::Spawn {
            command: self.command.clone(),
            reason: err.to_string(),
        })?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(request.instruction.as_bytes()).await?;
            drop(stdin);
        }

        let output = child.wait_with_output().await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(GeneratorError::NonZeroExit {
                command: self.command.clone(),
                code: output.status.code().unwrap_or(-1),
                stderr_tail: stderr_tail(&stderr),
            });
        }

        let text = String::from_utf8_lossy(&output.stdout).into_owned();
        if text.trim().is_empty() {
            return Err(GeneratorError::Empty);
        }

        debug!(bytes = text.len(), "generator command finished");
        Ok(Generated::new(text, &self.command))
    }
}

/// Last `STDERR_TAIL_BYTES` of stderr, trimmed, on a char boundary.
fn stderr_tail(stderr: &str) -> String {
    let trimmed = stderr.trim_end();
    if trimmed.len() <= STDERR_TAIL_BYTES {
        return trimmed.to_string();
    }
    let mut start = trimmed.len() - STDERR_TAIL_BYTES;
    while !trimmed.is_char_boundary(start) {
        start += 1;
    }
    format!("... {}", &trimmed[start..])
}
