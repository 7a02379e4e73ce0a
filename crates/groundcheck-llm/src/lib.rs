//! Generator backends for groundcheck.
//!
//! The pipeline talks to its text generator through the [`Generator`] trait.
//! Production runs use [`CommandGenerator`], which pipes an instruction to a
//! configured external command and reads the analysis back from stdout. Tests
//! and development use [`ScriptedGenerator`], which replays queued replies
//! without spawning anything.
//!
//! Backends do not enforce deadlines themselves. The caller bounds each
//! `generate` call with `tokio::time::timeout` using the request's timeout
//! and maps an elapsed deadline to [`GeneratorError::Timeout`].

mod command;
mod scripted;

pub use command::CommandGenerator;
pub use scripted::{ScriptedGenerator, ScriptedReply};

use std::time::Duration;

use async_trait::async_trait;
use groundcheck_utils::error::GeneratorError;

/// Default per-call generation budget in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// One generation call: the instruction to answer plus its bookkeeping.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// Full instruction text, handed to the backend verbatim.
    pub instruction: String,
    /// Rule ID of the scanner finding driving this round, for logs.
    pub rule_id: String,
    /// Attempt number within the round; 0 is the initial draft.
    pub attempt: usize,
    /// Budget for this single call, enforced by the caller.
    pub timeout: Duration,
}

impl GenerationRequest {
    pub fn new(instruction: impl Into<String>, rule_id: impl Into<String>) -> Self {
        Self {
            instruction: instruction.into(),
            rule_id: rule_id.into(),
            attempt: 0,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    #[must_use]
    pub fn with_attempt(mut self, attempt: usize) -> Self {
        self.attempt = attempt;
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Raw text handed back by a backend.
#[derive(Debug, Clone)]
pub struct Generated {
    /// The analysis text, expected to follow the report contract.
    pub text: String,
    /// Which backend produced it, for summaries and logs.
    pub backend: String,
}

impl Generated {
    pub fn new(text: impl Into<String>, backend: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            backend: backend.into(),
        }
    }
}

/// Backend seam for the generation pipeline.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Produce one analysis for the given instruction.
    async fn generate(&self, request: GenerationRequest) -> Result<Generated, GeneratorError>;
}
