//! Per-finding generation round state
//!
//! Each scanner finding gets one round: Draft, Validated, then either
//! Accepted, or Repaired back to Draft, or Rejected once the repair budget
//! is spent. The full transition history is recorded so a rejection can
//! report exactly how the round died.

use std::fmt;

use serde::Serialize;

/// One state of a generation round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundState {
    /// An attempt is in flight or about to start
    Draft,
    /// The attempt produced text and the checks have run over it
    Validated,
    /// The checks found violations and a repair attempt was granted
    Repaired,
    /// The analysis passed every check
    Accepted,
    /// The repair budget is spent with violations outstanding
    Rejected,
}

impl fmt::Display for RoundState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Draft => "draft",
            Self::Validated => "validated",
            Self::Repaired => "repaired",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
        };
        f.write_str(label)
    }
}

/// Tracks one finding's attempts against the repair budget.
#[derive(Debug, Clone)]
pub struct Round {
    rule_id: String,
    citation: usize,
    max_repair_attempts: usize,
    attempts: usize,
    state: RoundState,
    history: Vec<RoundState>,
}

impl Round {
    #[must_use]
    pub fn new(rule_id: impl Into<String>, citation: usize, max_repair_attempts: usize) -> Self {
        Self {
            rule_id: rule_id.into(),
            citation,
            max_repair_attempts,
            attempts: 0,
            state: RoundState::Draft,
            history: vec![RoundState::Draft],
        }
    }

    /// Start the next generation attempt. The first attempt reuses the
    /// initial Draft entry; repairs open a fresh one.
    pub fn begin_attempt(&mut self) {
        self.attempts += 1;
        if self.attempts > 1 {
            self.push(RoundState::Draft);
        }
    }

    /// The attempt produced text and the checks ran over it.
    pub fn validated(&mut self) {
        self.push(RoundState::Validated);
    }

    /// The checks passed; the round is over.
    pub fn accept(&mut self) {
        self.push(RoundState::Accepted);
    }

    /// The checks failed and a repair attempt was granted.
    pub fn repair(&mut self) {
        self.push(RoundState::Repaired);
    }

    /// The repair budget is spent; the round is over.
    pub fn reject(&mut self) {
        self.push(RoundState::Rejected);
    }

    /// True while the budget allows another attempt. The initial attempt is
    /// free; only regenerations count against `max_repair_attempts`.
    #[must_use]
    pub fn can_repair(&self) -> bool {
        self.attempts < self.max_repair_attempts + 1
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self.state, RoundState::Accepted | RoundState::Rejected)
    }

    #[must_use]
    pub fn rule_id(&self) -> &str {
        &self.rule_id
    }

    #[must_use]
    pub fn citation(&self) -> usize {
        self.citation
    }

    #[must_use]
    pub fn attempts(&self) -> usize {
        self.attempts
    }

    #[must_use]
    pub fn state(&self) -> RoundState {
        self.state
    }

    #[must_use]
    pub fn history(&self) -> &[RoundState] {
        &self.history
    }

    fn push(&mut self, state: RoundState) {
        self.state = state;
        self.history.push(state);
    }
}
