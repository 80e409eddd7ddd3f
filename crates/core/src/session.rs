//! Per-hunk interactive approval state machine.
//!
//! In interactive mode every hunk passes through one [`InteractiveSession`]:
//! the session starts in `Prompting`, consumes exactly one operator command
//! from a [`ReviewGate`], and lands in a terminal state. The gate is the
//! explicit suspend point: the CLI backs it with a blocking terminal read,
//! tests supply a scripted sequence. No timeout is imposed.

use std::path::Path;

use tracing::debug;

use crate::conflict::ConflictHunk;

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

/// One operator command, parsed from a single input token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewCommand {
    /// Use the provider's suggestion as-is (`y`, empty input, or anything
    /// unrecognized).
    Accept,
    /// Re-emit the original conflict block (`n`).
    Reject,
    /// Re-emit the original conflict block, recorded as skipped (`s`).
    Skip,
    /// Halt the entire remaining batch (`q`).
    Quit,
}

impl ReviewCommand {
    /// Parse an operator input token. Case-insensitive; surrounding
    /// whitespace ignored. Unrecognized input defaults to accept.
    pub fn from_input(input: &str) -> Self {
        match input.trim().to_lowercase().as_str() {
            "q" => Self::Quit,
            "n" => Self::Reject,
            "s" => Self::Skip,
            _ => Self::Accept,
        }
    }
}

// ---------------------------------------------------------------------------
// Gate
// ---------------------------------------------------------------------------

/// Everything a gate needs to render one approval prompt.
#[derive(Debug)]
pub struct ReviewPrompt<'a> {
    /// The file being resolved.
    pub file: &'a Path,
    /// Zero-based index of the hunk within the file.
    pub hunk_index: usize,
    /// Total hunks in the file.
    pub hunk_count: usize,
    /// The conflicted region under review.
    pub hunk: &'a ConflictHunk,
    /// The provider's proposed resolution, already cleaned.
    pub suggestion: &'a str,
}

/// Caller-owned approval gate.
///
/// Implementations render the prompt however they like and block until one
/// command is available. Exactly one command is consumed per prompt.
pub trait ReviewGate {
    fn review(&mut self, prompt: &ReviewPrompt<'_>) -> ReviewCommand;
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// States of a per-hunk approval session. All states except `Prompting`
/// are terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// Waiting for an operator command.
    Prompting,
    /// Suggestion approved.
    Accepted,
    /// Hunk left unresolved; `skipped` distinguishes `s` from `n`.
    Remarked { skipped: bool },
    /// Operator quit; the whole batch halts and the current file is not
    /// rewritten.
    Aborted,
}

/// The approval state machine for a single hunk.
#[derive(Debug)]
pub struct InteractiveSession {
    state: SessionState,
}

impl InteractiveSession {
    pub fn new() -> Self {
        Self {
            state: SessionState::Prompting,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn is_terminal(&self) -> bool {
        self.state != SessionState::Prompting
    }

    /// Consume one operator command and transition to a terminal state.
    /// Commands submitted after the session is terminal are ignored.
    pub fn submit(&mut self, command: ReviewCommand) -> &SessionState {
        if self.is_terminal() {
            return &self.state;
        }
        self.state = match command {
            ReviewCommand::Accept => SessionState::Accepted,
            ReviewCommand::Reject => SessionState::Remarked { skipped: false },
            ReviewCommand::Skip => SessionState::Remarked { skipped: true },
            ReviewCommand::Quit => SessionState::Aborted,
        };
        debug!(state = ?self.state, "session transition");
        &self.state
    }

    /// Drive a full session for one hunk: prompt the gate once, feed the
    /// command through the state machine, and return the terminal state.
    pub fn run(gate: &mut dyn ReviewGate, prompt: &ReviewPrompt<'_>) -> SessionState {
        let mut session = Self::new();
        let command = gate.review(prompt);
        session.submit(command).clone()
    }
}

impl Default for InteractiveSession {
    fn default() -> Self {
        Self::new()
    }
}
