//! Error taxonomy shared by every discussion component.
//!
//! Only [`DiscussionError::InvalidInput`] and [`DiscussionError::Storage`] ever reach a
//! caller of
//! [`DiscussionOrchestrator::create_discussion`](crate::orchestrator::DiscussionOrchestrator::create_discussion).
//! The remaining variants are recovered locally: generative and parse
//! failures collapse into deterministic fallbacks, turn failures are logged and surfaced
//! as [`TurnOutcome::Failed`](crate::event::TurnOutcome::Failed), and an unknown
//! discussion simply produces an empty event stream.
//!
//! # Examples
//!
//! ```
//! use boardroom::error::DiscussionError;
//!
//! let err = DiscussionError::InvalidInput("Task required".into());
//! assert_eq!(err.to_string(), "Invalid input: Task required");
//! ```

use std::error::Error;
use std::fmt;

/// Errors raised while creating or running a discussion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscussionError {
    /// The creation request carried no usable task description.
    InvalidInput(String),

    /// The generative text service failed or blocked the content.
    GenerativeServiceFailure(String),

    /// Structured output from the generative service could not be parsed.
    ParseFailure(String),

    /// A single turn of the run loop could not be completed.
    TurnFailure {
        /// 1-based turn number.
        turn: usize,
        /// Human-readable cause.
        reason: String,
    },

    /// No discussion exists for the given identifier.
    UnknownDiscussion(String),

    /// The persistent store (or the agent catalog file) could not be read or written.
    Storage(String),

    /// The consumer of the event stream went away.
    Cancelled,
}

impl fmt::Display for DiscussionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiscussionError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            DiscussionError::GenerativeServiceFailure(msg) => {
                write!(f, "Generative service failure: {}", msg)
            }
            DiscussionError::ParseFailure(msg) => write!(f, "Parse failure: {}", msg),
            DiscussionError::TurnFailure { turn, reason } => {
                write!(f, "Turn {} failed: {}", turn, reason)
            }
            DiscussionError::UnknownDiscussion(id) => write!(f, "Unknown discussion: {}", id),
            DiscussionError::Storage(msg) => write!(f, "Storage error: {}", msg),
            DiscussionError::Cancelled => write!(f, "Event stream consumer disconnected"),
        }
    }
}

impl Error for DiscussionError {}

impl From<rusqlite::Error> for DiscussionError {
    fn from(err: rusqlite::Error) -> Self {
        DiscussionError::Storage(err.to_string())
    }
}

impl From<std::io::Error> for DiscussionError {
    fn from(err: std::io::Error) -> Self {
        DiscussionError::Storage(err.to_string())
    }
}
