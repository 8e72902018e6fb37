//! Discussion observability events.
//!
//! Implement [`EventHandler`] to follow a discussion's lifecycle independently of the
//! client-facing [`StreamEvent`](crate::stream_event::StreamEvent) stream. In particular,
//! every turn ends with a [`DiscussionEvent::TurnFinished`] carrying an explicit
//! [`TurnOutcome`], so failed turns are visible even though the run itself carries on.
//!
//! # Event Flow (one run)
//!
//! ```text
//! RunStarted
//!   └─ TurnStarted { turn: 1 }
//!   └─ SpeakerSelected { turn: 1 }
//!   └─ TurnFinished { turn: 1, outcome: Completed | Failed }
//!   └─ ... up to turn 10
//! ReportSynthesized
//! RunCompleted            (or RunCancelled if the consumer went away)
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use boardroom::event::{DiscussionEvent, EventHandler, TurnOutcome};
//! use async_trait::async_trait;
//!
//! struct FailureLogger;
//!
//! #[async_trait]
//! impl EventHandler for FailureLogger {
//!     async fn on_discussion_event(&self, event: &DiscussionEvent) {
//!         if let DiscussionEvent::TurnFinished { turn, outcome: TurnOutcome::Failed { reason }, .. } = event {
//!             eprintln!("turn {} failed: {}", turn, reason);
//!         }
//!     }
//! }
//! ```

use crate::coordinator::SelectionReason;
use async_trait::async_trait;

/// Result of one turn of the run loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    Completed {
        speaker: String,
        /// Character length of the streamed answer.
        response_length: usize,
    },
    /// The turn was abandoned. Writes made before the failure are kept.
    Failed { reason: String },
}

#[derive(Debug, Clone)]
pub enum DiscussionEvent {
    DiscussionCreated {
        discussion_id: String,
        roles: Vec<String>,
    },
    RunStarted {
        discussion_id: String,
        turn_budget: usize,
    },
    TurnStarted {
        discussion_id: String,
        turn: usize,
        phase: &'static str,
    },
    SpeakerSelected {
        discussion_id: String,
        turn: usize,
        speaker: String,
        reason: SelectionReason,
    },
    TurnFinished {
        discussion_id: String,
        turn: usize,
        outcome: TurnOutcome,
    },
    ReportSynthesized {
        discussion_id: String,
        report_length: usize,
    },
    RunCompleted {
        discussion_id: String,
        turns_completed: usize,
        turns_failed: usize,
    },
    /// The consumer stopped listening; the run was abandoned mid-way.
    RunCancelled {
        discussion_id: String,
        turn: usize,
    },
}

/// Receives [`DiscussionEvent`]s. The default implementation ignores them.
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn on_discussion_event(&self, _event: &DiscussionEvent) {}
}
