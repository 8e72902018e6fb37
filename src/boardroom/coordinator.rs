//! The coordinator ("PM") decision protocol.
//!
//! Each turn the coordinator is asked, in JSON mode, who should speak next and what to
//! ask them. Malformed or failed answers fall back to the first eligible role with a
//! generic request for an opinion. Answers naming a role outside the eligible list are
//! replaced by a cyclic pick so the turn always has a valid speaker.

use crate::error::DiscussionError;
use crate::generative::GenerativeService;
use crate::parsing::extract_object;
use crate::phase::Phase;
use crate::prompts;
use log::{debug, warn};
use serde::Deserialize;

/// Sender name of every coordinator message.
pub const COORDINATOR_ID: &str = "PM";

/// Instruction used when the coordinator's answer cannot be used.
pub const FALLBACK_INSTRUCTION: &str = "意見をお願いします。";

const COORDINATOR_TEMPERATURE: f32 = 0.5;

/// Why a speaker was picked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionReason {
    /// The coordinator named an eligible role.
    Coordinator,
    /// The coordinator's answer was unusable; first eligible role taken.
    ParseFallback,
    /// The coordinator named an ineligible role; cyclic pick taken.
    CyclicOverride,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoordinatorDecision {
    pub next_speaker: String,
    pub instruction: String,
    pub reason: SelectionReason,
}

#[derive(Deserialize)]
struct RawDecision {
    #[serde(default)]
    next_speaker: Option<String>,
    #[serde(default)]
    instruction: Option<String>,
}

/// Roles that may speak next: every role except `last_speaker`, or every role when
/// excluding it would leave nobody.
pub fn eligible_speakers(roles: &[String], last_speaker: &str) -> Vec<String> {
    let eligible: Vec<String> = roles
        .iter()
        .filter(|role| role.as_str() != last_speaker)
        .cloned()
        .collect();
    if eligible.is_empty() {
        roles.to_vec()
    } else {
        eligible
    }
}

#[derive(Clone)]
pub struct Coordinator {
    service: GenerativeService,
    language: String,
}

impl Coordinator {
    pub fn new(service: GenerativeService, language: impl Into<String>) -> Self {
        Self {
            service,
            language: language.into(),
        }
    }

    /// Pick the next speaker among `eligible` for the 1-based `turn`.
    ///
    /// `eligible` must not be empty.
    pub async fn decide(
        &self,
        task: &str,
        phase: Phase,
        history: &str,
        eligible: &[String],
        turn: usize,
    ) -> CoordinatorDecision {
        let prompt = prompts::coordinator(task, phase, history, eligible, &self.language);
        let raw = self
            .service
            .complete_sync(&prompt, COORDINATOR_TEMPERATURE, true)
            .await;
        resolve_decision(&raw, eligible, turn)
    }
}

/// Turn the coordinator's raw answer into a decision whose speaker is in `eligible`.
///
/// The cyclic override indexes `eligible` (the roles minus the previous speaker), not the
/// full role list, so naming the previous speaker is overridden too.
pub fn resolve_decision(raw: &str, eligible: &[String], turn: usize) -> CoordinatorDecision {
    let first = eligible.first().cloned().unwrap_or_default();

    let parsed = extract_object::<RawDecision>(raw).and_then(|decision| {
        match (decision.next_speaker, decision.instruction) {
            (Some(speaker), Some(instruction)) => Ok((speaker, instruction)),
            _ => Err(DiscussionError::ParseFailure(
                "decision is missing next_speaker or instruction".to_string(),
            )),
        }
    });

    let (speaker, instruction) = match parsed {
        Ok(pair) => pair,
        Err(err) => {
            warn!("Coordinator: unusable decision, asking {}: {}", first, err);
            return CoordinatorDecision {
                next_speaker: first,
                instruction: FALLBACK_INSTRUCTION.to_string(),
                reason: SelectionReason::ParseFallback,
            };
        }
    };

    if eligible.iter().any(|role| *role == speaker) {
        return CoordinatorDecision {
            next_speaker: speaker,
            instruction,
            reason: SelectionReason::Coordinator,
        };
    }

    let fallback = if eligible.is_empty() {
        first
    } else {
        eligible[turn % eligible.len()].clone()
    };
    debug!(
        "Coordinator: {:?} is not eligible on turn {}, using {}",
        speaker, turn, fallback
    );
    CoordinatorDecision {
        next_speaker: fallback,
        instruction,
        reason: SelectionReason::CyclicOverride,
    }
}

/// Text of the coordinator message announcing a turn.
pub fn coordinator_message(phase: Phase, speaker: &str, instruction: &str) -> String {
    format!("({}) {}さん、{}", phase.label(), speaker, instruction)
}
