//! Discussion phases derived from the turn number.

use std::fmt;

/// Number of expert turns in one run before the report is synthesized.
pub const TURN_BUDGET: usize = 10;

/// Coarse stage of a discussion. Turns 1–3 diverge, 4–7 deepen, 8–10 converge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Diverge,
    Deepen,
    Converge,
}

impl Phase {
    /// Phase for a 1-based turn number. Turns past the budget stay in `Converge`.
    pub fn for_turn(turn: usize) -> Self {
        match turn {
            0..=3 => Phase::Diverge,
            4..=7 => Phase::Deepen,
            _ => Phase::Converge,
        }
    }

    /// Label used in prompts, status events and coordinator messages.
    pub fn label(&self) -> &'static str {
        match self {
            Phase::Diverge => "DIVERGE (Ideation)",
            Phase::Deepen => "DEEPEN (Critique & Feasibility)",
            Phase::Converge => "CONVERGE (Planning)",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trisection_over_the_turn_budget() {
        let phases: Vec<Phase> = (1..=TURN_BUDGET).map(Phase::for_turn).collect();
        assert_eq!(
            phases,
            vec![
                Phase::Diverge,
                Phase::Diverge,
                Phase::Diverge,
                Phase::Deepen,
                Phase::Deepen,
                Phase::Deepen,
                Phase::Deepen,
                Phase::Converge,
                Phase::Converge,
                Phase::Converge,
            ]
        );
    }

    #[test]
    fn labels() {
        assert_eq!(Phase::Diverge.to_string(), "DIVERGE (Ideation)");
        assert_eq!(Phase::Deepen.label(), "DEEPEN (Critique & Feasibility)");
        assert_eq!(Phase::Converge.label(), "CONVERGE (Planning)");
    }
}
