//! Prompt builders for every generative call of a discussion.
//!
//! Each builder takes the response language so deployments can switch away from the
//! default Japanese without touching the orchestration code.

use crate::catalog::AgentDefinition;
use crate::phase::Phase;
use serde::Serialize;

/// Team-selection candidates carry at most this many description characters.
pub const CANDIDATE_DESCRIPTION_CHARS: usize = 50;

#[derive(Serialize)]
struct Candidate<'a> {
    id: &'a str,
    role: &'a str,
    desc: String,
}

pub fn team_selection<'a>(
    task: &str,
    candidates: impl IntoIterator<Item = &'a AgentDefinition>,
) -> String {
    let pool: Vec<Candidate<'_>> = candidates
        .into_iter()
        .map(|agent| Candidate {
            id: &agent.id,
            role: &agent.role,
            desc: agent
                .description
                .chars()
                .take(CANDIDATE_DESCRIPTION_CHARS)
                .collect(),
        })
        .collect();
    let pool = serde_json::to_string(&pool).unwrap_or_else(|_| "[]".to_string());

    format!(
        "\nTask: {task}\nCandidates: {pool}\n\n\
         Select exactly 5 expert IDs best suited for this task.\n\
         Return JSON list of strings ONLY. Example: [\"id1\", \"id2\", \"id3\", \"id4\", \"id5\"]\n"
    )
}

pub fn strategic_goal(task: &str, language: &str) -> String {
    format!(
        "\nTask: {task}\nDefine a Strategic Business Goal ({language} Markdown).\n\
         Sections: Vision, Quantitative Goal, Target, Value Proposition, Execution Plan.\n"
    )
}

pub fn coordinator(
    task: &str,
    phase: Phase,
    history: &str,
    eligible: &[String],
    language: &str,
) -> String {
    let eligible = serde_json::to_string(eligible).unwrap_or_else(|_| "[]".to_string());
    format!(
        "\nTask: {task}\nPhase: {phase}\nHistory: {history}\nAvailable Experts: {eligible}\n\
         Decide the NEXT speaker and provide a specific question in {language}.\n\
         Output JSON: {{ \"next_speaker\": \"ExactRoleName\", \"instruction\": \"{language} Text\" }}\n"
    )
}

pub fn speaker(
    role: &str,
    agent: &AgentDefinition,
    instruction: &str,
    history: &str,
    task: &str,
    phase: Phase,
    language: &str,
) -> String {
    format!(
        "\nYou are {role}. Style: {style}. Frameworks: {frameworks}.\n\
         Task: {task}\nPhase: {phase}\nHistory: {history}\nInstruction: \"{instruction}\"\n\
         Respond in {language}. Be specific and professional.\n",
        style = agent.style,
        frameworks = agent.frameworks.join(", "),
    )
}

pub fn report(task: &str, goal: &str, log: &str, language: &str) -> String {
    format!(
        "\nTask: {task}\nGoal: {goal}\nLog: {log}\n\
         Generate a comprehensive \"Strategic Execution Plan\" in {language} Markdown.\n\
         Structure: Executive Summary, Discussion Synthesis, Strategic Framework, Risk Analysis, Action Plan.\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn team_prompt_truncates_descriptions() {
        let agent = AgentDefinition::new("cfo", "CFO", "d".repeat(80));
        let prompt = team_selection("Sell coffee", [&agent]);
        assert!(prompt.contains(&format!("\"desc\":\"{}\"", "d".repeat(50))));
        assert!(!prompt.contains(&"d".repeat(51)));
        assert!(prompt.contains("Select exactly 5"));
    }

    #[test]
    fn speaker_prompt_embeds_persona() {
        let agent = AgentDefinition::new("cfo", "CFO", "")
            .with_style("Numbers first")
            .with_frameworks(["NPV", "IRR"]);
        let prompt = speaker("CFO", &agent, "Costs?", "[PM]: hi...", "Sell coffee", Phase::Deepen, "Japanese");
        assert!(prompt.contains("You are CFO. Style: Numbers first. Frameworks: NPV, IRR."));
        assert!(prompt.contains("Phase: DEEPEN (Critique & Feasibility)"));
        assert!(prompt.contains("Instruction: \"Costs?\""));
        assert!(prompt.contains("Respond in Japanese."));
    }

    #[test]
    fn coordinator_prompt_lists_eligible_roles() {
        let prompt = coordinator(
            "Sell coffee",
            Phase::Diverge,
            "",
            &["CFO".to_string(), "CTO".to_string()],
            "English",
        );
        assert!(prompt.contains("Available Experts: [\"CFO\",\"CTO\"]"));
        assert!(prompt.contains("\"next_speaker\""));
    }
}
