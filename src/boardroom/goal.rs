//! Strategic goal drafting.

use crate::generative::GenerativeService;
use crate::prompts;

const GOAL_TEMPERATURE: f32 = 0.7;

/// Drafts the markdown goal document a discussion works toward.
///
/// The service's own error text becomes the goal when generation fails.
#[derive(Clone)]
pub struct GoalDefiner {
    service: GenerativeService,
    language: String,
}

impl GoalDefiner {
    pub fn new(service: GenerativeService, language: impl Into<String>) -> Self {
        Self {
            service,
            language: language.into(),
        }
    }

    pub async fn define(&self, task: &str) -> String {
        let prompt = prompts::strategic_goal(task, &self.language);
        self.service
            .complete_sync(&prompt, GOAL_TEMPERATURE, false)
            .await
    }
}
