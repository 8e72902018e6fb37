//! Final report synthesis over the full discussion log.

use crate::generative::GenerativeService;
use crate::prompts;
use crate::store::StoredMessage;
use crate::transcript::render_full;
use log::debug;

const REPORT_TEMPERATURE: f32 = 0.3;

#[derive(Clone)]
pub struct ReportSynthesizer {
    service: GenerativeService,
    language: String,
}

impl ReportSynthesizer {
    pub fn new(service: GenerativeService, language: impl Into<String>) -> Self {
        Self {
            service,
            language: language.into(),
        }
    }

    /// Raw execution-plan text for the whole, unwindowed log.
    pub async fn synthesize(&self, task: &str, goal: &str, messages: &[StoredMessage]) -> String {
        let log = render_full(messages);
        let prompt = prompts::report(task, goal, &log, &self.language);
        debug!(
            "ReportSynthesizer: {} messages, prompt of {} chars",
            messages.len(),
            prompt.chars().count()
        );
        self.service
            .complete_sync(&prompt, REPORT_TEMPERATURE, false)
            .await
    }
}
