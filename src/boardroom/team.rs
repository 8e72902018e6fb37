//! Selection of the five-member expert team for a task.

use crate::catalog::{AgentCatalog, AgentDefinition};
use crate::generative::GenerativeService;
use crate::parsing::extract_array;
use crate::prompts;
use log::{debug, warn};
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;

/// Seats at the table.
pub const TEAM_SIZE: usize = 5;

/// Fallback agents, in fill priority order.
pub const DEFAULT_TEAM_IDS: [&str; TEAM_SIZE] = [
    "strategy_consultant",
    "financial_controller",
    "tech_lead",
    "marketing_strategist",
    "risk_manager",
];

const SELECTION_TEMPERATURE: f32 = 0.1;

/// Asks the model to pick [`TEAM_SIZE`] agents from the catalog and repairs its answer.
///
/// Returned agents have unique ids and unique role names, in catalog order followed by
/// any defaults used to fill the team.
#[derive(Clone)]
pub struct TeamSelector {
    catalog: Arc<AgentCatalog>,
    service: GenerativeService,
}

impl TeamSelector {
    pub fn new(catalog: Arc<AgentCatalog>, service: GenerativeService) -> Self {
        Self { catalog, service }
    }

    pub async fn select(&self, task: &str) -> Vec<AgentDefinition> {
        let prompt = prompts::team_selection(task, self.catalog.iter());
        let raw = self
            .service
            .complete_sync(&prompt, SELECTION_TEMPERATURE, true)
            .await;

        let team = match extract_array::<Vec<Value>>(&raw) {
            Ok(ids) => {
                let wanted: HashSet<&str> = ids.iter().filter_map(Value::as_str).collect();
                let mut team = TeamBuilder::default();
                for agent in self.catalog.iter().filter(|a| wanted.contains(a.id.as_str())) {
                    team.push(agent);
                }
                if team.len() < TEAM_SIZE {
                    debug!(
                        "TeamSelector: model picked {} usable agents, filling from defaults",
                        team.len()
                    );
                    self.fill_defaults(&mut team);
                }
                team
            }
            Err(err) => {
                warn!("TeamSelector: falling back to the default team: {}", err);
                let mut team = TeamBuilder::default();
                self.fill_defaults(&mut team);
                team
            }
        };

        let team = team.finish();
        if team.len() < TEAM_SIZE {
            warn!(
                "TeamSelector: catalog of {} agents only yielded {} team members",
                self.catalog.len(),
                team.len()
            );
        }
        team
    }

    fn fill_defaults(&self, team: &mut TeamBuilder) {
        for id in DEFAULT_TEAM_IDS {
            if let Some(agent) = self.catalog.get(id) {
                team.push(agent);
            }
        }
    }
}

#[derive(Default)]
struct TeamBuilder {
    members: Vec<AgentDefinition>,
    ids: HashSet<String>,
    roles: HashSet<String>,
}

impl TeamBuilder {
    fn push(&mut self, agent: &AgentDefinition) {
        if self.members.len() >= TEAM_SIZE
            || self.ids.contains(&agent.id)
            || self.roles.contains(&agent.role)
        {
            return;
        }
        self.ids.insert(agent.id.clone());
        self.roles.insert(agent.role.clone());
        self.members.push(agent.clone());
    }

    fn len(&self) -> usize {
        self.members.len()
    }

    fn finish(self) -> Vec<AgentDefinition> {
        self.members
    }
}
