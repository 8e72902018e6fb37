//! Discussion orchestration: creation and the phased turn loop.
//!
//! [`DiscussionOrchestrator::create_discussion`] assembles a team, drafts a goal and
//! persists the discussion with its opening coordinator message.
//! [`DiscussionOrchestrator::run_stream`] then drives [`TURN_BUDGET`] turns. Each turn the
//! coordinator picks a speaker and an instruction, the speaker's answer is streamed
//! fragment by fragment, and both messages are appended to the store. After the last turn
//! the whole log is condensed into a report.
//!
//! ```text
//! create_discussion(task)
//!   ├─ TeamSelector::select ┐ concurrently
//!   ├─ GoalDefiner::define  ┘
//!   └─ store: discussion + 5 roles + opening message (one unit)
//!
//! run_stream(id)
//!   for turn in 1..=10
//!     status → coordinator decision → message → status
//!     → stream_start → stream_chunk* → stream_end
//!   status → finished(report)
//! ```
//!
//! A failure inside a turn is logged, reported as [`TurnOutcome::Failed`] to the
//! [`EventHandler`], and the loop moves on to the next turn without rolling anything back.
//! The run lives in its own task and stops as soon as the returned stream is dropped.
//!
//! # Example
//!
//! ```rust,no_run
//! use boardroom::{AgentCatalog, BoardroomConfig, DiscussionOrchestrator, InMemoryStore};
//! use boardroom::clients::gemini::GeminiClient;
//! use futures_util::StreamExt;
//! use std::sync::Arc;
//!
//! # async fn demo() -> Result<(), boardroom::DiscussionError> {
//! let config = BoardroomConfig::default();
//! let client = Arc::new(GeminiClient::new_with_model_string("key", &config.model));
//! let catalog = Arc::new(AgentCatalog::load(&config.agents_file)?);
//! let orchestrator =
//!     DiscussionOrchestrator::new(client, catalog, Arc::new(InMemoryStore::new()), &config);
//!
//! let created = orchestrator.create_discussion("Launch a subscription coffee box").await?;
//! let mut events = orchestrator.run_stream(&created.id);
//! while let Some(event) = events.next().await {
//!     print!("{}", event.to_sse());
//! }
//! # Ok(())
//! # }
//! ```

use crate::catalog::{AgentCatalog, AgentDefinition};
use crate::client_wrapper::ClientWrapper;
use crate::config::BoardroomConfig;
use crate::coordinator::{coordinator_message, eligible_speakers, Coordinator, COORDINATOR_ID};
use crate::error::DiscussionError;
use crate::event::{DiscussionEvent, EventHandler, TurnOutcome};
use crate::generative::GenerativeService;
use crate::goal::GoalDefiner;
use crate::phase::{Phase, TURN_BUDGET};
use crate::prompts;
use crate::report::ReportSynthesizer;
use crate::store::{Discussion, DiscussionStatus, DiscussionStore, RoleAssignment};
use crate::stream_event::StreamEvent;
use crate::team::TeamSelector;
use crate::transcript::render_window;
use chrono::Utc;
use futures_util::StreamExt;
use log::{debug, error, info, warn};
use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use uuid::Uuid;

const SPEAKER_TEMPERATURE: f32 = 0.7;

/// What [`DiscussionOrchestrator::create_discussion`] hands back to the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct CreatedDiscussion {
    pub id: String,
    /// Assigned roles in team order.
    pub roles: Vec<RoleAssignment>,
    pub goal: String,
    pub opening_message: String,
}

impl CreatedDiscussion {
    /// Role name → role description.
    pub fn role_descriptions(&self) -> BTreeMap<String, String> {
        self.roles
            .iter()
            .map(|role| (role.role_name.clone(), role.description.clone()))
            .collect()
    }
}

/// Opening coordinator message: kickoff, goal, and the assigned team.
pub fn opening_message(goal: &str, team: &[AgentDefinition]) -> String {
    let members = team
        .iter()
        .map(|agent| format!("・{}", agent.role))
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "プロジェクトを開始します。\n\n【戦略ゴール定義】\n{}\n\n【アサインされた専門家チーム（{}名）】\n{}",
        goal,
        team.len(),
        members
    )
}

struct RunContext {
    discussion: Discussion,
    /// Assigned role names in creation order.
    roles: Vec<String>,
    agents: HashMap<String, AgentDefinition>,
}

#[derive(Default)]
struct RunProgress {
    turn: usize,
    completed: usize,
    failed: usize,
}

#[derive(Clone)]
pub struct DiscussionOrchestrator {
    catalog: Arc<AgentCatalog>,
    store: Arc<dyn DiscussionStore>,
    service: GenerativeService,
    team_selector: TeamSelector,
    goal_definer: GoalDefiner,
    coordinator: Coordinator,
    reporter: ReportSynthesizer,
    language: String,
    turn_pacing: Duration,
    event_handler: Option<Arc<dyn EventHandler>>,
}

impl DiscussionOrchestrator {
    pub fn new(
        client: Arc<dyn ClientWrapper>,
        catalog: Arc<AgentCatalog>,
        store: Arc<dyn DiscussionStore>,
        config: &BoardroomConfig,
    ) -> Self {
        let service = GenerativeService::new(client);
        Self {
            team_selector: TeamSelector::new(Arc::clone(&catalog), service.clone()),
            goal_definer: GoalDefiner::new(service.clone(), config.language.clone()),
            coordinator: Coordinator::new(service.clone(), config.language.clone()),
            reporter: ReportSynthesizer::new(service.clone(), config.language.clone()),
            catalog,
            store,
            service,
            language: config.language.clone(),
            turn_pacing: config.turn_pacing,
            event_handler: None,
        }
    }

    pub fn with_event_handler(mut self, handler: Arc<dyn EventHandler>) -> Self {
        self.event_handler = Some(handler);
        self
    }

    pub fn catalog(&self) -> &AgentCatalog {
        &self.catalog
    }

    async fn emit(&self, event: DiscussionEvent) {
        if let Some(handler) = &self.event_handler {
            handler.on_discussion_event(&event).await;
        }
    }

    /// Assemble the team, draft the goal and persist the new discussion.
    ///
    /// Fails with [`DiscussionError::InvalidInput`] for a blank task and
    /// [`DiscussionError::Storage`] if persisting fails; generative failures are absorbed
    /// by the team and goal fallbacks.
    pub async fn create_discussion(&self, task: &str) -> Result<CreatedDiscussion, DiscussionError> {
        let task = task.trim();
        if task.is_empty() {
            return Err(DiscussionError::InvalidInput("Task required".to_string()));
        }

        let id = Uuid::new_v4().to_string();
        let (team, goal) = tokio::join!(
            self.team_selector.select(task),
            self.goal_definer.define(task)
        );

        let roles: Vec<RoleAssignment> = team
            .iter()
            .map(|agent| RoleAssignment {
                discussion_id: id.clone(),
                role_name: agent.role.clone(),
                description: agent.description.clone(),
                agent_id: agent.id.clone(),
            })
            .collect();
        let opening = opening_message(&goal, &team);

        let discussion = Discussion {
            id: id.clone(),
            task: task.to_string(),
            goal: goal.clone(),
            status: DiscussionStatus::Active,
            created_at: Utc::now(),
        };
        self.store
            .create_discussion(&discussion, &roles, COORDINATOR_ID, &opening)
            .await?;

        info!(
            "DiscussionOrchestrator: created {} with team [{}]",
            id,
            team.iter()
                .map(|agent| agent.role.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );
        self.emit(DiscussionEvent::DiscussionCreated {
            discussion_id: id.clone(),
            roles: roles.iter().map(|role| role.role_name.clone()).collect(),
        })
        .await;

        Ok(CreatedDiscussion {
            id,
            roles,
            goal,
            opening_message: opening,
        })
    }

    /// Run the discussion and stream its events.
    ///
    /// The stream ends after the `finished` event, or immediately when `discussion_id` is
    /// unknown. Every call runs a fresh set of turns appended to the existing log.
    /// Dropping the stream cancels the run, including any in-flight generative call.
    pub fn run_stream(&self, discussion_id: &str) -> ReceiverStream<StreamEvent> {
        let (tx, rx) = mpsc::channel(1);
        let orchestrator = self.clone();
        let discussion_id = discussion_id.to_string();
        tokio::spawn(async move {
            orchestrator.drive(discussion_id, tx).await;
        });
        ReceiverStream::new(rx)
    }

    async fn drive(self, discussion_id: String, tx: mpsc::Sender<StreamEvent>) {
        let run = match self.load_run(&discussion_id).await {
            Ok(Some(run)) => run,
            Ok(None) => {
                warn!("DiscussionOrchestrator: unknown discussion {}", discussion_id);
                return;
            }
            Err(err) => {
                error!(
                    "DiscussionOrchestrator: loading {} failed: {}",
                    discussion_id, err
                );
                return;
            }
        };

        info!(
            "DiscussionOrchestrator: running {} with {} roles",
            discussion_id,
            run.roles.len()
        );
        self.emit(DiscussionEvent::RunStarted {
            discussion_id: discussion_id.clone(),
            turn_budget: TURN_BUDGET,
        })
        .await;

        let mut progress = RunProgress::default();
        match self.run_loop(&run, &tx, &mut progress).await {
            Ok(()) => {
                info!(
                    "DiscussionOrchestrator: {} finished ({} turns completed, {} failed)",
                    discussion_id, progress.completed, progress.failed
                );
                self.emit(DiscussionEvent::RunCompleted {
                    discussion_id,
                    turns_completed: progress.completed,
                    turns_failed: progress.failed,
                })
                .await;
            }
            Err(err) => {
                info!(
                    "DiscussionOrchestrator: {} stopped at turn {}: {}",
                    discussion_id, progress.turn, err
                );
                self.emit(DiscussionEvent::RunCancelled {
                    discussion_id,
                    turn: progress.turn,
                })
                .await;
            }
        }
    }

    async fn load_run(&self, discussion_id: &str) -> Result<Option<RunContext>, DiscussionError> {
        let Some(discussion) = self.store.get_discussion(discussion_id).await? else {
            return Ok(None);
        };

        let mut roles = Vec::new();
        let mut agents = HashMap::new();
        for assignment in self.store.list_roles(discussion_id).await? {
            let agent = match self.catalog.get(&assignment.agent_id) {
                Some(agent) => agent.clone(),
                None => {
                    warn!(
                        "DiscussionOrchestrator: agent {} for role {} is not in the catalog",
                        assignment.agent_id, assignment.role_name
                    );
                    AgentDefinition::placeholder(assignment.role_name.clone())
                }
            };
            if !agents.contains_key(&assignment.role_name) {
                roles.push(assignment.role_name.clone());
            }
            agents.insert(assignment.role_name, agent);
        }

        Ok(Some(RunContext {
            discussion,
            roles,
            agents,
        }))
    }

    /// Only returns an error when the consumer went away.
    async fn run_loop(
        &self,
        run: &RunContext,
        tx: &mpsc::Sender<StreamEvent>,
        progress: &mut RunProgress,
    ) -> Result<(), DiscussionError> {
        let discussion_id = run.discussion.id.as_str();
        let mut last_speaker = COORDINATOR_ID.to_string();

        for turn in 1..=TURN_BUDGET {
            progress.turn = turn;
            let phase = Phase::for_turn(turn);
            self.emit(DiscussionEvent::TurnStarted {
                discussion_id: discussion_id.to_string(),
                turn,
                phase: phase.label(),
            })
            .await;

            let outcome = match self.run_turn(run, turn, phase, &mut last_speaker, tx).await {
                Ok(outcome) => outcome,
                Err(DiscussionError::Cancelled) => return Err(DiscussionError::Cancelled),
                Err(err) => {
                    let failure = DiscussionError::TurnFailure {
                        turn,
                        reason: err.to_string(),
                    };
                    error!("DiscussionOrchestrator: {}: {}", discussion_id, failure);
                    TurnOutcome::Failed {
                        reason: err.to_string(),
                    }
                }
            };

            let completed = matches!(outcome, TurnOutcome::Completed { .. });
            if completed {
                progress.completed += 1;
            } else {
                progress.failed += 1;
            }
            self.emit(DiscussionEvent::TurnFinished {
                discussion_id: discussion_id.to_string(),
                turn,
                outcome,
            })
            .await;

            if completed && !self.turn_pacing.is_zero() {
                until_closed(tx, tokio::time::sleep(self.turn_pacing)).await?;
            }
        }

        send(tx, StreamEvent::Status("Synthesizing Final Strategic Report...".to_string())).await?;
        let messages = match self.store.list_messages(discussion_id).await {
            Ok(messages) => messages,
            Err(err) => {
                error!(
                    "DiscussionOrchestrator: reading the log of {} for the report failed: {}",
                    discussion_id, err
                );
                Vec::new()
            }
        };
        let report = until_closed(
            tx,
            self.reporter
                .synthesize(&run.discussion.task, &run.discussion.goal, &messages),
        )
        .await?;

        self.emit(DiscussionEvent::ReportSynthesized {
            discussion_id: discussion_id.to_string(),
            report_length: report.chars().count(),
        })
        .await;
        send(tx, StreamEvent::Finished(report)).await
    }

    async fn run_turn(
        &self,
        run: &RunContext,
        turn: usize,
        phase: Phase,
        last_speaker: &mut String,
        tx: &mpsc::Sender<StreamEvent>,
    ) -> Result<TurnOutcome, DiscussionError> {
        let discussion = &run.discussion;
        let messages = self.store.list_messages(&discussion.id).await?;
        let history = render_window(&messages);

        send(
            tx,
            StreamEvent::Status(format!("Phase: {} - PM Coordinating...", phase.label())),
        )
        .await?;

        if run.roles.is_empty() {
            return Err(DiscussionError::InvalidInput(
                "discussion has no assigned roles".to_string(),
            ));
        }

        let eligible = eligible_speakers(&run.roles, last_speaker);
        let decision = until_closed(
            tx,
            self.coordinator
                .decide(&discussion.task, phase, &history, &eligible, turn),
        )
        .await?;
        let speaker = decision.next_speaker;
        debug!(
            "DiscussionOrchestrator: turn {} → {} ({:?})",
            turn, speaker, decision.reason
        );
        self.emit(DiscussionEvent::SpeakerSelected {
            discussion_id: discussion.id.clone(),
            turn,
            speaker: speaker.clone(),
            reason: decision.reason,
        })
        .await;
        *last_speaker = speaker.clone();

        let pm_content = coordinator_message(phase, &speaker, &decision.instruction);
        self.store
            .append_message(&discussion.id, COORDINATOR_ID, &pm_content)
            .await?;
        send(
            tx,
            StreamEvent::Message {
                sender: COORDINATOR_ID.to_string(),
                content: pm_content,
            },
        )
        .await?;

        send(tx, StreamEvent::Status(format!("{} is thinking...", speaker))).await?;

        let placeholder;
        let agent = match run.agents.get(&speaker) {
            Some(agent) => agent,
            None => {
                placeholder = AgentDefinition::placeholder(speaker.clone());
                &placeholder
            }
        };
        let prompt = prompts::speaker(
            &speaker,
            agent,
            &decision.instruction,
            &history,
            &discussion.task,
            phase,
            &self.language,
        );
        debug!(
            "DiscussionOrchestrator: {} prompt is {} chars",
            speaker,
            prompt.chars().count()
        );

        send(
            tx,
            StreamEvent::StreamStart {
                sender: speaker.clone(),
            },
        )
        .await?;

        let mut fragments =
            until_closed(tx, self.service.complete_stream(&prompt, SPEAKER_TEMPERATURE)).await?;
        let mut response = String::new();
        while let Some(token) = until_closed(tx, fragments.next()).await? {
            response.push_str(&token);
            send(tx, StreamEvent::StreamChunk { token }).await?;
        }
        send(tx, StreamEvent::StreamEnd).await?;

        self.store
            .append_message(&discussion.id, &speaker, &response)
            .await?;

        Ok(TurnOutcome::Completed {
            speaker,
            response_length: response.chars().count(),
        })
    }
}

async fn send(tx: &mpsc::Sender<StreamEvent>, event: StreamEvent) -> Result<(), DiscussionError> {
    tx.send(event).await.map_err(|_| DiscussionError::Cancelled)
}

/// Await `fut` unless the consumer drops the stream first.
async fn until_closed<F: Future>(
    tx: &mpsc::Sender<StreamEvent>,
    fut: F,
) -> Result<F::Output, DiscussionError> {
    tokio::select! {
        output = fut => Ok(output),
        _ = tx.closed() => Err(DiscussionError::Cancelled),
    }
}
