//! Conversation state owned by the session controller.

use std::fmt::{Display, Formatter};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Local, TimeDelta};
use tcommon::RunId;
use tprovider::AgentModels;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Speaker {
    AgentA,
    AgentB,
}

impl Speaker {
    pub fn opposite(self) -> Self {
        match self {
            Self::AgentA => Self::AgentB,
            Self::AgentB => Self::AgentA,
        }
    }

    /// Owner of the entry at index `len`, which is also the agent due to speak once a
    /// history of `len` entries exists.
    pub fn for_history_len(len: usize) -> Self {
        if len % 2 == 0 {
            Self::AgentA
        } else {
            Self::AgentB
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::AgentA => "Agent 1",
            Self::AgentB => "Agent 2",
        }
    }
}

impl Display for Speaker {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

pub trait ModelsForSpeaker {
    fn model_for(&self, speaker: Speaker) -> &str;
}

impl ModelsForSpeaker for AgentModels {
    fn model_for(&self, speaker: Speaker) -> &str {
        match speaker {
            Speaker::AgentA => &self.agent_a,
            Speaker::AgentB => &self.agent_b,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationMessage {
    pub speaker: Speaker,
    pub content: String,
    pub timestamp: DateTime<Local>,
}

impl ConversationMessage {
    pub fn new(speaker: Speaker, content: impl Into<String>, timestamp: DateTime<Local>) -> Self {
        Self {
            speaker,
            content: content.into(),
            timestamp,
        }
    }
}

/// Append-only record of one run. Entry 0 is the topic, attributed to agent A, so agent B
/// gives the first reply.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConversationHistory {
    messages: Vec<ConversationMessage>,
}

impl ConversationHistory {
    pub fn seeded(topic: impl Into<String>, now: DateTime<Local>) -> Self {
        Self {
            messages: vec![ConversationMessage::new(Speaker::AgentA, topic, now)],
        }
    }

    pub fn next_speaker(&self) -> Speaker {
        Speaker::for_history_len(self.messages.len())
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn messages(&self) -> &[ConversationMessage] {
        &self.messages
    }

    pub fn contents(&self) -> impl Iterator<Item = &str> + '_ {
        self.messages.iter().map(|message| message.content.as_str())
    }

    pub(crate) fn append(&mut self, message: ConversationMessage) -> usize {
        self.messages.push(message);
        self.messages.len() - 1
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunState {
    pub running: bool,
    pub started_at: Option<DateTime<Local>>,
    pub ended_at: Option<DateTime<Local>>,
}

impl RunState {
    pub fn begin(&mut self, now: DateTime<Local>) {
        self.running = true;
        self.started_at = Some(now);
        self.ended_at = None;
    }

    /// Idempotent: the first end instant wins.
    pub fn finish(&mut self, now: DateTime<Local>) {
        if self.running {
            self.running = false;
            self.ended_at = Some(now);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TurnLimit {
    limit: Option<Duration>,
}

impl TurnLimit {
    pub fn unlimited() -> Self {
        Self { limit: None }
    }

    /// Zero minutes means no limit.
    pub fn minutes(minutes: u64) -> Self {
        if minutes == 0 {
            Self::unlimited()
        } else {
            Self {
                limit: Some(Duration::from_secs(minutes.saturating_mul(60))),
            }
        }
    }

    pub fn duration(self) -> Option<Duration> {
        self.limit
    }

    pub fn is_exceeded(self, started_at: DateTime<Local>, now: DateTime<Local>) -> bool {
        let Some(limit) = self.limit.and_then(|limit| TimeDelta::from_std(limit).ok()) else {
            return false;
        };

        now.signed_duration_since(started_at) > limit
    }
}

/// Everything the controller needs between turns. The engine reads configuration from
/// here and is the only writer of `history` and `run`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub topic: String,
    pub models: AgentModels,
    pub system_prompt: String,
    pub turn_limit: TurnLimit,
    pub(crate) history: ConversationHistory,
    pub(crate) run: RunState,
    pub(crate) run_id: Option<RunId>,
}

impl Session {
    pub fn new(
        models: AgentModels,
        system_prompt: impl Into<String>,
        turn_limit: TurnLimit,
    ) -> Self {
        Self {
            topic: String::new(),
            models,
            system_prompt: system_prompt.into(),
            turn_limit,
            history: ConversationHistory::default(),
            run: RunState::default(),
            run_id: None,
        }
    }

    pub fn history(&self) -> &ConversationHistory {
        &self.history
    }

    pub fn run_state(&self) -> RunState {
        self.run
    }

    pub fn is_running(&self) -> bool {
        self.run.running
    }

    pub fn run_id(&self) -> Option<&RunId> {
        self.run_id.as_ref()
    }

    pub fn transcript(&self) -> Transcript {
        Transcript {
            topic: self.topic.clone(),
            started_at: self.run.started_at,
            ended_at: self.run.ended_at,
            agent_a_model: self.models.agent_a.clone(),
            agent_b_model: self.models.agent_b.clone(),
            entries: self
                .history
                .messages()
                .iter()
                .map(|message| TranscriptEntry {
                    speaker: message.speaker,
                    timestamp: message.timestamp,
                    content: message.content.clone(),
                })
                .collect(),
        }
    }
}

/// Read-only snapshot of a run, shaped for export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcript {
    pub topic: String,
    pub started_at: Option<DateTime<Local>>,
    pub ended_at: Option<DateTime<Local>>,
    pub agent_a_model: String,
    pub agent_b_model: String,
    pub entries: Vec<TranscriptEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptEntry {
    pub speaker: Speaker,
    pub timestamp: DateTime<Local>,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    Appended { speaker: Speaker, index: usize },
    Stopped,
    TimeLimitReached,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunEndReason {
    Stopped,
    TimeLimitReached,
    EmptyResponse,
    Failed,
}

impl RunEndReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Stopped => "stopped",
            Self::TimeLimitReached => "time_limit",
            Self::EmptyResponse => "empty_response",
            Self::Failed => "failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnEvent {
    TurnStarted { speaker: Speaker, model: String },
    Fragment { speaker: Speaker, text: String },
    TurnCompleted { speaker: Speaker, index: usize },
}

pub type TurnObserver = Arc<dyn Fn(&TurnEvent) + Send + Sync>;
