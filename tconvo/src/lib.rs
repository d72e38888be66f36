//! Two-agent conversation orchestration over a single model provider.
//!
//! A [`Session`] carries the topic, model selection, turn limit and the append-only
//! history. [`TurnEngine`] advances it one turn at a time, alternating between agents
//! until the caller's stop signal fires, the turn limit elapses, or a turn fails.
//!
//! ```rust
//! use tconvo::{ConversationHistory, Speaker, TurnLimit};
//!
//! let history = ConversationHistory::seeded("Talk about tea", chrono::Local::now());
//! assert_eq!(history.next_speaker(), Speaker::AgentB);
//! assert_eq!(TurnLimit::minutes(0), TurnLimit::unlimited());
//! ```

mod clock;
mod engine;
mod error;
mod hooks;
mod types;

pub mod prelude {
    pub use crate::{
        Clock, ConversationHistory, ConversationMessage, EngineError, EngineErrorKind,
        EngineHooks, ModelsForSpeaker, NoopEngineHooks, RunEndReason, RunState, Session,
        Speaker, SystemClock, Transcript, TranscriptEntry, TurnEngine, TurnEvent, TurnLimit,
        TurnObserver, TurnOutcome,
    };
    pub use tcommon::{RunId, StopSignal};
    pub use tprovider::AgentModels;
}

pub use clock::{Clock, SystemClock};
pub use engine::TurnEngine;
pub use error::{EngineError, EngineErrorKind};
pub use hooks::{EngineHooks, NoopEngineHooks};
pub use types::{
    ConversationHistory, ConversationMessage, ModelsForSpeaker, RunEndReason, RunState,
    Session, Speaker, Transcript, TranscriptEntry, TurnEvent, TurnLimit, TurnObserver,
    TurnOutcome,
};
pub use tcommon::{RunId, StopSignal};
pub use tprovider::AgentModels;

#[cfg(test)]
mod tests {
    use chrono::{Local, TimeDelta, TimeZone};

    use super::*;

    fn at(seconds: i64) -> chrono::DateTime<Local> {
        Local
            .timestamp_opt(1_700_000_000 + seconds, 0)
            .single()
            .expect("fixed timestamp")
    }

    #[test]
    fn speakers_alternate_by_history_parity() {
        assert_eq!(Speaker::for_history_len(0), Speaker::AgentA);
        assert_eq!(Speaker::for_history_len(1), Speaker::AgentB);
        assert_eq!(Speaker::for_history_len(2), Speaker::AgentA);
        assert_eq!(Speaker::AgentA.opposite(), Speaker::AgentB);
        assert_eq!(Speaker::AgentB.to_string(), "Agent 2");
    }

    #[test]
    fn seeded_history_belongs_to_agent_a() {
        let mut history = ConversationHistory::seeded("Discuss kites", at(0));
        assert_eq!(history.len(), 1);
        assert_eq!(history.messages()[0].speaker, Speaker::AgentA);
        assert_eq!(history.next_speaker(), Speaker::AgentB);

        let index = history.append(ConversationMessage::new(Speaker::AgentB, "Kites!", at(1)));
        assert_eq!(index, 1);
        assert_eq!(history.next_speaker(), Speaker::AgentA);
        assert_eq!(
            history.contents().collect::<Vec<_>>(),
            vec!["Discuss kites", "Kites!"]
        );
    }

    #[test]
    fn turn_limit_is_strictly_greater_than() {
        let limit = TurnLimit::minutes(1);
        let start = at(0);

        assert!(!limit.is_exceeded(start, start + TimeDelta::seconds(60)));
        assert!(limit.is_exceeded(start, start + TimeDelta::seconds(61)));
    }

    #[test]
    fn zero_minute_limit_never_fires() {
        let limit = TurnLimit::minutes(0);
        assert_eq!(limit.duration(), None);
        assert!(!limit.is_exceeded(at(0), at(86_400 * 365)));
    }

    #[test]
    fn run_state_keeps_first_end_instant() {
        let mut run = RunState::default();
        run.begin(at(0));
        run.finish(at(5));
        run.finish(at(9));

        assert!(!run.running);
        assert_eq!(run.ended_at, Some(at(5)));

        run.begin(at(10));
        assert!(run.running);
        assert_eq!(run.ended_at, None);
    }

    #[test]
    fn agent_models_resolve_per_speaker() {
        let models = AgentModels::new("llama3", "mistral");
        assert_eq!(models.model_for(Speaker::AgentA), "llama3");
        assert_eq!(models.model_for(Speaker::AgentB), "mistral");
    }

    #[test]
    fn transcript_mirrors_session_state() {
        let mut session = Session::new(
            AgentModels::new("a-model", "b-model"),
            "",
            TurnLimit::unlimited(),
        );
        session.topic = "Rivers".to_string();
        session.history = ConversationHistory::seeded("Rivers", at(0));
        session
            .history
            .append(ConversationMessage::new(Speaker::AgentB, "Wet.", at(3)));
        session.run.begin(at(0));
        session.run.finish(at(4));

        let transcript = session.transcript();
        assert_eq!(transcript.topic, "Rivers");
        assert_eq!(transcript.agent_b_model, "b-model");
        assert_eq!(transcript.started_at, Some(at(0)));
        assert_eq!(transcript.ended_at, Some(at(4)));
        assert_eq!(transcript.entries.len(), 2);
        assert_eq!(transcript.entries[1].speaker, Speaker::AgentB);
        assert_eq!(transcript.entries[1].content, "Wet.");
    }

    #[test]
    fn engine_error_messages_name_agent_and_model() {
        let error = EngineError::empty_response(Speaker::AgentB, "llama3");
        assert_eq!(error.kind, EngineErrorKind::EmptyResponse);
        assert!(
            error
                .message
                .starts_with("Agent 2 (llama3) failed to generate a response")
        );

        let transport = EngineError::provider(
            Speaker::AgentA,
            "qwen",
            tprovider::ProviderKind::SseProtocol,
            &tprovider::ProviderError::transport("connection reset"),
        );
        assert_eq!(transport.kind, EngineErrorKind::Transport);
        assert!(transport.message.contains("Agent 1 (qwen)"));
        assert!(transport.message.contains("connection reset"));

        let invalid = EngineError::provider(
            Speaker::AgentA,
            " ",
            tprovider::ProviderKind::LineProtocol,
            &tprovider::ProviderError::invalid_request("model must not be empty"),
        );
        assert_eq!(invalid.kind, EngineErrorKind::InvalidRequest);
    }
}
