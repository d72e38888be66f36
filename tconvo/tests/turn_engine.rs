use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Local, TimeDelta, TimeZone};
use futures_util::stream;
use tconvo::{
    AgentModels, Clock, EngineErrorKind, EngineHooks, RunEndReason, RunId, Session, Speaker,
    StopSignal, TurnEngine, TurnEvent, TurnLimit, TurnOutcome,
};
use tprovider::{
    BoxedFragmentStream, ModelProvider, ProviderError, ProviderFuture, ProviderKind, Role,
    TurnRequest,
};

enum Script {
    Reply(Vec<&'static str>),
    FailAfter(Vec<&'static str>, ProviderError),
    Hang(Vec<&'static str>),
}

struct ScriptedProvider {
    scripts: Mutex<VecDeque<Script>>,
    requests: Mutex<Vec<TurnRequest>>,
}

impl ScriptedProvider {
    fn new(scripts: Vec<Script>) -> Arc<Self> {
        Arc::new(Self {
            scripts: Mutex::new(scripts.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn requests(&self) -> Vec<TurnRequest> {
        self.requests.lock().expect("requests lock").clone()
    }
}

impl ModelProvider for ScriptedProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::LineProtocol
    }

    fn list_models<'a>(&'a self) -> ProviderFuture<'a, Result<Vec<String>, ProviderError>> {
        Box::pin(async move { Ok(vec!["a-model".to_string(), "b-model".to_string()]) })
    }

    fn stream_turn<'a>(
        &'a self,
        request: TurnRequest,
    ) -> ProviderFuture<'a, Result<BoxedFragmentStream<'a>, ProviderError>> {
        Box::pin(async move {
            self.requests.lock().expect("requests lock").push(request);
            let script = self
                .scripts
                .lock()
                .expect("scripts lock")
                .pop_front()
                .expect("unexpected provider call");

            let fragments = |items: Vec<&'static str>| {
                items
                    .into_iter()
                    .map(|item| Ok(item.to_string()))
                    .collect::<Vec<Result<String, ProviderError>>>()
            };

            let stream: BoxedFragmentStream<'a> = match script {
                Script::Reply(items) => Box::pin(stream::iter(fragments(items))),
                Script::FailAfter(items, error) => {
                    let mut items = fragments(items);
                    items.push(Err(error));
                    Box::pin(stream::iter(items))
                }
                Script::Hang(items) => Box::pin(
                    futures_util::StreamExt::chain(
                        stream::iter(fragments(items)),
                        stream::pending::<Result<String, ProviderError>>(),
                    ),
                ),
            };
            Ok(stream)
        })
    }
}

struct ManualClock {
    now: Mutex<DateTime<Local>>,
}

impl ManualClock {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            now: Mutex::new(
                Local
                    .timestamp_opt(1_700_000_000, 0)
                    .single()
                    .expect("fixed timestamp"),
            ),
        })
    }

    fn advance(&self, delta: TimeDelta) {
        let mut now = self.now.lock().expect("clock lock");
        *now += delta;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Local> {
        *self.now.lock().expect("clock lock")
    }
}

#[derive(Default)]
struct RecordingHooks {
    events: Mutex<Vec<String>>,
}

impl EngineHooks for RecordingHooks {
    fn on_turn_start(&self, _run_id: &RunId, speaker: Speaker, model: &str) {
        self.push(format!("start {speaker} {model}"));
    }

    fn on_turn_complete(
        &self,
        _run_id: &RunId,
        speaker: Speaker,
        _model: &str,
        chars: usize,
        _elapsed: Duration,
    ) {
        self.push(format!("complete {speaker} {chars}"));
    }

    fn on_turn_failure(
        &self,
        _run_id: &RunId,
        speaker: Speaker,
        _model: &str,
        error: &tconvo::EngineError,
    ) {
        self.push(format!("failure {speaker} {:?}", error.kind));
    }

    fn on_run_finished(&self, _run_id: &RunId, reason: RunEndReason, turns: usize) {
        self.push(format!("finished {} {turns}", reason.as_str()));
    }
}

impl RecordingHooks {
    fn push(&self, event: String) {
        self.events.lock().expect("events lock").push(event);
    }

    fn events(&self) -> Vec<String> {
        self.events.lock().expect("events lock").clone()
    }
}

fn session(limit: TurnLimit) -> Session {
    Session::new(AgentModels::new("a-model", "b-model"), "Be casual.", limit)
}

#[tokio::test]
async fn turns_alternate_and_requests_relabel_history() {
    let provider = ScriptedProvider::new(vec![
        Script::Reply(vec!["Rivers ", "are calm."]),
        Script::Reply(vec!["Unless they flood."]),
    ]);
    let hooks = Arc::new(RecordingHooks::default());
    let engine = TurnEngine::new(provider.clone())
        .with_clock(ManualClock::new())
        .with_hooks(hooks.clone());
    let stop = StopSignal::new();
    let mut session = session(TurnLimit::unlimited());

    engine
        .start(&mut session, "  Discuss rivers\n", &stop)
        .expect("run should start");
    assert_eq!(session.topic, "  Discuss rivers\n");
    assert_eq!(session.history().messages()[0].content, "  Discuss rivers\n");
    assert_eq!(session.history().messages()[0].speaker, Speaker::AgentA);

    let first = engine.step(&mut session, &stop).await.expect("first turn");
    let second = engine.step(&mut session, &stop).await.expect("second turn");

    assert_eq!(
        first,
        TurnOutcome::Appended {
            speaker: Speaker::AgentB,
            index: 1
        }
    );
    assert_eq!(
        second,
        TurnOutcome::Appended {
            speaker: Speaker::AgentA,
            index: 2
        }
    );
    assert_eq!(session.history().messages()[1].content, "Rivers are calm.");

    let requests = provider.requests();
    assert_eq!(requests[0].model, "b-model");
    assert_eq!(requests[0].messages.len(), 1);
    assert_eq!(requests[0].messages[0].role, Role::User);
    assert_eq!(requests[0].messages[0].content, "  Discuss rivers\n");
    assert_eq!(requests[0].system_prompt, "Be casual.");

    assert_eq!(requests[1].model, "a-model");
    let roles = requests[1].messages.iter().map(|m| m.role).collect::<Vec<_>>();
    assert_eq!(roles, vec![Role::Assistant, Role::User]);
    assert_eq!(requests[1].messages[1].content, "Rivers are calm.");

    assert_eq!(
        hooks.events(),
        vec![
            "start Agent 2 b-model".to_string(),
            "complete Agent 2 16".to_string(),
            "start Agent 1 a-model".to_string(),
            "complete Agent 1 18".to_string(),
        ]
    );
}

#[tokio::test]
async fn stop_between_fragments_discards_partial_turn() {
    let provider = ScriptedProvider::new(vec![Script::Reply(vec!["half ", "a ", "reply"])]);
    let stop = StopSignal::new();
    let observer_stop = stop.clone();
    let fragments = Arc::new(Mutex::new(Vec::new()));
    let seen = fragments.clone();

    let engine = TurnEngine::new(provider)
        .with_clock(ManualClock::new())
        .with_observer(Arc::new(move |event: &TurnEvent| {
            if let TurnEvent::Fragment { text, .. } = event {
                seen.lock().expect("fragments lock").push(text.clone());
                observer_stop.request_stop();
            }
        }));
    let mut session = session(TurnLimit::unlimited());
    engine
        .start(&mut session, "Discuss kites", &stop)
        .expect("run should start");

    let outcome = engine.step(&mut session, &stop).await.expect("step");

    assert_eq!(outcome, TurnOutcome::Stopped);
    assert_eq!(session.history().len(), 1);
    assert!(!session.is_running());
    assert!(session.run_state().ended_at.is_some());
    assert_eq!(
        fragments.lock().expect("fragments lock").as_slice(),
        ["half ".to_string()]
    );
}

#[tokio::test]
async fn stop_interrupts_a_stalled_stream() {
    let provider = ScriptedProvider::new(vec![Script::Hang(vec!["thinking"])]);
    let engine = TurnEngine::new(provider).with_clock(ManualClock::new());
    let stop = StopSignal::new();
    let mut session = session(TurnLimit::unlimited());
    engine
        .start(&mut session, "Discuss clouds", &stop)
        .expect("run should start");

    let stopper = stop.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        stopper.request_stop();
    });

    let outcome = tokio::time::timeout(Duration::from_secs(5), engine.step(&mut session, &stop))
        .await
        .expect("stop must interrupt the stream")
        .expect("step");

    assert_eq!(outcome, TurnOutcome::Stopped);
    assert_eq!(session.history().len(), 1);
}

#[tokio::test]
async fn whitespace_only_reply_ends_run_with_empty_response() {
    let provider = ScriptedProvider::new(vec![Script::Reply(vec!["  ", "\n\t"])]);
    let hooks = Arc::new(RecordingHooks::default());
    let engine = TurnEngine::new(provider)
        .with_clock(ManualClock::new())
        .with_hooks(hooks.clone());
    let stop = StopSignal::new();
    let mut session = session(TurnLimit::unlimited());
    engine
        .start(&mut session, "Discuss silence", &stop)
        .expect("run should start");

    let error = engine
        .step(&mut session, &stop)
        .await
        .expect_err("empty reply must fail");

    assert_eq!(error.kind, EngineErrorKind::EmptyResponse);
    assert_eq!(error.speaker, Some(Speaker::AgentB));
    assert_eq!(error.model.as_deref(), Some("b-model"));
    assert!(error.message.starts_with("Agent 2 (b-model) failed to generate a response"));
    assert_eq!(session.history().len(), 1);
    assert!(!session.is_running());
    assert_eq!(
        hooks.events().last().map(String::as_str),
        Some("finished empty_response 0")
    );
}

#[tokio::test]
async fn transport_failure_mid_stream_is_fatal_without_retry() {
    let provider = ScriptedProvider::new(vec![Script::FailAfter(
        vec!["par"],
        ProviderError::transport("connection reset"),
    )]);
    let engine = TurnEngine::new(provider.clone()).with_clock(ManualClock::new());
    let stop = StopSignal::new();
    let mut session = session(TurnLimit::unlimited());
    engine
        .start(&mut session, "Discuss storms", &stop)
        .expect("run should start");

    let error = engine
        .step(&mut session, &stop)
        .await
        .expect_err("transport failure must fail");

    assert_eq!(error.kind, EngineErrorKind::Transport);
    assert!(error.message.contains("Agent 2 (b-model)"));
    assert!(error.message.contains("connection reset"));
    assert_eq!(provider.requests().len(), 1);
    assert_eq!(session.history().len(), 1);

    let after = engine
        .step(&mut session, &stop)
        .await
        .expect_err("run is over");
    assert_eq!(after.kind, EngineErrorKind::NotRunning);
}

#[tokio::test]
async fn elapsed_limit_stops_before_next_provider_call() {
    let provider = ScriptedProvider::new(vec![Script::Reply(vec!["first"])]);
    let clock = ManualClock::new();
    let engine = TurnEngine::new(provider.clone()).with_clock(clock.clone());
    let stop = StopSignal::new();
    let mut session = session(TurnLimit::minutes(1));
    engine
        .start(&mut session, "Discuss trains", &stop)
        .expect("run should start");

    clock.advance(TimeDelta::seconds(60));
    let first = engine.step(&mut session, &stop).await.expect("first turn");
    assert!(matches!(first, TurnOutcome::Appended { .. }));

    clock.advance(TimeDelta::seconds(1));
    let second = engine.step(&mut session, &stop).await.expect("second step");

    assert_eq!(second, TurnOutcome::TimeLimitReached);
    assert_eq!(provider.requests().len(), 1);
    assert_eq!(session.history().len(), 2);
    assert!(!session.is_running());
}

#[tokio::test]
async fn zero_minute_limit_runs_indefinitely() {
    let provider = ScriptedProvider::new(vec![Script::Reply(vec!["still here"])]);
    let clock = ManualClock::new();
    let engine = TurnEngine::new(provider).with_clock(clock.clone());
    let stop = StopSignal::new();
    let mut session = session(TurnLimit::minutes(0));
    engine
        .start(&mut session, "Discuss time", &stop)
        .expect("run should start");

    clock.advance(TimeDelta::days(30));
    let outcome = engine.step(&mut session, &stop).await.expect("step");

    assert!(matches!(outcome, TurnOutcome::Appended { .. }));
}

#[tokio::test]
async fn run_loops_until_stop_and_restart_reseeds() {
    let provider = ScriptedProvider::new(vec![
        Script::Reply(vec!["one"]),
        Script::Reply(vec!["two"]),
        Script::Reply(vec!["three"]),
        Script::Reply(vec!["fresh"]),
    ]);
    let stop = StopSignal::new();
    let observer_stop = stop.clone();
    let engine = TurnEngine::new(provider)
        .with_clock(ManualClock::new())
        .with_observer(Arc::new(move |event: &TurnEvent| {
            if let TurnEvent::TurnCompleted { index: 3, .. } = event {
                observer_stop.request_stop();
            }
        }));
    let mut session = session(TurnLimit::unlimited());
    engine
        .start(&mut session, "Discuss bread", &stop)
        .expect("run should start");

    let outcome = engine.run(&mut session, &stop).await.expect("run");
    assert_eq!(outcome, TurnOutcome::Stopped);
    assert_eq!(session.history().len(), 4);
    assert_eq!(session.history().messages()[3].speaker, Speaker::AgentB);

    engine
        .start(&mut session, "Discuss cheese", &stop)
        .expect("restart should succeed");
    assert!(!stop.is_stopped());
    assert_eq!(session.history().len(), 1);
    assert_eq!(session.history().next_speaker(), Speaker::AgentB);

    let outcome = engine.step(&mut session, &stop).await.expect("step");
    assert_eq!(
        outcome,
        TurnOutcome::Appended {
            speaker: Speaker::AgentB,
            index: 1
        }
    );
}

#[tokio::test]
async fn start_validates_topic_and_models() {
    let engine = TurnEngine::new(ScriptedProvider::new(Vec::new()));
    let stop = StopSignal::new();

    let mut blank_topic = session(TurnLimit::unlimited());
    let error = engine
        .start(&mut blank_topic, "   ", &stop)
        .expect_err("blank topic must fail");
    assert_eq!(error.kind, EngineErrorKind::InvalidRequest);
    assert!(!blank_topic.is_running());

    let mut missing_model = Session::new(AgentModels::new("a-model", ""), "", TurnLimit::unlimited());
    let error = engine
        .start(&mut missing_model, "Discuss maps", &stop)
        .expect_err("missing model must fail");
    assert_eq!(error.kind, EngineErrorKind::InvalidRequest);

    let mut idle = session(TurnLimit::unlimited());
    let error = engine
        .step(&mut idle, &stop)
        .await
        .expect_err("idle session cannot step");
    assert_eq!(error.kind, EngineErrorKind::NotRunning);
}

#[tokio::test]
async fn external_stop_records_end_instant_once() {
    let engine = TurnEngine::new(ScriptedProvider::new(Vec::new())).with_clock(ManualClock::new());
    let stop = StopSignal::new();
    let mut session = session(TurnLimit::unlimited());
    engine
        .start(&mut session, "Discuss owls", &stop)
        .expect("run should start");

    engine.stop(&mut session);
    let ended = session.run_state().ended_at;
    engine.stop(&mut session);

    assert!(!session.is_running());
    assert!(ended.is_some());
    assert_eq!(session.run_state().ended_at, ended);
}
