//! Turn engine: drives one agent turn at a time against a shared provider.
//!
//! The engine holds no per-run state. Everything that changes during a run lives in the
//! [`Session`] the caller passes in, so the control loop stays visible at the call site:
//!
//! ```rust,ignore
//! engine.start(&mut session, "Discuss rivers", &stop)?;
//! loop {
//!     match engine.step(&mut session, &stop).await? {
//!         TurnOutcome::Appended { .. } => continue,
//!         TurnOutcome::Stopped | TurnOutcome::TimeLimitReached => break,
//!     }
//! }
//! ```

use std::sync::Arc;
use std::time::Instant;

use futures_util::StreamExt;
use futures_util::future::{Either, select};
use tcommon::{RunId, StopSignal};
use tprovider::{ModelProvider, TurnRequest};

use crate::{
    Clock, ConversationHistory, ConversationMessage, EngineError, EngineHooks, ModelsForSpeaker,
    NoopEngineHooks, RunEndReason, Session, Speaker, SystemClock, TurnEvent, TurnObserver,
    TurnOutcome,
};

#[derive(Clone)]
pub struct TurnEngine {
    provider: Arc<dyn ModelProvider>,
    hooks: Arc<dyn EngineHooks>,
    clock: Arc<dyn Clock>,
    observer: Option<TurnObserver>,
}

enum Collected {
    Complete(String),
    Stopped,
}

impl TurnEngine {
    pub fn new(provider: Arc<dyn ModelProvider>) -> Self {
        Self {
            provider,
            hooks: Arc::new(NoopEngineHooks),
            clock: Arc::new(SystemClock),
            observer: None,
        }
    }

    pub fn with_hooks(mut self, hooks: Arc<dyn EngineHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_observer(mut self, observer: TurnObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn provider(&self) -> &Arc<dyn ModelProvider> {
        &self.provider
    }

    /// Reseeds the session with `topic` and begins a run. Clears `stop` so a signal left
    /// over from the previous run cannot end this one.
    pub fn start(
        &self,
        session: &mut Session,
        topic: &str,
        stop: &StopSignal,
    ) -> Result<RunId, EngineError> {
        if session.run.running {
            return Err(EngineError::invalid_request(
                "a conversation is already running",
            ));
        }

        if topic.trim().is_empty() {
            return Err(EngineError::invalid_request("topic must not be empty"));
        }

        if !session.models.is_complete() {
            return Err(EngineError::invalid_request(
                "a model must be selected for both agents",
            ));
        }

        let now = self.clock.now();
        let run_id = RunId::new(now.format("run-%Y%m%dT%H%M%S%.3f").to_string());

        stop.reset();
        session.topic = topic.to_string();
        session.history = ConversationHistory::seeded(topic, now);
        session.run.begin(now);
        session.run_id = Some(run_id.clone());

        self.hooks.on_run_started(&run_id, topic);
        Ok(run_id)
    }

    /// Produces at most one turn.
    ///
    /// The turn limit and stop signal are checked before the provider is called, and the
    /// stop signal is raced against every fragment while streaming. A stop observed at any
    /// point ends the run without touching the history.
    pub async fn step(
        &self,
        session: &mut Session,
        stop: &StopSignal,
    ) -> Result<TurnOutcome, EngineError> {
        let run_id = match (&session.run_id, session.run.running) {
            (Some(run_id), true) => run_id.clone(),
            _ => return Err(EngineError::not_running()),
        };

        if let Some(started_at) = session.run.started_at
            && session.turn_limit.is_exceeded(started_at, self.clock.now())
        {
            self.finish(session, &run_id, RunEndReason::TimeLimitReached);
            return Ok(TurnOutcome::TimeLimitReached);
        }

        if stop.is_stopped() {
            self.finish(session, &run_id, RunEndReason::Stopped);
            return Ok(TurnOutcome::Stopped);
        }

        let speaker = session.history.next_speaker();
        let model = session.models.model_for(speaker).to_string();
        let request = TurnRequest::from_history(
            model.clone(),
            session.history.contents(),
            session.system_prompt.clone(),
        );

        self.hooks.on_turn_start(&run_id, speaker, &model);
        self.emit(TurnEvent::TurnStarted {
            speaker,
            model: model.clone(),
        });
        let started = Instant::now();

        let text = match self.collect(request, speaker, stop).await {
            Ok(Collected::Complete(text)) => text,
            Ok(Collected::Stopped) => {
                self.finish(session, &run_id, RunEndReason::Stopped);
                return Ok(TurnOutcome::Stopped);
            }
            Err(provider_error) => {
                let error =
                    EngineError::provider(speaker, &model, self.provider.kind(), &provider_error);
                self.hooks.on_turn_failure(&run_id, speaker, &model, &error);
                self.finish(session, &run_id, RunEndReason::Failed);
                return Err(error);
            }
        };

        if text.trim().is_empty() {
            let error = EngineError::empty_response(speaker, &model);
            self.hooks.on_turn_failure(&run_id, speaker, &model, &error);
            self.finish(session, &run_id, RunEndReason::EmptyResponse);
            return Err(error);
        }

        let chars = text.chars().count();
        let index = session
            .history
            .append(ConversationMessage::new(speaker, text, self.clock.now()));

        self.hooks
            .on_turn_complete(&run_id, speaker, &model, chars, started.elapsed());
        self.emit(TurnEvent::TurnCompleted { speaker, index });

        Ok(TurnOutcome::Appended { speaker, index })
    }

    /// Steps until the run ends. Returns the terminal outcome, which is never `Appended`.
    pub async fn run(
        &self,
        session: &mut Session,
        stop: &StopSignal,
    ) -> Result<TurnOutcome, EngineError> {
        loop {
            match self.step(session, stop).await? {
                TurnOutcome::Appended { .. } => continue,
                outcome => return Ok(outcome),
            }
        }
    }

    /// Ends the run from outside a step. A no-op when nothing is running.
    pub fn stop(&self, session: &mut Session) {
        if let (Some(run_id), true) = (session.run_id.clone(), session.run.running) {
            self.finish(session, &run_id, RunEndReason::Stopped);
        }
    }

    async fn collect(
        &self,
        request: TurnRequest,
        speaker: Speaker,
        stop: &StopSignal,
    ) -> Result<Collected, tprovider::ProviderError> {
        let open = self.provider.stream_turn(request);
        let stopped = stop.stopped();
        futures_util::pin_mut!(stopped);

        let mut stream = match select(open, stopped.as_mut()).await {
            Either::Left((opened, _)) => opened?,
            Either::Right(_) => return Ok(Collected::Stopped),
        };

        let mut text = String::new();
        loop {
            let fragment = match select(stream.next(), stopped.as_mut()).await {
                Either::Left((Some(fragment), _)) => fragment?,
                Either::Left((None, _)) => break,
                Either::Right(_) => return Ok(Collected::Stopped),
            };

            text.push_str(&fragment);
            self.emit(TurnEvent::Fragment {
                speaker,
                text: fragment,
            });

            if stop.is_stopped() {
                return Ok(Collected::Stopped);
            }
        }

        if stop.is_stopped() {
            return Ok(Collected::Stopped);
        }

        Ok(Collected::Complete(text))
    }

    fn finish(&self, session: &mut Session, run_id: &RunId, reason: RunEndReason) {
        session.run.finish(self.clock.now());
        self.hooks
            .on_run_finished(run_id, reason, session.history.len().saturating_sub(1));
    }

    fn emit(&self, event: TurnEvent) {
        if let Some(observer) = &self.observer {
            observer(&event);
        }
    }
}

impl std::fmt::Debug for TurnEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TurnEngine")
            .field("provider", &self.provider.kind())
            .field("observer", &self.observer.is_some())
            .finish()
    }
}
