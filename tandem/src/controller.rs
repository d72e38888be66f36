//! Session controller: owns the session and drives the engine from an explicit loop.

use std::sync::Arc;

use tcommon::StopSignal;

use crate::{
    AgentModels, DirectoryListing, EngineError, EngineHooks, ModelDirectory, ModelProvider,
    NoopEngineHooks, ProviderError, Session, TurnEngine, TurnObserver, TurnOutcome,
};

/// Outcome of model resolution, kept so the caller can report why defaults were or were
/// not available.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedModels {
    pub models: AgentModels,
    pub listing: Option<DirectoryListing>,
}

pub struct SessionController {
    provider: Arc<dyn ModelProvider>,
    engine: TurnEngine,
    stop: StopSignal,
}

impl SessionController {
    pub fn new(provider: Arc<dyn ModelProvider>) -> Self {
        Self::with_hooks(provider, Arc::new(NoopEngineHooks), None)
    }

    pub fn with_hooks(
        provider: Arc<dyn ModelProvider>,
        hooks: Arc<dyn EngineHooks>,
        observer: Option<TurnObserver>,
    ) -> Self {
        let mut engine = TurnEngine::new(Arc::clone(&provider)).with_hooks(hooks);
        if let Some(observer) = observer {
            engine = engine.with_observer(observer);
        }

        Self {
            provider,
            engine,
            stop: StopSignal::new(),
        }
    }

    /// Handle that any task may use to request a stop.
    pub fn stop_signal(&self) -> StopSignal {
        self.stop.clone()
    }

    pub fn engine(&self) -> &TurnEngine {
        &self.engine
    }

    pub async fn list_models(&self) -> DirectoryListing {
        ModelDirectory::fetch(self.provider.as_ref()).await
    }

    /// Explicit choices are kept verbatim, listed or not. Blank slots are filled from the
    /// directory's default selection; the directory is only queried when a slot is blank.
    pub async fn resolve_models(
        &self,
        requested: &AgentModels,
    ) -> Result<ResolvedModels, ProviderError> {
        if requested.is_complete() {
            return Ok(ResolvedModels {
                models: requested.clone(),
                listing: None,
            });
        }

        let listing = self.list_models().await;
        if let Some(error) = &listing.error {
            return Err(ProviderError::directory_unavailable(format!(
                "no model given for every agent and the model directory is unavailable ({})",
                error.message
            )));
        }

        if listing.models.is_empty() {
            return Err(ProviderError::directory_unavailable(
                "no model given for every agent and the provider lists no models",
            ));
        }

        let defaults = listing.default_selection();
        let pick = |current: &str, fallback: String| {
            if current.trim().is_empty() {
                fallback
            } else {
                current.to_string()
            }
        };
        let models = AgentModels::new(
            pick(&requested.agent_a, defaults.agent_a),
            pick(&requested.agent_b, defaults.agent_b),
        );

        Ok(ResolvedModels {
            models,
            listing: Some(listing),
        })
    }

    /// Starts a run on `session` and steps it until it ends.
    pub async fn run(&self, session: &mut Session, topic: &str) -> Result<TurnOutcome, EngineError> {
        self.engine.start(session, topic, &self.stop)?;
        self.engine.run(session, &self.stop).await
    }

    pub fn stop(&self, session: &mut Session) {
        self.stop.request_stop();
        self.engine.stop(session);
    }
}
