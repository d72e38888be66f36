//! Dispatch one hook call to several sinks, in registration order.

use std::sync::Arc;
use std::time::Duration;

use tcommon::RunId;
use tconvo::{EngineError, EngineHooks, RunEndReason, Speaker};
use tprovider::{ProviderError, ProviderKind, ProviderOperationHooks};

#[derive(Default, Clone)]
pub struct FanoutProviderHooks {
    sinks: Vec<Arc<dyn ProviderOperationHooks>>,
}

impl FanoutProviderHooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, sink: Arc<dyn ProviderOperationHooks>) -> Self {
        self.sinks.push(sink);
        self
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl ProviderOperationHooks for FanoutProviderHooks {
    fn on_request_start(&self, provider: ProviderKind, operation: &str) {
        for sink in &self.sinks {
            sink.on_request_start(provider, operation);
        }
    }

    fn on_success(&self, provider: ProviderKind, operation: &str, elapsed: Duration) {
        for sink in &self.sinks {
            sink.on_success(provider, operation, elapsed);
        }
    }

    fn on_failure(&self, provider: ProviderKind, operation: &str, error: &ProviderError) {
        for sink in &self.sinks {
            sink.on_failure(provider, operation, error);
        }
    }

    fn on_decode_warning(&self, provider: ProviderKind, line: &str, reason: &str) {
        for sink in &self.sinks {
            sink.on_decode_warning(provider, line, reason);
        }
    }
}

#[derive(Default, Clone)]
pub struct FanoutEngineHooks {
    sinks: Vec<Arc<dyn EngineHooks>>,
}

impl FanoutEngineHooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, sink: Arc<dyn EngineHooks>) -> Self {
        self.sinks.push(sink);
        self
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl EngineHooks for FanoutEngineHooks {
    fn on_run_started(&self, run_id: &RunId, topic: &str) {
        for sink in &self.sinks {
            sink.on_run_started(run_id, topic);
        }
    }

    fn on_turn_start(&self, run_id: &RunId, speaker: Speaker, model: &str) {
        for sink in &self.sinks {
            sink.on_turn_start(run_id, speaker, model);
        }
    }

    fn on_turn_complete(
        &self,
        run_id: &RunId,
        speaker: Speaker,
        model: &str,
        chars: usize,
        elapsed: Duration,
    ) {
        for sink in &self.sinks {
            sink.on_turn_complete(run_id, speaker, model, chars, elapsed);
        }
    }

    fn on_turn_failure(&self, run_id: &RunId, speaker: Speaker, model: &str, error: &EngineError) {
        for sink in &self.sinks {
            sink.on_turn_failure(run_id, speaker, model, error);
        }
    }

    fn on_run_finished(&self, run_id: &RunId, reason: RunEndReason, turns: usize) {
        for sink in &self.sinks {
            sink.on_run_finished(run_id, reason, turns);
        }
    }
}
