//! Engine lifecycle hooks.

use std::time::Duration;

use tcommon::RunId;

use crate::{EngineError, RunEndReason, Speaker};

/// Observes turn lifecycle. Every method defaults to a no-op.
pub trait EngineHooks: Send + Sync {
    fn on_run_started(&self, _run_id: &RunId, _topic: &str) {}

    fn on_turn_start(&self, _run_id: &RunId, _speaker: Speaker, _model: &str) {}

    fn on_turn_complete(
        &self,
        _run_id: &RunId,
        _speaker: Speaker,
        _model: &str,
        _chars: usize,
        _elapsed: Duration,
    ) {
    }

    fn on_turn_failure(
        &self,
        _run_id: &RunId,
        _speaker: Speaker,
        _model: &str,
        _error: &EngineError,
    ) {
    }

    fn on_run_finished(&self, _run_id: &RunId, _reason: RunEndReason, _turns: usize) {}
}

#[derive(Debug, Default)]
pub struct NoopEngineHooks;

impl EngineHooks for NoopEngineHooks {}
