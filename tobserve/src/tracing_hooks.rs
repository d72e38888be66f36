//! Tracing-based observability hooks for provider operations and engine turns.
//!
//! ```rust
//! use tobserve::TracingObservabilityHooks;
//! use tconvo::EngineHooks;
//!
//! fn accepts_engine_hooks(_hooks: &dyn EngineHooks) {}
//!
//! let hooks = TracingObservabilityHooks;
//! accepts_engine_hooks(&hooks);
//! ```

use std::time::Duration;

use tcommon::RunId;
use tconvo::{EngineError, EngineHooks, RunEndReason, Speaker};
use tprovider::{ProviderError, ProviderKind, ProviderOperationHooks};

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObservabilityHooks;

impl ProviderOperationHooks for TracingObservabilityHooks {
    fn on_request_start(&self, provider: ProviderKind, operation: &str) {
        tracing::debug!(
            phase = "provider",
            event = "request_start",
            provider = %provider,
            operation
        );
    }

    fn on_success(&self, provider: ProviderKind, operation: &str, elapsed: Duration) {
        tracing::debug!(
            phase = "provider",
            event = "success",
            provider = %provider,
            operation,
            elapsed_ms = elapsed.as_millis() as u64
        );
    }

    fn on_failure(&self, provider: ProviderKind, operation: &str, error: &ProviderError) {
        tracing::error!(
            phase = "provider",
            event = "failure",
            provider = %provider,
            operation,
            error_kind = ?error.kind,
            error = %error
        );
    }

    fn on_decode_warning(&self, provider: ProviderKind, line: &str, reason: &str) {
        tracing::warn!(
            phase = "provider",
            event = "decode_warning",
            provider = %provider,
            line,
            reason
        );
    }
}

impl EngineHooks for TracingObservabilityHooks {
    fn on_run_started(&self, run_id: &RunId, topic: &str) {
        tracing::info!(phase = "engine", event = "run_started", run_id = %run_id, topic);
    }

    fn on_turn_start(&self, run_id: &RunId, speaker: Speaker, model: &str) {
        tracing::info!(
            phase = "engine",
            event = "turn_start",
            run_id = %run_id,
            speaker = %speaker,
            model
        );
    }

    fn on_turn_complete(
        &self,
        run_id: &RunId,
        speaker: Speaker,
        model: &str,
        chars: usize,
        elapsed: Duration,
    ) {
        tracing::info!(
            phase = "engine",
            event = "turn_complete",
            run_id = %run_id,
            speaker = %speaker,
            model,
            chars,
            elapsed_ms = elapsed.as_millis() as u64
        );
    }

    fn on_turn_failure(&self, run_id: &RunId, speaker: Speaker, model: &str, error: &EngineError) {
        tracing::error!(
            phase = "engine",
            event = "turn_failure",
            run_id = %run_id,
            speaker = %speaker,
            model,
            error_kind = ?error.kind,
            error = %error
        );
    }

    fn on_run_finished(&self, run_id: &RunId, reason: RunEndReason, turns: usize) {
        tracing::info!(
            phase = "engine",
            event = "run_finished",
            run_id = %run_id,
            reason = reason.as_str(),
            turns
        );
    }
}
