//! Metrics-based observability hooks for provider operations and engine turns.
//!
//! ```rust
//! use tobserve::MetricsObservabilityHooks;
//! use tprovider::ProviderOperationHooks;
//!
//! fn accepts_provider_hooks(_hooks: &dyn ProviderOperationHooks) {}
//!
//! let hooks = MetricsObservabilityHooks;
//! accepts_provider_hooks(&hooks);
//! ```

use std::time::Duration;

use tcommon::RunId;
use tconvo::{EngineError, EngineHooks, RunEndReason, Speaker};
use tprovider::{ProviderError, ProviderKind, ProviderOperationHooks};

#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsObservabilityHooks;

impl ProviderOperationHooks for MetricsObservabilityHooks {
    fn on_request_start(&self, provider: ProviderKind, operation: &str) {
        metrics::counter!(
            "tandem_provider_request_start_total",
            "provider" => provider.to_string(),
            "operation" => operation.to_string()
        )
        .increment(1);
    }

    fn on_success(&self, provider: ProviderKind, operation: &str, elapsed: Duration) {
        metrics::counter!(
            "tandem_provider_success_total",
            "provider" => provider.to_string(),
            "operation" => operation.to_string()
        )
        .increment(1);
        metrics::histogram!(
            "tandem_provider_duration_seconds",
            "provider" => provider.to_string(),
            "operation" => operation.to_string()
        )
        .record(elapsed.as_secs_f64());
    }

    fn on_failure(&self, provider: ProviderKind, operation: &str, error: &ProviderError) {
        metrics::counter!(
            "tandem_provider_failure_total",
            "provider" => provider.to_string(),
            "operation" => operation.to_string(),
            "error_kind" => format!("{:?}", error.kind)
        )
        .increment(1);
    }

    fn on_decode_warning(&self, provider: ProviderKind, _line: &str, _reason: &str) {
        metrics::counter!(
            "tandem_provider_decode_warning_total",
            "provider" => provider.to_string()
        )
        .increment(1);
    }
}

impl EngineHooks for MetricsObservabilityHooks {
    fn on_run_started(&self, _run_id: &RunId, _topic: &str) {
        metrics::counter!("tandem_engine_run_started_total").increment(1);
    }

    fn on_turn_start(&self, _run_id: &RunId, speaker: Speaker, _model: &str) {
        metrics::counter!(
            "tandem_engine_turn_start_total",
            "speaker" => speaker.label()
        )
        .increment(1);
    }

    fn on_turn_complete(
        &self,
        _run_id: &RunId,
        speaker: Speaker,
        model: &str,
        chars: usize,
        elapsed: Duration,
    ) {
        metrics::counter!(
            "tandem_engine_turn_complete_total",
            "speaker" => speaker.label(),
            "model" => model.to_string()
        )
        .increment(1);
        metrics::histogram!(
            "tandem_engine_turn_duration_seconds",
            "model" => model.to_string()
        )
        .record(elapsed.as_secs_f64());
        metrics::histogram!(
            "tandem_engine_turn_chars",
            "model" => model.to_string()
        )
        .record(chars as f64);
    }

    fn on_turn_failure(&self, _run_id: &RunId, speaker: Speaker, model: &str, error: &EngineError) {
        metrics::counter!(
            "tandem_engine_turn_failure_total",
            "speaker" => speaker.label(),
            "model" => model.to_string(),
            "error_kind" => format!("{:?}", error.kind)
        )
        .increment(1);
    }

    fn on_run_finished(&self, _run_id: &RunId, reason: RunEndReason, turns: usize) {
        metrics::counter!(
            "tandem_engine_run_finished_total",
            "reason" => reason.as_str()
        )
        .increment(1);
        metrics::histogram!("tandem_engine_turns_per_run").record(turns as f64);
    }
}
