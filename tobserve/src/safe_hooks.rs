use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::Duration;

use tcommon::RunId;
use tconvo::{EngineError, EngineHooks, RunEndReason, Speaker};
use tprovider::{ProviderError, ProviderKind, ProviderOperationHooks};

/// Swallows panics raised by the wrapped provider hooks.
pub struct SafeProviderHooks<H> {
    inner: H,
}

impl<H> SafeProviderHooks<H> {
    pub fn new(inner: H) -> Self {
        Self { inner }
    }
}

impl<H> ProviderOperationHooks for SafeProviderHooks<H>
where
    H: ProviderOperationHooks,
{
    fn on_request_start(&self, provider: ProviderKind, operation: &str) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_request_start(provider, operation)
        }));
    }

    fn on_success(&self, provider: ProviderKind, operation: &str, elapsed: Duration) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_success(provider, operation, elapsed)
        }));
    }

    fn on_failure(&self, provider: ProviderKind, operation: &str, error: &ProviderError) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_failure(provider, operation, error)
        }));
    }

    fn on_decode_warning(&self, provider: ProviderKind, line: &str, reason: &str) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_decode_warning(provider, line, reason)
        }));
    }
}

/// Swallows panics raised by the wrapped engine hooks.
pub struct SafeEngineHooks<H> {
    inner: H,
}

impl<H> SafeEngineHooks<H> {
    pub fn new(inner: H) -> Self {
        Self { inner }
    }
}

impl<H> EngineHooks for SafeEngineHooks<H>
where
    H: EngineHooks,
{
    fn on_run_started(&self, run_id: &RunId, topic: &str) {
        let _ = catch_unwind(AssertUnwindSafe(|| self.inner.on_run_started(run_id, topic)));
    }

    fn on_turn_start(&self, run_id: &RunId, speaker: Speaker, model: &str) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_turn_start(run_id, speaker, model)
        }));
    }

    fn on_turn_complete(
        &self,
        run_id: &RunId,
        speaker: Speaker,
        model: &str,
        chars: usize,
        elapsed: Duration,
    ) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner
                .on_turn_complete(run_id, speaker, model, chars, elapsed)
        }));
    }

    fn on_turn_failure(&self, run_id: &RunId, speaker: Speaker, model: &str, error: &EngineError) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_turn_failure(run_id, speaker, model, error)
        }));
    }

    fn on_run_finished(&self, run_id: &RunId, reason: RunEndReason, turns: usize) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_run_finished(run_id, reason, turns)
        }));
    }
}
