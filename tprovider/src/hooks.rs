//! Operational hook contract for provider calls.
//!
//! Every method has a no-op default so implementors only override what they observe.

use std::time::Duration;

use crate::{ProviderError, ProviderKind};

pub trait ProviderOperationHooks: Send + Sync {
    fn on_request_start(&self, _provider: ProviderKind, _operation: &str) {}

    fn on_success(&self, _provider: ProviderKind, _operation: &str, _elapsed: Duration) {}

    fn on_failure(&self, _provider: ProviderKind, _operation: &str, _error: &ProviderError) {}

    /// A single stream line could not be decoded and was skipped.
    fn on_decode_warning(&self, _provider: ProviderKind, _line: &str, _reason: &str) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopOperationHooks;

impl ProviderOperationHooks for NoopOperationHooks {}
