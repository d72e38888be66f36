//! Default observability wiring: structured logs plus metrics, both panic-isolated.

use std::sync::Arc;

use tobserve::{
    FanoutEngineHooks, FanoutProviderHooks, MetricsObservabilityHooks, SafeEngineHooks,
    SafeProviderHooks, TracingObservabilityHooks,
};

use crate::{EngineHooks, ProviderOperationHooks};

pub fn default_provider_hooks() -> Arc<dyn ProviderOperationHooks> {
    Arc::new(
        FanoutProviderHooks::new()
            .with(Arc::new(SafeProviderHooks::new(TracingObservabilityHooks)))
            .with(Arc::new(SafeProviderHooks::new(MetricsObservabilityHooks))),
    )
}

pub fn default_engine_hooks() -> Arc<dyn EngineHooks> {
    Arc::new(
        FanoutEngineHooks::new()
            .with(Arc::new(SafeEngineHooks::new(TracingObservabilityHooks)))
            .with(Arc::new(SafeEngineHooks::new(MetricsObservabilityHooks))),
    )
}
