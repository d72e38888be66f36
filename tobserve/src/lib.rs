//! Structured logging and metrics for provider calls and conversation turns.
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use tobserve::{
//!     FanoutEngineHooks, MetricsObservabilityHooks, SafeEngineHooks, TracingObservabilityHooks,
//! };
//!
//! let hooks = FanoutEngineHooks::new()
//!     .with(Arc::new(SafeEngineHooks::new(TracingObservabilityHooks)))
//!     .with(Arc::new(SafeEngineHooks::new(MetricsObservabilityHooks)));
//! assert_eq!(hooks.len(), 2);
//! ```

mod fanout;
mod metrics_hooks;
mod safe_hooks;
mod tracing_hooks;

pub use fanout::{FanoutEngineHooks, FanoutProviderHooks};
pub use metrics_hooks::MetricsObservabilityHooks;
pub use safe_hooks::{SafeEngineHooks, SafeProviderHooks};
pub use tracing_hooks::TracingObservabilityHooks;

pub mod prelude {
    pub use crate::{
        FanoutEngineHooks, FanoutProviderHooks, MetricsObservabilityHooks, SafeEngineHooks,
        SafeProviderHooks, TracingObservabilityHooks,
    };
}
