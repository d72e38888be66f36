//! Unified facade over the tandem workspace crates.
//!
//! Re-exports the provider, engine and observability crates, and adds the pieces a
//! front end needs: provider presets, file configuration, a session controller and the
//! markdown export.
//!
//! ```rust
//! use tandem::{ProviderBuildConfig, ProviderPreset, ProviderKind};
//!
//! let config = ProviderBuildConfig::new(ProviderPreset::Ollama)
//!     .provider_config()
//!     .expect("ollama has a default endpoint");
//! assert_eq!(config.kind, ProviderKind::LineProtocol);
//! ```

pub mod config;
pub mod controller;
pub mod export;
pub mod observe;
pub mod prelude;
pub mod providers;
pub mod util;

pub use tcommon;
pub use tconvo;
pub use tobserve;
pub use tprovider;

pub use tcommon::{BoxFuture, RunId, StopSignal};
pub use tconvo::{
    Clock, ConversationHistory, ConversationMessage, EngineError, EngineErrorKind, EngineHooks,
    ModelsForSpeaker, NoopEngineHooks, RunEndReason, RunState, Session, Speaker, SystemClock,
    Transcript, TranscriptEntry, TurnEngine, TurnEvent, TurnLimit, TurnObserver, TurnOutcome,
};
pub use tprovider::{
    AgentModels, BoxedFragmentStream, DirectoryListing, FragmentStream, ModelDirectory,
    ModelProvider, NoopOperationHooks, ProviderConfig, ProviderError, ProviderErrorKind,
    ProviderFuture, ProviderKind, ProviderOperationHooks, Role, SecretString, TurnRequest,
    VecFragmentStream, WireMessage,
};

pub use config::{
    API_KEY_ENV, ConfigError, ConfigErrorKind, DEFAULT_SYSTEM_PROMPT, DEFAULT_TURN_LIMIT_MINUTES,
    TandemConfig,
};
pub use controller::{ResolvedModels, SessionController};
pub use export::{default_export_file_name, render_markdown, write_markdown};
pub use observe::{default_engine_hooks, default_provider_hooks};
pub use providers::{
    ProviderBuildConfig, ProviderPreset, build_from_provider_config, build_provider,
    build_provider_with_defaults, list_models,
};
pub use util::parse_preset;
