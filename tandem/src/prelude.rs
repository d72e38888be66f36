//! Common imports for most tandem applications.

pub use crate::{
    AgentModels, DirectoryListing, EngineError, EngineErrorKind, ModelProvider, ProviderBuildConfig,
    ProviderError, ProviderPreset, Session, SessionController, Speaker, StopSignal, TandemConfig,
    Transcript, TurnEngine, TurnEvent, TurnLimit, TurnOutcome,
};
pub use crate::{
    build_provider, default_engine_hooks, default_export_file_name, default_provider_hooks,
    list_models, parse_preset, render_markdown, write_markdown,
};
