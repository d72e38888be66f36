//! Common `tprovider` imports for downstream crates.

pub use crate::{
    AgentModels, BoxedFragmentStream, DirectoryListing, FragmentStream, ModelDirectory,
    ModelProvider, NoopOperationHooks, ProviderConfig, ProviderError, ProviderErrorKind,
    ProviderFuture, ProviderKind, ProviderOperationHooks, Role, TurnRequest, WireMessage,
};
pub use tcommon::BoxFuture;
