//! Provider adapters for the tandem conversation runner.
//!
//! A provider turns a uniform [`TurnRequest`] into one of two streaming wire protocols and
//! decodes the reply into a lazy sequence of text fragments. The model directory normalizes
//! each protocol's listing endpoint into a flat, ordered list of model identifiers.
//!
//! ```rust
//! use tprovider::{ProviderConfig, ProviderKind, TurnRequest};
//!
//! let config = ProviderConfig::line_protocol("http://localhost:11434");
//! assert_eq!(config.kind, ProviderKind::LineProtocol);
//!
//! let request = TurnRequest::from_history("llama3.2", ["Discuss rivers"], "Chat like friends.");
//! assert_eq!(request.messages.len(), 1);
//! ```

pub mod adapters;
pub mod prelude;

mod credentials;
mod decode;
mod directory;
mod error;
mod hooks;
mod model;
mod provider;
mod stream;

pub use credentials::{ProviderConfig, SecretString};
pub use decode::{LineBuffer, LineDecode, decode_chat_line, decode_sse_line};
pub use directory::{
    AgentModels, DirectoryListing, ModelDirectory, normalize_models_listing,
    normalize_tags_listing,
};
pub use error::{ProviderError, ProviderErrorKind};
pub use hooks::{NoopOperationHooks, ProviderOperationHooks};
pub use model::{ProviderKind, Role, TurnRequest, WireMessage, relabel_for_requester};
pub use provider::{ModelProvider, ProviderFuture};
pub use stream::{BoxedFragmentStream, FragmentStream, VecFragmentStream};
