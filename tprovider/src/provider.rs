use tcommon::BoxFuture;

use crate::{BoxedFragmentStream, ProviderError, ProviderKind, TurnRequest};

pub type ProviderFuture<'a, T> = BoxFuture<'a, T>;

pub trait ModelProvider: Send + Sync {
    fn kind(&self) -> ProviderKind;

    /// Model identifiers in the order the endpoint reports them.
    fn list_models<'a>(&'a self) -> ProviderFuture<'a, Result<Vec<String>, ProviderError>>;

    fn stream_turn<'a>(
        &'a self,
        request: TurnRequest,
    ) -> ProviderFuture<'a, Result<BoxedFragmentStream<'a>, ProviderError>>;
}
