//! Streaming fragment contracts and in-memory stream utilities.
//!
//! ```rust
//! use tprovider::{BoxedFragmentStream, VecFragmentStream};
//!
//! let stream = VecFragmentStream::new(vec![Ok("hello".into())]);
//! let _boxed: BoxedFragmentStream<'static> = Box::pin(stream);
//! ```

use std::collections::VecDeque;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures_core::Stream;

use crate::ProviderError;

/// Provider fragment stream contract.
///
/// Invariants for consumers:
/// - Fragments are emitted in source order and concatenate to the full reply.
/// - An `Err` item is terminal for the turn; nothing useful follows it.
/// - Once the stream yields `None`, it must not yield additional items.
/// - Dropping the stream early releases the underlying connection.
pub trait FragmentStream: Stream<Item = Result<String, ProviderError>> + Send {}

impl<T> FragmentStream for T where T: Stream<Item = Result<String, ProviderError>> + Send {}

pub type BoxedFragmentStream<'a> = Pin<Box<dyn FragmentStream + 'a>>;

#[derive(Debug)]
pub struct VecFragmentStream {
    fragments: VecDeque<Result<String, ProviderError>>,
}

impl VecFragmentStream {
    pub fn new(fragments: Vec<Result<String, ProviderError>>) -> Self {
        Self {
            fragments: fragments.into(),
        }
    }

    pub fn from_text<I, S>(fragments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(fragments.into_iter().map(|text| Ok(text.into())).collect())
    }
}

impl Stream for VecFragmentStream {
    type Item = Result<String, ProviderError>;

    fn poll_next(
        mut self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
    ) -> Poll<Option<Result<String, ProviderError>>> {
        Poll::Ready(self.fragments.pop_front())
    }
}
