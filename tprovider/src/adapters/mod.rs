#[cfg(any(feature = "provider-line", feature = "provider-sse"))]
mod http;

#[cfg(feature = "provider-line")]
pub mod line;

#[cfg(feature = "provider-sse")]
pub mod sse;

#[cfg(any(feature = "provider-line", feature = "provider-sse"))]
pub use http::{LIST_TIMEOUT, STREAM_TIMEOUT, default_http_client};
