//! Shared primitives for the tandem workspace crates.
//!
//! ```rust
//! use tcommon::{RunId, StopSignal};
//!
//! let run = RunId::new("run-1");
//! let stop = StopSignal::new();
//! assert_eq!(run.as_str(), "run-1");
//! assert!(!stop.is_stopped());
//! ```

pub mod future {
    //! Shared async future aliases.
    //!
    //! ```rust
    //! use tcommon::BoxFuture;
    //!
    //! fn str_len<'a>(value: &'a str) -> BoxFuture<'a, usize> {
    //!     Box::pin(async move { value.len() })
    //! }
    //!
    //! let _future = str_len("hello");
    //! ```

    use std::future::Future;
    use std::pin::Pin;

    pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;
}

pub mod context {
    //! Identifier newtypes shared across crates.
    //!
    //! ```rust
    //! use tcommon::RunId;
    //!
    //! let run = RunId::from("run-42");
    //! assert_eq!(run.to_string(), "run-42");
    //! ```

    use std::fmt::{Display, Formatter};

    #[derive(Debug, Clone, PartialEq, Eq, Hash)]
    pub struct RunId(String);

    impl RunId {
        pub fn new(value: impl Into<String>) -> Self {
            Self(value.into())
        }

        pub fn as_str(&self) -> &str {
            self.0.as_str()
        }
    }

    impl Display for RunId {
        fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
            f.write_str(&self.0)
        }
    }

    impl From<String> for RunId {
        fn from(value: String) -> Self {
            Self(value)
        }
    }

    impl From<&str> for RunId {
        fn from(value: &str) -> Self {
            Self(value.to_string())
        }
    }
}

pub mod stop {
    //! Cooperative stop flag shared by a session controller and the turn engine.
    //!
    //! ```rust
    //! use tcommon::StopSignal;
    //!
    //! let signal = StopSignal::new();
    //! let controller_side = signal.clone();
    //! controller_side.request_stop();
    //! assert!(signal.is_stopped());
    //!
    //! signal.reset();
    //! assert!(!controller_side.is_stopped());
    //! ```

    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    use tokio::sync::Notify;

    #[derive(Debug, Default)]
    struct StopState {
        stopped: AtomicBool,
        notify: Notify,
    }

    /// Clones observe the same flag.
    #[derive(Debug, Clone, Default)]
    pub struct StopSignal {
        state: Arc<StopState>,
    }

    impl StopSignal {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn request_stop(&self) {
            self.state.stopped.store(true, Ordering::SeqCst);
            self.state.notify.notify_waiters();
        }

        pub fn is_stopped(&self) -> bool {
            self.state.stopped.load(Ordering::SeqCst)
        }

        pub fn reset(&self) {
            self.state.stopped.store(false, Ordering::SeqCst);
        }

        /// Resolves once a stop has been requested. Returns immediately if one already was.
        pub async fn stopped(&self) {
            loop {
                let notified = self.state.notify.notified();
                tokio::pin!(notified);
                // Register before checking the flag so a concurrent request_stop is not lost.
                notified.as_mut().enable();

                if self.is_stopped() {
                    return;
                }

                notified.await;
            }
        }
    }
}

pub use context::RunId;
pub use future::BoxFuture;
pub use stop::StopSignal;
