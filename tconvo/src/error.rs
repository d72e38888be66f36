//! Engine errors and classification.

use std::error::Error;
use std::fmt::{Display, Formatter};

use tprovider::{ProviderError, ProviderKind};

use crate::Speaker;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineErrorKind {
    /// The run could not start, or a turn request failed local validation.
    InvalidRequest,
    /// `step` was called while no run is active.
    NotRunning,
    /// An agent streamed nothing but whitespace.
    EmptyResponse,
    /// The provider failed while the turn was in flight.
    Transport,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineError {
    pub kind: EngineErrorKind,
    pub message: String,
    pub speaker: Option<Speaker>,
    pub model: Option<String>,
}

impl EngineError {
    pub fn new(kind: EngineErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            speaker: None,
            model: None,
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(EngineErrorKind::InvalidRequest, message)
    }

    pub fn not_running() -> Self {
        Self::new(EngineErrorKind::NotRunning, "no conversation is running")
    }

    pub fn empty_response(speaker: Speaker, model: &str) -> Self {
        Self {
            kind: EngineErrorKind::EmptyResponse,
            message: format!(
                "{speaker} ({model}) failed to generate a response. The conversation has been stopped."
            ),
            speaker: Some(speaker),
            model: Some(model.to_string()),
        }
    }

    /// Wraps a provider failure. Local validation failures keep their own kind so callers
    /// can tell a misconfigured turn from a broken connection.
    pub fn provider(
        speaker: Speaker,
        model: &str,
        provider: ProviderKind,
        error: &ProviderError,
    ) -> Self {
        let kind = if error.is_transport_failure() {
            EngineErrorKind::Transport
        } else {
            EngineErrorKind::InvalidRequest
        };

        Self {
            kind,
            message: format!(
                "error while talking to {speaker} ({model}) over the {provider} protocol: {error}"
            ),
            speaker: Some(speaker),
            model: Some(model.to_string()),
        }
    }
}

impl Display for EngineError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl Error for EngineError {}
