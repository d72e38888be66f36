//! Provider-agnostic request and message model types.
//!
//! ```rust
//! use tprovider::{Role, TurnRequest};
//!
//! let request = TurnRequest::from_history(
//!     "llama3.2",
//!     ["Talk about tea", "Green or black?", "Oolong, honestly."],
//!     "Chat like friends.",
//! );
//! assert_eq!(request.messages[0].role, Role::Assistant);
//! assert_eq!(request.messages[2].role, Role::User);
//! assert!(request.validate().is_ok());
//! ```

use std::fmt::{Display, Formatter};

use crate::ProviderError;

/// Wire protocol family spoken by a provider endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    /// Newline-delimited JSON chat protocol (`/api/tags`, `/api/chat`).
    LineProtocol,
    /// SSE-framed chat-completions protocol (`/models`, `/chat/completions`).
    SseProtocol,
}

impl Display for ProviderKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let id = match self {
            Self::LineProtocol => "line",
            Self::SseProtocol => "sse",
        };

        f.write_str(id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireMessage {
    pub role: Role,
    pub content: String,
}

impl WireMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// Reframes a transcript from the point of view of the model being asked: the latest
/// entry becomes incoming `user` input and every earlier entry becomes `assistant`,
/// whichever agent actually produced it.
pub fn relabel_for_requester<I, S>(contents: I) -> Vec<WireMessage>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut messages = contents
        .into_iter()
        .map(|content| WireMessage::new(Role::Assistant, content))
        .collect::<Vec<_>>();

    if let Some(last) = messages.last_mut() {
        last.role = Role::User;
    }

    messages
}

/// Built fresh for every turn; never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnRequest {
    pub model: String,
    pub messages: Vec<WireMessage>,
    pub system_prompt: String,
}

impl TurnRequest {
    pub fn new(
        model: impl Into<String>,
        messages: Vec<WireMessage>,
        system_prompt: impl Into<String>,
    ) -> Self {
        Self {
            model: model.into(),
            messages,
            system_prompt: system_prompt.into(),
        }
    }

    pub fn from_history<I, S>(
        model: impl Into<String>,
        contents: I,
        system_prompt: impl Into<String>,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(model, relabel_for_requester(contents), system_prompt)
    }

    /// System prompt, if it carries any text.
    pub fn system_instruction(&self) -> Option<&str> {
        let prompt = self.system_prompt.trim();
        (!prompt.is_empty()).then_some(self.system_prompt.as_str())
    }

    pub fn validate(&self) -> Result<(), ProviderError> {
        if self.model.trim().is_empty() {
            return Err(ProviderError::invalid_request("model must not be empty"));
        }

        if self.messages.is_empty() {
            return Err(ProviderError::invalid_request(
                "at least one message is required",
            ));
        }

        Ok(())
    }
}
