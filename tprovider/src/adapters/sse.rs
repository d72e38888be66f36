//! SSE-framed chat-completions protocol (`GET /models`, `POST /chat/completions`).

use std::sync::Arc;

use reqwest::Client;
use serde::Serialize;

use super::http::{self, STREAM_OPERATION};
use crate::{
    BoxedFragmentStream, ModelProvider, NoopOperationHooks, ProviderConfig, ProviderError,
    ProviderFuture, ProviderKind, ProviderOperationHooks, Role, TurnRequest, decode_sse_line,
    normalize_models_listing,
};

pub const DEFAULT_SSE_BASE_URL: &str = "http://localhost:1234/v1";

#[derive(Clone)]
pub struct SseProtocolProvider {
    config: ProviderConfig,
    client: Client,
    hooks: Arc<dyn ProviderOperationHooks>,
}

impl SseProtocolProvider {
    pub fn new(config: ProviderConfig) -> Result<Self, ProviderError> {
        Self::with_client(config, http::default_http_client()?)
    }

    pub fn with_client(config: ProviderConfig, client: Client) -> Result<Self, ProviderError> {
        if config.kind != ProviderKind::SseProtocol {
            return Err(ProviderError::invalid_request(format!(
                "SSE protocol provider cannot serve a `{}` configuration",
                config.kind
            )));
        }

        config.validate()?;
        Ok(Self {
            config,
            client,
            hooks: Arc::new(NoopOperationHooks),
        })
    }

    pub fn with_hooks(mut self, hooks: Arc<dyn ProviderOperationHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    /// The system instruction travels as a synthetic leading `system` message.
    fn build_request(request: TurnRequest) -> SseChatRequest {
        let mut messages = Vec::with_capacity(request.messages.len() + 1);
        if let Some(system) = request.system_instruction() {
            messages.push(SseChatMessage {
                role: Role::System.as_str(),
                content: system.to_string(),
            });
        }

        messages.extend(request.messages.into_iter().map(|message| SseChatMessage {
            role: message.role.as_str(),
            content: message.content,
        }));

        SseChatRequest {
            model: request.model,
            messages,
            stream: true,
        }
    }
}

impl ModelProvider for SseProtocolProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::SseProtocol
    }

    fn list_models<'a>(&'a self) -> ProviderFuture<'a, Result<Vec<String>, ProviderError>> {
        Box::pin(async move {
            http::fetch_listing(
                &self.client,
                &self.config,
                "models",
                self.hooks.as_ref(),
                normalize_models_listing,
            )
            .await
        })
    }

    fn stream_turn<'a>(
        &'a self,
        request: TurnRequest,
    ) -> ProviderFuture<'a, Result<BoxedFragmentStream<'a>, ProviderError>> {
        Box::pin(async move {
            request.validate()?;
            self.hooks
                .on_request_start(ProviderKind::SseProtocol, STREAM_OPERATION);

            let body = Self::build_request(request);
            let builder = self
                .client
                .post(self.config.endpoint("chat/completions"))
                .header(reqwest::header::ACCEPT, "text/event-stream")
                .json(&body);
            let response = http::open_stream(builder, &self.config, self.hooks.as_ref()).await?;

            Ok(http::fragment_stream(
                response,
                ProviderKind::SseProtocol,
                Arc::clone(&self.hooks),
                decode_sse_line,
            ))
        })
    }
}

#[derive(Debug, Serialize)]
struct SseChatRequest {
    model: String,
    messages: Vec<SseChatMessage>,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct SseChatMessage {
    role: &'static str,
    content: String,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn request_injects_leading_system_message() {
        let request = TurnRequest::from_history(
            "qwen2.5-7b-instruct",
            ["topic", "first reply", "second reply"],
            "Keep it casual.",
        );

        let body = serde_json::to_value(SseProtocolProvider::build_request(request))
            .expect("request should serialize");
        assert_eq!(
            body,
            json!({
                "model": "qwen2.5-7b-instruct",
                "messages": [
                    {"role": "system", "content": "Keep it casual."},
                    {"role": "assistant", "content": "topic"},
                    {"role": "assistant", "content": "first reply"},
                    {"role": "user", "content": "second reply"}
                ],
                "stream": true
            })
        );
    }

    #[test]
    fn rejects_line_configuration() {
        let err = SseProtocolProvider::with_client(
            ProviderConfig::line_protocol("http://localhost:11434"),
            Client::new(),
        )
        .err()
        .expect("kind mismatch must fail");
        assert_eq!(err.kind, crate::ProviderErrorKind::InvalidRequest);
    }
}
