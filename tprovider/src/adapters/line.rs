//! Newline-delimited JSON chat protocol (`GET /api/tags`, `POST /api/chat`).

use std::sync::Arc;

use reqwest::Client;
use serde::Serialize;

use super::http::{self, STREAM_OPERATION};
use crate::{
    BoxedFragmentStream, ModelProvider, NoopOperationHooks, ProviderConfig, ProviderError,
    ProviderFuture, ProviderKind, ProviderOperationHooks, TurnRequest, decode_chat_line,
    normalize_tags_listing,
};

pub const DEFAULT_LINE_BASE_URL: &str = "http://localhost:11434";

#[derive(Clone)]
pub struct LineProtocolProvider {
    config: ProviderConfig,
    client: Client,
    hooks: Arc<dyn ProviderOperationHooks>,
}

impl LineProtocolProvider {
    pub fn new(config: ProviderConfig) -> Result<Self, ProviderError> {
        Self::with_client(config, http::default_http_client()?)
    }

    pub fn with_client(config: ProviderConfig, client: Client) -> Result<Self, ProviderError> {
        if config.kind != ProviderKind::LineProtocol {
            return Err(ProviderError::invalid_request(format!(
                "line protocol provider cannot serve a `{}` configuration",
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

    fn build_request(request: TurnRequest) -> LineChatRequest {
        let system = request.system_instruction().map(str::to_string);
        LineChatRequest {
            model: request.model,
            messages: request
                .messages
                .into_iter()
                .map(|message| LineChatMessage {
                    role: message.role.as_str(),
                    content: message.content,
                })
                .collect(),
            stream: true,
            system,
        }
    }
}

impl ModelProvider for LineProtocolProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::LineProtocol
    }

    fn list_models<'a>(&'a self) -> ProviderFuture<'a, Result<Vec<String>, ProviderError>> {
        Box::pin(async move {
            http::fetch_listing(
                &self.client,
                &self.config,
                "api/tags",
                self.hooks.as_ref(),
                normalize_tags_listing,
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
                .on_request_start(ProviderKind::LineProtocol, STREAM_OPERATION);

            let body = Self::build_request(request);
            let builder = self.client.post(self.config.endpoint("api/chat")).json(&body);
            let response = http::open_stream(builder, &self.config, self.hooks.as_ref()).await?;

            Ok(http::fragment_stream(
                response,
                ProviderKind::LineProtocol,
                Arc::clone(&self.hooks),
                decode_chat_line,
            ))
        })
    }
}

#[derive(Debug, Serialize)]
struct LineChatRequest {
    model: String,
    messages: Vec<LineChatMessage>,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
}

#[derive(Debug, Serialize)]
struct LineChatMessage {
    role: &'static str,
    content: String,
}
