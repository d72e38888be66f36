//! reqwest plumbing shared by both protocol adapters.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_stream::stream;
use futures_util::StreamExt;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::Value;

use crate::{
    BoxedFragmentStream, LineBuffer, LineDecode, ProviderConfig, ProviderError, ProviderKind,
    ProviderOperationHooks,
};

/// Hard cutoff for a model listing request.
pub const LIST_TIMEOUT: Duration = Duration::from_secs(10);

/// Connect and per-read cutoff while streaming a turn.
pub const STREAM_TIMEOUT: Duration = Duration::from_secs(60);

pub fn default_http_client() -> Result<Client, ProviderError> {
    Client::builder()
        .connect_timeout(STREAM_TIMEOUT)
        .read_timeout(STREAM_TIMEOUT)
        .build()
        .map_err(|err| ProviderError::transport(err.to_string()))
}

pub(crate) fn apply_auth(builder: RequestBuilder, config: &ProviderConfig) -> RequestBuilder {
    match &config.credential {
        Some(credential) => builder.bearer_auth(credential.expose()),
        None => builder,
    }
}

pub(crate) fn map_send_error(err: reqwest::Error) -> ProviderError {
    if err.is_timeout() {
        ProviderError::timeout(err.to_string())
    } else {
        ProviderError::transport(err.to_string())
    }
}

pub(crate) async fn parse_error(response: Response) -> ProviderError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let message = extract_error_message(&body)
        .unwrap_or_else(|| format!("request failed with status {status}: {}", truncate(&body, 512)));

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ProviderError::authentication(message),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            ProviderError::timeout(message)
        }
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
            ProviderError::invalid_request(message)
        }
        StatusCode::SERVICE_UNAVAILABLE | StatusCode::BAD_GATEWAY => {
            ProviderError::unavailable(message)
        }
        _ => ProviderError::transport(message),
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ErrorField {
    Text(String),
    Detailed { message: String },
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorField,
}

pub(crate) fn extract_error_message(body: &str) -> Option<String> {
    let parsed = serde_json::from_str::<ErrorEnvelope>(body).ok()?;
    Some(match parsed.error {
        ErrorField::Text(message) => message,
        ErrorField::Detailed { message } => message,
    })
}

pub(crate) fn truncate(input: &str, max: usize) -> String {
    if input.len() <= max {
        return input.to_string();
    }

    let mut cut = max;
    while !input.is_char_boundary(cut) {
        cut -= 1;
    }

    let mut output = input[..cut].to_string();
    output.push_str("...");
    output
}

/// Fetches a listing document. Every failure is reported as `DirectoryUnavailable`.
pub(crate) async fn fetch_listing(
    client: &Client,
    config: &ProviderConfig,
    path: &str,
    hooks: &dyn ProviderOperationHooks,
    normalize: fn(&Value) -> Option<Vec<String>>,
) -> Result<Vec<String>, ProviderError> {
    const OPERATION: &str = "list_models";

    let started = Instant::now();
    let url = config.endpoint(path);
    hooks.on_request_start(config.kind, OPERATION);

    let result = async {
        config.validate()?;

        let builder = client
            .get(&url)
            .timeout(LIST_TIMEOUT)
            .header(reqwest::header::ACCEPT, "application/json");
        let response = apply_auth(builder, config)
            .send()
            .await
            .map_err(map_send_error)?;

        if !response.status().is_success() {
            return Err(parse_error(response).await);
        }

        let body = response
            .json::<Value>()
            .await
            .map_err(|err| ProviderError::transport(err.to_string()))?;

        normalize(&body).ok_or_else(|| ProviderError::transport("unexpected listing shape"))
    }
    .await
    .map_err(|error| {
        ProviderError::directory_unavailable(format!("{url}: {}", error.message))
    });

    match &result {
        Ok(_) => hooks.on_success(config.kind, OPERATION, started.elapsed()),
        Err(error) => hooks.on_failure(config.kind, OPERATION, error),
    }

    result
}

/// Sends a streaming chat request and checks the status before any body is read.
pub(crate) async fn open_stream(
    builder: RequestBuilder,
    config: &ProviderConfig,
    hooks: &dyn ProviderOperationHooks,
) -> Result<Response, ProviderError> {
    let result = async {
        let response = apply_auth(builder, config)
            .send()
            .await
            .map_err(map_send_error)?;

        if !response.status().is_success() {
            return Err(parse_error(response).await);
        }

        Ok(response)
    }
    .await;

    if let Err(error) = &result {
        hooks.on_failure(config.kind, STREAM_OPERATION, error);
    }

    result
}

pub(crate) const STREAM_OPERATION: &str = "stream_turn";

/// Turns a response body into a lazy fragment stream. Decode failures on single lines are
/// reported through the hooks and skipped; a failed body read ends the stream with an error.
/// Dropping the returned stream drops the response and releases its connection.
pub(crate) fn fragment_stream<'a>(
    response: Response,
    kind: ProviderKind,
    hooks: Arc<dyn ProviderOperationHooks>,
    decode: fn(&str) -> LineDecode,
) -> BoxedFragmentStream<'a> {
    let started = Instant::now();

    let stream = stream! {
        let mut chunks = response.bytes_stream();
        let mut lines = LineBuffer::new();
        let mut done = false;

        while !done {
            let Some(item) = chunks.next().await else {
                break;
            };

            let bytes = match item {
                Ok(bytes) => bytes,
                Err(err) => {
                    let error = map_send_error(err);
                    hooks.on_failure(kind, STREAM_OPERATION, &error);
                    yield Err(error);
                    return;
                }
            };
            lines.push(&bytes);

            while let Some(line) = lines.next_line() {
                match decode(&line) {
                    LineDecode::Fragment(text) => yield Ok(text),
                    LineDecode::Done => {
                        done = true;
                        break;
                    }
                    LineDecode::Skip => {}
                    LineDecode::Malformed(reason) => hooks.on_decode_warning(kind, &line, &reason),
                }
            }
        }

        if !done {
            if let Some(line) = lines.finish() {
                match decode(&line) {
                    LineDecode::Fragment(text) => yield Ok(text),
                    LineDecode::Malformed(reason) => hooks.on_decode_warning(kind, &line, &reason),
                    LineDecode::Done | LineDecode::Skip => {}
                }
            }
        }

        hooks.on_success(kind, STREAM_OPERATION, started.elapsed());
    };

    Box::pin(stream)
}
