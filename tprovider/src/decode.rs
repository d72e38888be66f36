//! Byte-to-line framing and per-line decoding for both streaming wire protocols.
//!
//! ```rust
//! use tprovider::{LineBuffer, LineDecode, decode_sse_line};
//!
//! let mut buffer = LineBuffer::new();
//! buffer.push(b"data: {\"choices\":[{\"delta\":{\"content\":\"hi\"}}]}\n\ndata: [DONE]\n\n");
//!
//! let decoded = std::iter::from_fn(|| buffer.next_line())
//!     .map(|line| decode_sse_line(&line))
//!     .collect::<Vec<_>>();
//! assert_eq!(
//!     decoded,
//!     vec![
//!         LineDecode::Fragment("hi".to_string()),
//!         LineDecode::Skip,
//!         LineDecode::Done,
//!         LineDecode::Skip,
//!     ]
//! );
//! ```

use serde::Deserialize;

/// Outcome of decoding one framed line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineDecode {
    Fragment(String),
    /// End-of-stream sentinel; nothing after it is read.
    Done,
    /// Blank, keep-alive, or content-free line.
    Skip,
    /// Undecodable line; reported as a decode warning and skipped.
    Malformed(String),
}

/// Splits an incoming byte stream into lines. Bytes are buffered until a newline arrives,
/// so multi-byte characters split across network chunks decode intact.
#[derive(Debug, Default)]
pub struct LineBuffer {
    pending: Vec<u8>,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, chunk: &[u8]) {
        self.pending.extend_from_slice(chunk);
    }

    pub fn next_line(&mut self) -> Option<String> {
        let newline = self.pending.iter().position(|byte| *byte == b'\n')?;
        let line = self.pending.drain(..=newline).collect::<Vec<_>>();
        Some(lossy_line(&line))
    }

    /// Drains whatever is left once the body ends without a trailing newline.
    pub fn finish(&mut self) -> Option<String> {
        if self.pending.is_empty() {
            return None;
        }

        let rest = std::mem::take(&mut self.pending);
        Some(lossy_line(&rest))
    }
}

fn lossy_line(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes)
        .trim_end_matches(['\r', '\n'])
        .to_string()
}

#[derive(Debug, Deserialize)]
struct ChatLine {
    #[serde(default)]
    message: Option<ChatLineMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatLineMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Decodes one line of the newline-delimited JSON chat protocol.
pub fn decode_chat_line(line: &str) -> LineDecode {
    let line = line.trim();
    if line.is_empty() {
        return LineDecode::Skip;
    }

    match serde_json::from_str::<ChatLine>(line) {
        Ok(parsed) => match parsed.message.and_then(|message| message.content) {
            Some(content) if !content.is_empty() => LineDecode::Fragment(content),
            _ => LineDecode::Skip,
        },
        Err(err) => LineDecode::Malformed(err.to_string()),
    }
}

#[derive(Debug, Deserialize)]
struct SseChunk {
    #[serde(default)]
    choices: Vec<SseChoice>,
}

#[derive(Debug, Deserialize)]
struct SseChoice {
    #[serde(default)]
    delta: Option<SseDelta>,
}

#[derive(Debug, Deserialize)]
struct SseDelta {
    #[serde(default)]
    content: Option<String>,
}

const SSE_DONE: &str = "[DONE]";
const SSE_IGNORED_FIELDS: [&str; 3] = ["event:", "id:", "retry:"];

/// Decodes one line of the SSE chat-completions protocol. Lines without a `data:` prefix
/// that are not comments or other SSE fields are treated as raw payloads.
pub fn decode_sse_line(line: &str) -> LineDecode {
    let line = line.trim();
    if line.is_empty() || line.starts_with(':') {
        return LineDecode::Skip;
    }

    let payload = match line.strip_prefix("data:") {
        Some(rest) => rest.trim(),
        None if SSE_IGNORED_FIELDS
            .iter()
            .any(|field| line.starts_with(field)) =>
        {
            return LineDecode::Skip;
        }
        None => line,
    };

    if payload.is_empty() {
        return LineDecode::Skip;
    }

    if payload == SSE_DONE {
        return LineDecode::Done;
    }

    match serde_json::from_str::<SseChunk>(payload) {
        Ok(chunk) => match chunk
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.delta)
            .and_then(|delta| delta.content)
        {
            Some(content) if !content.is_empty() => LineDecode::Fragment(content),
            _ => LineDecode::Skip,
        },
        Err(err) => LineDecode::Malformed(err.to_string()),
    }
}
