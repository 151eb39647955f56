//! Incremental `text/event-stream` decoder.
//!
//! Bytes arrive in arbitrary chunks; complete lines are fed through the
//! field grammar:
//! - `data: <payload>` appends a data line (multiple lines join with `\n`)
//! - `event: <name>` / `id: <id>` set the event name and id
//! - `: <text>` is a comment (keep-alive), ignored
//! - an empty line dispatches the accumulated event

use std::collections::VecDeque;

/// Longest partial line the decoder buffers before giving up on the stream.
pub const MAX_LINE_BYTES: usize = 1 << 20;

/// A line grew past the decoder's limit without a terminator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("event-stream line exceeds {limit} bytes")]
pub struct LineTooLong {
    pub limit: usize,
}

/// A parsed SSE line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SseLine {
    /// Empty line - signals end of event
    Empty,
    /// Comment line (starts with ':')
    Comment(String),
    /// `name: value` field
    Field { name: String, value: String },
}

/// One dispatched event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseEvent {
    pub event: Option<String>,
    pub id: Option<String>,
    pub data: String,
}

impl SseEvent {
    /// Unnamed events and events named `message` are regular messages.
    pub fn is_message(&self) -> bool {
        matches!(self.event.as_deref(), None | Some("message"))
    }
}

/// Parse a single SSE line into its component type.
pub fn parse_sse_line(line: &str) -> SseLine {
    if line.is_empty() {
        return SseLine::Empty;
    }

    if let Some(stripped) = line.strip_prefix(':') {
        return SseLine::Comment(stripped.trim().to_string());
    }

    let (name, value) = match line.split_once(':') {
        Some((name, value)) => (name, value.strip_prefix(' ').unwrap_or(value)),
        None => (line, ""),
    };
    SseLine::Field {
        name: name.to_string(),
        value: value.to_string(),
    }
}

/// Stateful decoder that accumulates bytes and emits complete events.
#[derive(Debug)]
pub struct SseDecoder {
    bytes: Vec<u8>,
    max_line: usize,
    event: Option<String>,
    id: Option<String>,
    data: Vec<String>,
    ready: VecDeque<SseEvent>,
}

impl Default for SseDecoder {
    fn default() -> Self {
        Self::with_max_line(MAX_LINE_BYTES)
    }
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// A decoder that rejects partial lines longer than `limit` bytes.
    pub fn with_max_line(limit: usize) -> Self {
        Self {
            bytes: Vec::new(),
            max_line: limit,
            event: None,
            id: None,
            data: Vec::new(),
            ready: VecDeque::new(),
        }
    }

    /// Feed a chunk of the response body.
    ///
    /// # Errors
    ///
    /// Returns [`LineTooLong`] when the unterminated tail exceeds the line
    /// limit. The partial line is dropped; complete events already decoded
    /// stay available.
    pub fn push(&mut self, chunk: &[u8]) -> Result<(), LineTooLong> {
        self.bytes.extend_from_slice(chunk);
        while let Some(pos) = self.bytes.iter().position(|b| *b == b'\n') {
            let raw: Vec<u8> = self.bytes.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&raw);
            self.feed_line(line.trim_end_matches(['\n', '\r']));
        }
        if self.bytes.len() > self.max_line {
            self.bytes.clear();
            return Err(LineTooLong {
                limit: self.max_line,
            });
        }
        Ok(())
    }

    /// Feed one complete line (without its terminator).
    pub fn feed_line(&mut self, line: &str) {
        match parse_sse_line(line) {
            SseLine::Empty => self.dispatch(),
            SseLine::Comment(_) => {}
            SseLine::Field { name, value } => match name.as_str() {
                "data" => self.data.push(value),
                "event" => self.event = Some(value),
                "id" => self.id = Some(value),
                // `retry` and unknown fields are ignored; reconnection timing is ours
                _ => {}
            },
        }
    }

    fn dispatch(&mut self) {
        let event = self.event.take();
        if self.data.is_empty() {
            return;
        }
        let data = self.data.join("\n");
        self.data.clear();
        self.ready.push_back(SseEvent {
            event,
            id: self.id.clone(),
            data,
        });
    }

    /// Next complete event, if any.
    pub fn next_event(&mut self) -> Option<SseEvent> {
        self.ready.pop_front()
    }

    /// Clears everything, including partial lines. The line limit is kept.
    pub fn reset(&mut self) {
        *self = Self::with_max_line(self.max_line);
    }
}
