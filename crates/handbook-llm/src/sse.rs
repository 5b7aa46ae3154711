//! Incremental server-sent events parsing for streamed completions.

/// Payload that terminates an OpenAI-style stream.
const DONE_SENTINEL: &str = "[DONE]";

/// One complete event taken off the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SseEvent {
    /// The event's `data:` payload, multi-line data joined with `\n`.
    Data(String),
    /// `data: [DONE]`.
    Done,
}

/// Accumulates raw body bytes and hands out complete events.
///
/// Events end at a blank line. Carriage returns are dropped on input so
/// `\r\n` framing behaves like `\n`, including when the pair straddles two
/// network chunks.
#[derive(Debug, Default)]
pub(crate) struct SseBuffer {
    buffer: Vec<u8>,
}

impl SseBuffer {
    /// Append a chunk of response body.
    pub(crate) fn push(&mut self, bytes: &[u8]) {
        self.buffer
            .extend(bytes.iter().copied().filter(|byte| *byte != b'\r'));
    }

    /// Extract one complete event from the buffer.
    ///
    /// Returns `Some(Some(event))` if an event was found, `Some(None)` for a
    /// comment or an event without data (skip), and `None` when more bytes
    /// are needed.
    pub(crate) fn next_event(&mut self) -> Option<Option<SseEvent>> {
        let end = self.buffer.windows(2).position(|pair| pair == b"\n\n")?;
        let raw: Vec<u8> = self.buffer.drain(..end + 2).collect();
        Some(parse_event(&raw[..end]))
    }

    /// Parse whatever is left once the body has ended.
    pub(crate) fn flush(&mut self) -> Option<SseEvent> {
        let raw = std::mem::take(&mut self.buffer);
        parse_event(&raw)
    }
}

fn parse_event(raw: &[u8]) -> Option<SseEvent> {
    let text = String::from_utf8_lossy(raw);
    let data: Vec<&str> = text
        .lines()
        .filter_map(|line| line.strip_prefix("data:"))
        .map(|value| value.strip_prefix(' ').unwrap_or(value))
        .collect();

    if data.is_empty() {
        return None;
    }
    let data = data.join("\n");
    if data.trim() == DONE_SENTINEL {
        Some(SseEvent::Done)
    } else {
        Some(SseEvent::Data(data))
    }
}
