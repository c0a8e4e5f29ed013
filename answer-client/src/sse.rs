//! Decoder for the backend's SSE-framed answer stream.
//!
//! The body is newline-delimited; relevant lines start with `data: ` followed
//! by a JSON object whose `answer` field carries one fragment of the reply.
//! The stream ends with an `answer` equal to the `[DONE]` sentinel. Malformed
//! lines are logged and skipped; they never fail the decode.

use tracing::warn;

/// End-of-stream marker embedded in the `answer` field. Not content.
pub const DONE_SENTINEL: &str = "[DONE]";

const DATA_PREFIX: &str = "data: ";

/// One decoded unit of the answer stream. `done` chunks carry no content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamChunk {
    pub content: String,
    pub done: bool,
}

/// Decodes a single line. Returns `None` for irrelevant or malformed lines.
///
/// A missing `answer` field decodes as an empty fragment; the `[DONE]`
/// sentinel decodes as a terminal chunk with empty content so it is never
/// reflected in concatenated output.
pub fn decode_line(line: &str) -> Option<StreamChunk> {
    let line = line.trim();
    let payload = line.strip_prefix(DATA_PREFIX)?;

    let value: serde_json::Value = match serde_json::from_str(payload) {
        Ok(v) => v,
        Err(e) => {
            warn!(line = %line, error = %e, "Skipping malformed stream line");
            return None;
        }
    };

    let answer = value.get("answer").and_then(|v| v.as_str()).unwrap_or("");
    if answer == DONE_SENTINEL {
        return Some(StreamChunk {
            content: String::new(),
            done: true,
        });
    }

    Some(StreamChunk {
        content: answer.to_string(),
        done: false,
    })
}

/// Decodes a pre-read full body (batched variant). One pass, stateless:
/// decoding the same body twice yields the identical chunk sequence.
pub fn decode_body(body: &str) -> Vec<StreamChunk> {
    body.lines().filter_map(decode_line).collect()
}

/// Incremental decoder for the streaming variant: buffers raw bytes until a
/// full line is available. One decoder per response body; not restartable.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buf: Vec<u8>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds raw bytes and returns the chunks decoded from every line that is
    /// now complete. The trailing partial line stays buffered.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<StreamChunk> {
        self.buf.extend_from_slice(bytes);

        let mut chunks = Vec::new();
        while let Some(pos) = self.buf.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buf.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&line[..line.len() - 1]);
            if let Some(chunk) = decode_line(&line) {
                chunks.push(chunk);
            }
        }
        chunks
    }

    /// Flushes a trailing line that arrived without a final newline.
    pub fn finish(self) -> Vec<StreamChunk> {
        if self.buf.is_empty() {
            return Vec::new();
        }
        let line = String::from_utf8_lossy(&self.buf);
        decode_line(&line).into_iter().collect()
    }
}
