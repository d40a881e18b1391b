//! Incremental parsing of newline-delimited, `data:`-prefixed stream bodies
//! into canonical [`StreamChunk`](crate::types::StreamChunk)s.

mod classify;
mod parser;
pub mod reader;

pub use classify::classify_payload;
pub use parser::StreamParser;
pub use reader::{chunk_stream, with_cancellation, ChunkStream};

use serde::{Deserialize, Serialize};

/// Default ceiling for a single unterminated line (32 MiB).
///
/// Inline base64 images arrive as one line, so this is generous.
pub const DEFAULT_MAX_LINE_BYTES: usize = 32 * 1024 * 1024;

/// Payload that terminates the stream.
pub const DONE_SENTINEL: &str = "[DONE]";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParserConfig {
    pub max_line_bytes: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            max_line_bytes: DEFAULT_MAX_LINE_BYTES,
        }
    }
}

impl ParserConfig {
    pub fn with_max_line_bytes(max_line_bytes: usize) -> Self {
        Self { max_line_bytes }
    }
}
