use tracing::debug;

use super::classify::classify_payload;
use super::{ParserConfig, DONE_SENTINEL};
use crate::error::{ParlanceError, Result};
use crate::types::ParsedEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParserState {
    Open,
    Done,
    /// A line overflowed the ceiling; nothing more is emitted.
    Poisoned,
}

/// Incremental line parser for one response stream.
///
/// Bytes are buffered until a newline arrives, so a multi-byte character
/// split across reads is decoded intact.
#[derive(Debug)]
pub struct StreamParser {
    config: ParserConfig,
    buffer: Vec<u8>,
    state: ParserState,
    /// Overflow hit after earlier lines of the same read were emitted;
    /// reported by the next call.
    pending_overflow: Option<usize>,
}

impl Default for StreamParser {
    fn default() -> Self {
        Self::new(ParserConfig::default())
    }
}

impl StreamParser {
    pub fn new(config: ParserConfig) -> Self {
        Self {
            config,
            buffer: Vec::new(),
            state: ParserState::Open,
            pending_overflow: None,
        }
    }

    /// Whether the sentinel was seen (or [`finish`](Self::finish) was called).
    pub fn is_done(&self) -> bool {
        self.state == ParserState::Done
    }

    pub fn is_poisoned(&self) -> bool {
        self.state == ParserState::Poisoned
    }

    /// Bytes waiting for a line terminator.
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Feed one network read. Returns the events of every line it completed.
    ///
    /// Input after the sentinel, or after an overflow, is ignored. When a read
    /// completes some lines and then overflows, those lines are returned first
    /// and the overflow is reported by the next call to `feed` or `finish`.
    pub fn feed(&mut self, bytes: &[u8]) -> Result<Vec<ParsedEvent>> {
        self.take_pending_overflow()?;
        let mut events = Vec::new();
        if self.state != ParserState::Open {
            return Ok(events);
        }

        let mut rest = bytes;
        while let Some(newline) = rest.iter().position(|b| *b == b'\n') {
            if let Err(buffered) = self.append(&rest[..newline]) {
                return self.overflowed(events, buffered);
            }
            let line = std::mem::take(&mut self.buffer);
            rest = &rest[newline + 1..];
            if self.process_line(&line, &mut events) {
                return Ok(events);
            }
        }
        if let Err(buffered) = self.append(rest) {
            return self.overflowed(events, buffered);
        }
        Ok(events)
    }

    /// Flush a trailing line left without a terminator when the connection
    /// closes.
    pub fn finish(&mut self) -> Result<Vec<ParsedEvent>> {
        self.take_pending_overflow()?;
        let mut events = Vec::new();
        if self.state == ParserState::Open {
            let line = std::mem::take(&mut self.buffer);
            self.process_line(&line, &mut events);
            self.state = ParserState::Done;
        }
        Ok(events)
    }

    /// Buffer `bytes`; on overflow poison the parser and return the size the
    /// line would have reached.
    fn append(&mut self, bytes: &[u8]) -> std::result::Result<(), usize> {
        let buffered = self.buffer.len() + bytes.len();
        if buffered > self.config.max_line_bytes {
            self.state = ParserState::Poisoned;
            self.buffer = Vec::new();
            return Err(buffered);
        }
        self.buffer.extend_from_slice(bytes);
        Ok(())
    }

    fn overflowed(&mut self, events: Vec<ParsedEvent>, buffered: usize) -> Result<Vec<ParsedEvent>> {
        if events.is_empty() {
            return Err(self.overflow_error(buffered));
        }
        self.pending_overflow = Some(buffered);
        Ok(events)
    }

    fn take_pending_overflow(&mut self) -> Result<()> {
        match self.pending_overflow.take() {
            Some(buffered) => Err(self.overflow_error(buffered)),
            None => Ok(()),
        }
    }

    fn overflow_error(&self, buffered: usize) -> ParlanceError {
        ParlanceError::BufferExceeded {
            limit: self.config.max_line_bytes,
            buffered,
        }
    }

    /// Returns `true` when the sentinel ended the stream.
    fn process_line(&mut self, raw: &[u8], events: &mut Vec<ParsedEvent>) -> bool {
        let decoded = String::from_utf8_lossy(raw);
        let line = decoded.trim();
        if line.is_empty() || line.starts_with(':') {
            return false;
        }

        let payload = if let Some(data) = line.strip_prefix("data:") {
            data.trim_start()
        } else if line.starts_with('{') {
            line
        } else {
            // event:, id:, retry: and anything else.
            return false;
        };

        if payload == DONE_SENTINEL {
            self.state = ParserState::Done;
            self.buffer.clear();
            events.push(ParsedEvent::Done);
            return true;
        }
        if payload.is_empty() {
            return false;
        }

        match serde_json::from_str(payload) {
            Ok(value) => events.extend(classify_payload(value).into_iter().map(ParsedEvent::Chunk)),
            Err(err) => debug!(error = %err, bytes = payload.len(), "skipping malformed stream line"),
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::StreamChunk;
    use pretty_assertions::assert_eq;

    fn chunks(events: Vec<ParsedEvent>) -> Vec<StreamChunk> {
        events
            .into_iter()
            .filter_map(|e| match e {
                ParsedEvent::Chunk(c) => Some(c),
                ParsedEvent::Done => None,
            })
            .collect()
    }

    #[test]
    fn parses_data_lines_and_sentinel() {
        let mut parser = StreamParser::default();
        let events = parser
            .feed(b"data: {\"choices\":[{\"delta\":{\"content\":\"hi\"}}]}\n\ndata: [DONE]\n")
            .unwrap();
        assert_eq!(
            events,
            vec![ParsedEvent::Chunk(StreamChunk::text("hi")), ParsedEvent::Done]
        );
        assert!(parser.is_done());
        assert!(parser.feed(b"data: {\"choices\":[{\"delta\":{\"content\":\"late\"}}]}\n").unwrap().is_empty());
    }

    #[test]
    fn skips_comments_fields_and_malformed_json() {
        let mut parser = StreamParser::default();
        let events = parser
            .feed(b": OPENROUTER PROCESSING\nevent: message\nid: 4\ndata: {not json\ndata: {\"choices\":[{\"delta\":{\"content\":\"ok\"}}]}\n")
            .unwrap();
        assert_eq!(chunks(events), vec![StreamChunk::text("ok")]);
    }

    #[test]
    fn accepts_bare_json_and_crlf() {
        let mut parser = StreamParser::default();
        let events = parser
            .feed(b"{\"choices\":[{\"delta\":{\"content\":\"a\"}}]}\r\n")
            .unwrap();
        assert_eq!(chunks(events), vec![StreamChunk::text("a")]);
    }

    #[test]
    fn reassembles_split_multibyte_characters() {
        let line = "data: {\"choices\":[{\"delta\":{\"content\":\"héllo ✓\"}}]}\n".as_bytes();
        let split = line.iter().position(|b| *b == 0xC3).unwrap() + 1;
        let mut parser = StreamParser::default();
        assert!(parser.feed(&line[..split]).unwrap().is_empty());
        let events = parser.feed(&line[split..]).unwrap();
        assert_eq!(chunks(events), vec![StreamChunk::text("héllo ✓")]);
    }

    #[test]
    fn overflow_is_fatal_and_poisons() {
        let mut parser = StreamParser::new(ParserConfig::with_max_line_bytes(16));
        let err = parser.feed(&[b'x'; 17]).unwrap_err();
        assert!(matches!(
            err,
            ParlanceError::BufferExceeded {
                limit: 16,
                buffered: 17
            }
        ));
        assert!(parser.is_poisoned());
        assert!(parser.feed(b"data: [DONE]\n").unwrap().is_empty());
        assert!(parser.finish().unwrap().is_empty());
    }

    #[test]
    fn overflow_after_complete_line_keeps_the_line() {
        let line = b"data: {\"choices\":[{\"delta\":{\"content\":\"a\"}}]}\n";
        let mut input = line.to_vec();
        input.extend_from_slice(&[b'x'; 80]);

        let mut whole = StreamParser::new(ParserConfig::with_max_line_bytes(64));
        assert_eq!(chunks(whole.feed(&input).unwrap()), vec![StreamChunk::text("a")]);
        assert!(whole.is_poisoned());
        assert!(matches!(
            whole.feed(b"data: [DONE]\n"),
            Err(ParlanceError::BufferExceeded { limit: 64, buffered: 80 })
        ));
        assert!(whole.finish().unwrap().is_empty());

        let mut split = StreamParser::new(ParserConfig::with_max_line_bytes(64));
        assert_eq!(chunks(split.feed(line).unwrap()), vec![StreamChunk::text("a")]);
        assert!(matches!(
            split.feed(&[b'x'; 80]),
            Err(ParlanceError::BufferExceeded { limit: 64, buffered: 80 })
        ));
    }

    #[test]
    fn pending_overflow_is_reported_by_finish() {
        let mut parser = StreamParser::new(ParserConfig::with_max_line_bytes(64));
        let mut input = b"data: {\"choices\":[{\"delta\":{\"content\":\"a\"}}]}\n".to_vec();
        input.extend_from_slice(&[b'x'; 70]);
        assert_eq!(parser.feed(&input).unwrap().len(), 1);
        assert!(matches!(
            parser.finish(),
            Err(ParlanceError::BufferExceeded { buffered: 70, .. })
        ));
        assert!(parser.finish().unwrap().is_empty());
    }

    #[test]
    fn finish_flushes_unterminated_line() {
        let mut parser = StreamParser::default();
        assert!(parser
            .feed(b"data: {\"choices\":[{\"delta\":{\"content\":\"tail\"}}]}")
            .unwrap()
            .is_empty());
        assert_eq!(chunks(parser.finish().unwrap()), vec![StreamChunk::text("tail")]);
        assert!(parser.is_done());
    }
}
