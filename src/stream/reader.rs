//! Adapts a byte stream into a chunk stream.

use std::pin::Pin;

use futures::{Stream, StreamExt};
use tokio_util::sync::CancellationToken;

use super::{ParserConfig, StreamParser};
use crate::error::{ParlanceError, Result};
use crate::types::{ParsedEvent, StreamChunk};

/// Boxed stream of canonical chunks.
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<StreamChunk>> + Send>>;

/// Parse `bytes` into chunks.
///
/// Ends at the sentinel or when the byte stream closes. Transport errors
/// and parser overflow are yielded once and end the stream.
pub fn chunk_stream<S, B, E>(bytes: S, config: ParserConfig) -> ChunkStream
where
    S: Stream<Item = std::result::Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: Into<ParlanceError> + Send + 'static,
{
    Box::pin(async_stream::stream! {
        let mut parser = StreamParser::new(config);
        futures::pin_mut!(bytes);

        while let Some(read) = bytes.next().await {
            let data = match read {
                Ok(data) => data,
                Err(e) => {
                    yield Err(e.into());
                    return;
                }
            };
            match parser.feed(data.as_ref()) {
                Ok(events) => {
                    for event in events {
                        match event {
                            ParsedEvent::Chunk(chunk) => yield Ok(chunk),
                            ParsedEvent::Done => return,
                        }
                    }
                    // An overflow behind the emitted lines surfaces now.
                    if parser.is_poisoned() {
                        if let Err(e) = parser.finish() {
                            yield Err(e);
                        }
                        return;
                    }
                }
                Err(e) => {
                    yield Err(e);
                    return;
                }
            }
        }

        match parser.finish() {
            Ok(events) => {
                for event in events {
                    if let ParsedEvent::Chunk(chunk) = event {
                        yield Ok(chunk);
                    }
                }
            }
            Err(e) => yield Err(e),
        }
    })
}

/// End `stream` with [`ParlanceError::Cancelled`] as soon as `cancel` fires.
pub fn with_cancellation(mut stream: ChunkStream, cancel: CancellationToken) -> ChunkStream {
    Box::pin(async_stream::stream! {
        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => None,
                next = stream.next() => Some(next),
            };
            match next {
                None => {
                    yield Err(ParlanceError::Cancelled);
                    return;
                }
                Some(Some(item)) => yield item,
                Some(None) => return,
            }
        }
    })
}
