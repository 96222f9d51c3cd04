//! Newline-delimited JSON framing for the editor bridge

use std::marker::PhantomData;

use bytes::{BufMut, BytesMut};
use serde::{de::DeserializeOwned, Serialize};
use tokio_util::codec::{Decoder, Encoder};

use crate::messages::{EngineMessage, HostMessage};

/// Maximum frame size (16 MB)
const MAX_FRAME_SIZE: usize = 16 * 1024 * 1024;

/// Bridge codec error
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Frame too large: {size} bytes (max {max})")]
    FrameTooLarge { size: usize, max: usize },
}

impl CodecError {
    /// Whether the stream can continue after this error
    ///
    /// A malformed frame has already been consumed from the buffer, so
    /// decoding resumes at the next line.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, CodecError::Json(_))
    }
}

/// JSON-lines codec decoding `D` and encoding `E`
pub struct JsonLinesCodec<D, E> {
    /// Bytes already scanned for a newline
    scanned: usize,
    _marker: PhantomData<fn(E) -> D>,
}

impl<D, E> JsonLinesCodec<D, E> {
    pub fn new() -> Self {
        Self {
            scanned: 0,
            _marker: PhantomData,
        }
    }
}

impl<D, E> Default for JsonLinesCodec<D, E> {
    fn default() -> Self {
        Self::new()
    }
}

/// Codec used by the engine: decodes host messages, encodes engine messages
pub type EngineCodec = JsonLinesCodec<HostMessage, EngineMessage>;

/// Codec used by an editor plugin: decodes engine messages, encodes host messages
pub type HostCodec = JsonLinesCodec<EngineMessage, HostMessage>;

impl<D: DeserializeOwned, E> Decoder for JsonLinesCodec<D, E> {
    type Item = D;
    type Error = CodecError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        loop {
            let newline = src[self.scanned..].iter().position(|b| *b == b'\n');

            let Some(offset) = newline else {
                self.scanned = src.len();
                if src.len() > MAX_FRAME_SIZE {
                    let size = src.len();
                    src.clear();
                    self.scanned = 0;
                    return Err(CodecError::FrameTooLarge {
                        size,
                        max: MAX_FRAME_SIZE,
                    });
                }
                return Ok(None);
            };

            let line = src.split_to(self.scanned + offset + 1);
            self.scanned = 0;

            let line = trim_line(&line);
            if line.is_empty() {
                continue;
            }
            if line.len() > MAX_FRAME_SIZE {
                return Err(CodecError::FrameTooLarge {
                    size: line.len(),
                    max: MAX_FRAME_SIZE,
                });
            }

            return Ok(Some(serde_json::from_slice(line)?));
        }
    }
}

impl<D, E: Serialize> Encoder<E> for JsonLinesCodec<D, E> {
    type Error = CodecError;

    fn encode(&mut self, item: E, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let data = serde_json::to_vec(&item)?;

        if data.len() > MAX_FRAME_SIZE {
            return Err(CodecError::FrameTooLarge {
                size: data.len(),
                max: MAX_FRAME_SIZE,
            });
        }

        dst.reserve(data.len() + 1);
        dst.put_slice(&data);
        dst.put_u8(b'\n');
        Ok(())
    }
}

/// Strip the trailing `\n` / `\r\n` and surrounding whitespace
fn trim_line(line: &[u8]) -> &[u8] {
    let start = line
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(line.len());
    let end = line
        .iter()
        .rposition(|b| !b.is_ascii_whitespace())
        .map(|i| i + 1)
        .unwrap_or(start);
    &line[start..end.max(start)]
}
