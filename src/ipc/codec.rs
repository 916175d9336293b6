//! Newline-delimited JSON codec.
//!
//! Each message is a single JSON document on its own line. A line that is
//! not valid JSON is surfaced as an item-level error so the stream survives
//! and the caller can answer with a parse error.

use bytes::{Buf, BufMut, BytesMut};
use serde::{Serialize, de::DeserializeOwned};
use std::marker::PhantomData;
use tokio_util::codec::{Decoder, Encoder};

/// Decoded frame: the message, or the JSON error for that line
pub type Frame<T> = std::result::Result<T, serde_json::Error>;

/// Newline-delimited JSON codec.
#[derive(Debug)]
pub struct NdJsonCodec<T> {
    _phantom: PhantomData<T>,
    max_length: usize,
}

impl<T> NdJsonCodec<T> {
    /// Create a new codec with default max length (16 MB).
    pub fn new() -> Self {
        Self {
            _phantom: PhantomData,
            max_length: 16 * 1024 * 1024,
        }
    }

    /// Create a new codec with custom max length.
    pub fn with_max_length(max_length: usize) -> Self {
        Self {
            _phantom: PhantomData,
            max_length,
        }
    }

    /// Get the max message length.
    pub fn max_length(&self) -> usize {
        self.max_length
    }
}

impl<T> Default for NdJsonCodec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for NdJsonCodec<T> {
    fn clone(&self) -> Self {
        Self {
            _phantom: PhantomData,
            max_length: self.max_length,
        }
    }
}

impl<T> NdJsonCodec<T> {
    fn too_large(&self, length: usize) -> std::io::Error {
        std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("Message too large: {} > {}", length, self.max_length),
        )
    }
}

impl<T: DeserializeOwned> Decoder for NdJsonCodec<T> {
    type Item = Frame<T>;
    type Error = std::io::Error;

    fn decode(&mut self, src: &mut BytesMut) -> std::result::Result<Option<Self::Item>, Self::Error> {
        loop {
            let Some(pos) = src.iter().position(|&b| b == b'\n') else {
                if src.len() > self.max_length {
                    return Err(self.too_large(src.len()));
                }
                return Ok(None);
            };

            if pos > self.max_length {
                return Err(self.too_large(pos));
            }

            let line = src.split_to(pos);
            src.advance(1);

            let trimmed = line.trim_ascii();
            if trimmed.is_empty() {
                // Blank keep-alive lines carry no message
                continue;
            }

            return Ok(Some(serde_json::from_slice(trimmed)));
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> std::result::Result<Option<Self::Item>, Self::Error> {
        if let Some(frame) = self.decode(src)? {
            return Ok(Some(frame));
        }

        // Final message without trailing newline
        let trimmed = src.trim_ascii();
        if trimmed.is_empty() {
            src.clear();
            return Ok(None);
        }
        let frame = serde_json::from_slice(trimmed);
        src.clear();
        Ok(Some(frame))
    }
}

impl<T: Serialize> Encoder<T> for NdJsonCodec<T> {
    type Error = std::io::Error;

    fn encode(&mut self, item: T, dst: &mut BytesMut) -> std::result::Result<(), Self::Error> {
        // Serialize to JSON (compact, no newlines)
        let json = serde_json::to_vec(&item)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, format!("JSON error: {}", e)))?;

        if json.len() > self.max_length {
            return Err(self.too_large(json.len()));
        }

        dst.reserve(json.len() + 1);
        dst.put_slice(&json);
        dst.put_u8(b'\n');

        Ok(())
    }
}
