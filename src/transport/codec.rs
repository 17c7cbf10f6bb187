//! Line codec for console streams.
//!
//! Inbound bytes are split on `\n` with any trailing `\r` removed and decoded
//! lossily as UTF-8, since console output is not guaranteed to be valid
//! UTF-8. Consoles print their prompt without a newline. The decoder holds
//! such a fragment like any partial line, and the reader releases it with
//! [`ConsoleCodec::take_prompt`] once the console has gone quiet.
//!
//! Lines longer than the configured limit are discarded up to the next
//! newline rather than buffered without bound.

use bytes::{Buf, BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::control::lifecycle::PROMPT_MARKER;
use crate::error::HeadlessError;
use crate::types::options::DEFAULT_MAX_LINE_LENGTH;

/// Newline-delimited text codec for the headless console
#[derive(Debug)]
pub struct ConsoleCodec {
    max_length: usize,
    /// Bytes of the buffer already searched for a newline
    next_index: usize,
    discarding: bool,
}

impl ConsoleCodec {
    /// Create a codec with the default line limit
    #[must_use]
    pub fn new() -> Self {
        Self::with_max_length(DEFAULT_MAX_LINE_LENGTH)
    }

    /// Create a codec that discards lines longer than `max_length` bytes
    #[must_use]
    pub fn with_max_length(max_length: usize) -> Self {
        Self {
            max_length,
            next_index: 0,
            discarding: false,
        }
    }

    /// Configured maximum line length
    #[must_use]
    pub fn max_length(&self) -> usize {
        self.max_length
    }

    /// Release a buffered fragment that ends in the prompt marker
    ///
    /// Returns `None` and leaves `src` untouched unless everything buffered
    /// since the last newline ends in `>` (ignoring trailing whitespace).
    /// Only call this once no more bytes are expected soon: a response can
    /// arrive split right after a `>`.
    pub fn take_prompt(&mut self, src: &mut BytesMut) -> Option<String> {
        if self.discarding || !ends_with_prompt(src) {
            return None;
        }
        self.next_index = 0;
        let raw = src.split();
        Some(decode_line(&raw))
    }
}

impl Default for ConsoleCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for ConsoleCodec {
    type Item = String;
    type Error = HeadlessError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<String>, HeadlessError> {
        loop {
            let start = self.next_index.min(src.len());
            let newline = src[start..]
                .iter()
                .position(|b| *b == b'\n')
                .map(|offset| start + offset);

            if self.discarding {
                self.next_index = 0;
                match newline {
                    Some(pos) => {
                        src.advance(pos + 1);
                        self.discarding = false;
                        continue;
                    }
                    None => {
                        src.clear();
                        return Ok(None);
                    }
                }
            }

            return match newline {
                Some(pos) if pos > self.max_length => {
                    log::warn!(
                        "Discarding console line of {pos} bytes (limit {})",
                        self.max_length
                    );
                    self.next_index = 0;
                    src.advance(pos + 1);
                    continue;
                }
                Some(pos) => {
                    self.next_index = 0;
                    let raw = src.split_to(pos + 1);
                    Ok(Some(decode_line(&raw)))
                }
                None if src.len() > self.max_length => {
                    log::warn!(
                        "Discarding console output longer than {} bytes",
                        self.max_length
                    );
                    self.next_index = 0;
                    src.clear();
                    self.discarding = true;
                    Ok(None)
                }
                None => {
                    self.next_index = src.len();
                    Ok(None)
                }
            };
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<String>, HeadlessError> {
        if let Some(line) = self.decode(src)? {
            return Ok(Some(line));
        }
        self.next_index = 0;
        if src.is_empty() || self.discarding {
            src.clear();
            return Ok(None);
        }
        let raw = src.split();
        Ok(Some(decode_line(&raw)))
    }
}

impl Encoder<&str> for ConsoleCodec {
    type Error = HeadlessError;

    fn encode(&mut self, line: &str, dst: &mut BytesMut) -> Result<(), HeadlessError> {
        dst.reserve(line.len() + 1);
        dst.put_slice(line.as_bytes());
        dst.put_u8(b'\n');
        Ok(())
    }
}

fn ends_with_prompt(buf: &[u8]) -> bool {
    buf.iter().rev().find(|b| !b.is_ascii_whitespace()) == Some(&(PROMPT_MARKER as u8))
}

fn decode_line(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw)
        .trim_end_matches(['\r', '\n'])
        .to_string()
}
