//! Hexadecimal word decoding with the print buffer's sentinel conventions.
//!
//! Each watched word arrives in the execution log as a variable-width hex
//! string: the emulator strips leading zero nibbles, so a word may have an
//! odd number of digits. The target toolchain's print routine stores a
//! single `0x0A` byte after the last printed character, which surfaces in
//! the log two ways:
//!
//! - a bare `0xA` word when the printed text filled whole words, and
//! - an odd-width word whose most significant nibble is `A` when the final
//!   word is only partially filled.
//!
//! Either form terminates the line. Payload bytes are stored little-endian
//! relative to print order, so every decoded word is byte-reversed before it
//! is appended.

use thiserror::Error;

/// Radix prefix carried by every word dump in the execution log.
const RADIX_PREFIX: &str = "0x";

/// Hex form of the end-of-string sentinel when it occupies a word alone.
const SENTINEL_WORD: &str = "A";

/// Sentinel digit padding the most significant nibble of a partial word.
const SENTINEL_DIGIT: char = 'A';

/// Byte appended to a line when the sentinel is reached.
const LINE_TERMINATOR: u8 = b'\n';

/// A word dump whose payload is not valid hexadecimal.
///
/// Fatal for the halt event the word belongs to; other halt events in the
/// same log still decode.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("word dump {word:?} is not valid hex: {detail}")]
pub struct DecodeError {
    /// The raw word text as it appeared in the log.
    pub word: String,
    /// Which part of the payload was rejected.
    pub detail: String,
}

/// Bytes contributed by one word dump, plus the continue/stop signal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WordDecode {
    /// A full payload word; later words may extend the line.
    Continue(Vec<u8>),
    /// The line ends with these bytes; remaining words must not be decoded.
    Stop(Vec<u8>),
}

impl WordDecode {
    /// The bytes this word contributes to the line.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        match self {
            Self::Continue(bytes) | Self::Stop(bytes) => bytes,
        }
    }

    /// True when no further words of the halt event should be decoded.
    #[must_use]
    pub const fn is_stop(&self) -> bool {
        matches!(self, Self::Stop(_))
    }
}

/// Decodes one hex word dump into the bytes it contributes to a line.
///
/// The sentinel comparison is case-sensitive: the emulator emits uppercase
/// hex, and a lowercase `0xa` is treated as a non-canonical odd-width value.
///
/// # Errors
///
/// Returns [`DecodeError`] when the payload contains a non-hex digit after
/// the radix prefix is stripped.
pub fn decode_word(word: &str) -> Result<WordDecode, DecodeError> {
    let digits = word.strip_prefix(RADIX_PREFIX).unwrap_or(word);

    if digits == SENTINEL_WORD {
        return Ok(WordDecode::Stop(vec![LINE_TERMINATOR]));
    }

    if digits.len() % 2 == 1 {
        if let Some(tail) = digits.strip_prefix(SENTINEL_DIGIT) {
            let mut bytes = decode_reversed(word, tail)?;
            bytes.push(LINE_TERMINATOR);
            return Ok(WordDecode::Stop(bytes));
        }
        // Odd width without sentinel padding never occurs in a well-formed
        // capture; drop the word rather than guessing at its alignment.
        tracing::warn!(word, "odd-width word without sentinel padding; discarded");
        return Ok(WordDecode::Stop(Vec::new()));
    }

    decode_reversed(word, digits).map(WordDecode::Continue)
}

/// Hex-decodes `digits` (even length) and reverses the byte order.
///
/// The buffer stores each word with the first printed character in the
/// highest-order byte; reversal restores print order.
fn decode_reversed(word: &str, digits: &str) -> Result<Vec<u8>, DecodeError> {
    let mut bytes = digits
        .as_bytes()
        .chunks(2)
        .map(|pair| {
            std::str::from_utf8(pair)
                .ok()
                .and_then(|pair| u8::from_str_radix(pair, 16).ok())
                .ok_or_else(|| DecodeError {
                    word: word.to_string(),
                    detail: format!("invalid digit pair {:?}", String::from_utf8_lossy(pair)),
                })
        })
        .collect::<Result<Vec<u8>, DecodeError>>()?;
    bytes.reverse();
    Ok(bytes)
}
