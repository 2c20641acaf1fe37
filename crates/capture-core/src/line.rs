//! Line assembly: one halt event's word dumps into decoded text.
//!
//! Words are decoded in address order and their bytes accumulated until a
//! word signals stop or the dumps run out. The accumulated bytes are
//! interpreted as UTF-8, lossily; the capture is 8-bit clean but the
//! emulator never validates what the program printed.

use crate::decode::{decode_word, DecodeError};
use crate::log::HaltEvent;

/// Behavior switches for line assembly.
///
/// Target programs disagree on two print conventions, so both are
/// configuration rather than hard-coded behavior. The defaults stop at a
/// zero byte and apply no character reversal.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct LineOptions {
    /// Truncate the line at the first decoded `0x00` payload byte and stop
    /// decoding further words. Guards against zero-filled buffer tail words
    /// when the terminator sentinel was overwritten.
    pub stop_at_nul: bool,
    /// Reverse the character order of the decoded text, keeping a trailing
    /// newline in place. Corrects for target programs that print their
    /// characters back-to-front.
    pub reverse_chars: bool,
}

impl Default for LineOptions {
    fn default() -> Self {
        Self {
            stop_at_nul: true,
            reverse_chars: false,
        }
    }
}

/// Text reconstructed from one halt event.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct DecodedLine {
    /// The decoded text, terminator newline included when one was reached.
    pub text: String,
}

impl std::fmt::Display for DecodedLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}

/// Assembles one halt event's word dumps into a decoded line.
///
/// # Errors
///
/// Propagates the first [`DecodeError`] hit in the event's words; the
/// caller isolates the failure to this halt event and keeps decoding
/// the rest of the log.
pub fn assemble_line(event: &HaltEvent, options: &LineOptions) -> Result<DecodedLine, DecodeError> {
    let mut bytes = Vec::new();

    for word in &event.words {
        let decoded = decode_word(word.as_str())?;
        let mut hit_nul = false;
        for &byte in decoded.bytes() {
            if options.stop_at_nul && byte == 0x00 {
                hit_nul = true;
                break;
            }
            bytes.push(byte);
        }
        if hit_nul || decoded.is_stop() {
            break;
        }
    }

    let mut text = String::from_utf8_lossy(&bytes).into_owned();
    if options.reverse_chars {
        text = reverse_preserving_newline(&text);
    }
    Ok(DecodedLine { text })
}

/// Reverses character order, leaving a trailing newline at the end.
fn reverse_preserving_newline(text: &str) -> String {
    text.strip_suffix('\n').map_or_else(
        || text.chars().rev().collect(),
        |body| {
            let mut reversed: String = body.chars().rev().collect();
            reversed.push('\n');
            reversed
        },
    )
}
