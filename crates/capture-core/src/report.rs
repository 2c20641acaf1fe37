//! Capture reporting: per-halt decode outcomes and final output rendering.
//!
//! One bad word never aborts the pipeline: the offending halt event is
//! reported and omitted while every other event still decodes. The final
//! program output is the concatenation of the decoded lines, bracketed by
//! the literal marker lines the surrounding tooling looks for.

use crate::decode::DecodeError;
use crate::line::{assemble_line, DecodedLine, LineOptions};
use crate::log::HaltEvent;

/// Literal line printed before the decoded program output.
pub const OUTPUT_START_MARKER: &str = "---- PROGRAM OUTPUT ----";

/// Literal line printed after the decoded program output.
pub const OUTPUT_END_MARKER: &str = "---- END PROGRAM OUTPUT ----";

/// Outcome of decoding one halt event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOutcome {
    /// The event decoded cleanly.
    Decoded(DecodedLine),
    /// The event's decode failed; its line is omitted from the output.
    Failed(DecodeError),
}

impl LineOutcome {
    /// The decoded line, if this event decoded cleanly.
    #[must_use]
    pub const fn decoded(&self) -> Option<&DecodedLine> {
        match self {
            Self::Decoded(line) => Some(line),
            Self::Failed(_) => None,
        }
    }
}

/// Decode outcomes for every halt event of one run, in halt order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CaptureReport {
    /// One outcome per halt event.
    pub lines: Vec<LineOutcome>,
}

impl CaptureReport {
    /// Decodes every halt event, isolating failures to their own event.
    #[must_use]
    pub fn from_events(events: &[HaltEvent], options: &LineOptions) -> Self {
        let lines = events
            .iter()
            .enumerate()
            .map(|(index, event)| match assemble_line(event, options) {
                Ok(line) => LineOutcome::Decoded(line),
                Err(error) => {
                    tracing::warn!(halt_event = index, %error, "halt event failed to decode");
                    LineOutcome::Failed(error)
                }
            })
            .collect();
        Self { lines }
    }

    /// The concatenated program output, in halt order. Failed events
    /// contribute nothing.
    #[must_use]
    pub fn output(&self) -> String {
        self.lines
            .iter()
            .filter_map(LineOutcome::decoded)
            .map(|line| line.text.as_str())
            .collect()
    }

    /// Number of halt events whose decode failed.
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.lines
            .iter()
            .filter(|outcome| matches!(outcome, LineOutcome::Failed(_)))
            .count()
    }

    /// The program output bracketed by the literal output markers.
    #[must_use]
    pub fn render(&self) -> String {
        let output = self.output();
        let mut rendered = String::with_capacity(
            OUTPUT_START_MARKER.len() + output.len() + OUTPUT_END_MARKER.len() + 3,
        );
        rendered.push_str(OUTPUT_START_MARKER);
        rendered.push('\n');
        rendered.push_str(&output);
        if !output.is_empty() && !output.ends_with('\n') {
            rendered.push('\n');
        }
        rendered.push_str(OUTPUT_END_MARKER);
        rendered.push('\n');
        rendered
    }
}

/// Recovers the bracketed program output from a full process transcript.
///
/// Returns the lines strictly between the start and end markers, in order.
/// Marker lines themselves are excluded; text before the start marker and
/// after the end marker is ignored.
#[must_use]
pub fn extract_program_output(transcript: &str) -> Vec<String> {
    let mut capturing = false;
    let mut captured = Vec::new();
    for line in transcript.lines() {
        if line.contains(OUTPUT_END_MARKER) {
            capturing = false;
        }
        if capturing {
            captured.push(line.to_string());
        }
        if line.contains(OUTPUT_START_MARKER) {
            capturing = true;
        }
    }
    captured
}
