//! Execution-log parsing.
//!
//! The external emulator writes an XML log on halt: any number of `line`
//! elements (one per breakpoint hit), each containing `word` elements (one
//! per watched address, in address order). This module only extracts that
//! structure; hex interpretation belongs to [`crate::decode`].

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Element name marking one breakpoint hit.
const LINE_TAG: &str = "line";

/// Element name marking one watched word's snapshot.
const WORD_TAG: &str = "word";

/// Failure to obtain halt events from an execution log.
///
/// Callers treat this as best-effort: the log is written by an external
/// process and may be missing or mid-write, so a parse failure is reported
/// and yields an empty capture instead of aborting the pipeline.
#[derive(Debug, Error)]
pub enum LogError {
    /// The log file could not be read.
    #[error("cannot read execution log {}: {source}", .path.display())]
    Io {
        /// Path of the log file.
        path: PathBuf,
        /// Underlying read failure.
        #[source]
        source: std::io::Error,
    },
    /// The log file is not well-formed XML.
    #[error("execution log {} is not well-formed XML: {source}", .path.display())]
    Malformed {
        /// Path of the log file.
        path: PathBuf,
        /// Underlying XML parse failure.
        #[source]
        source: roxmltree::Error,
    },
}

/// One watched word's hex snapshot at a halt.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct WordDump {
    /// Raw text content of the `word` element, radix prefix included.
    /// Surrounding whitespace is trimmed; the hex payload is untouched.
    pub raw: String,
}

impl WordDump {
    /// The raw word text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

/// One breakpoint hit and its word dumps in address order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct HaltEvent {
    /// Word dumps in address order.
    pub words: Vec<WordDump>,
}

/// Parses an execution log file into halt events in document order.
///
/// # Errors
///
/// [`LogError::Io`] when the file is missing or unreadable,
/// [`LogError::Malformed`] when it is not well-formed XML.
pub fn parse_log(path: &Path) -> Result<Vec<HaltEvent>, LogError> {
    let xml = fs::read_to_string(path).map_err(|source| LogError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_log_str(&xml).map_err(|source| LogError::Malformed {
        path: path.to_path_buf(),
        source,
    })
}

/// Parses an in-memory execution log body.
///
/// Every `line` element in document order becomes a [`HaltEvent`]; its
/// `word` descendants (direct or nested) contribute [`WordDump`]s in
/// document order.
///
/// # Errors
///
/// Returns the XML parse failure when the body is not well-formed.
pub fn parse_log_str(xml: &str) -> Result<Vec<HaltEvent>, roxmltree::Error> {
    let doc = roxmltree::Document::parse(xml)?;

    let events: Vec<HaltEvent> = doc
        .descendants()
        .filter(|node| node.has_tag_name(LINE_TAG))
        .map(|line| HaltEvent {
            words: line
                .descendants()
                .filter(|node| node.has_tag_name(WORD_TAG))
                .map(|word| WordDump {
                    raw: word.text().unwrap_or("").trim().to_string(),
                })
                .collect(),
        })
        .collect();

    tracing::debug!(halt_events = events.len(), "parsed execution log");
    Ok(events)
}
