//! Capture planning: which memory to watch and where to halt.
//!
//! The output buffer is pinned immediately after instruction memory, so the
//! watched address range is fixed. Breakpoints are either a static list of
//! source-line indices or discovered by scanning the program source for the
//! print loop's store-byte instruction. Both paths produce an immutable
//! [`CapturePlan`] before the run starts; nothing here mutates global state.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Instruction memory size in bytes. The output buffer starts right after,
/// so it can never overlap code.
pub const INSTRUCTION_MEMORY_BYTES: u32 = 0x10000;

/// Output buffer size in bytes.
pub const OUTPUT_BUFFER_BYTES: u32 = 0x1000;

/// Bytes per watched word.
pub const WORD_BYTES: u32 = 4;

/// Store-byte instruction the toolchain's print loop emits, spacing as
/// generated. Lines containing this exact substring become breakpoints in
/// marker-scan mode.
pub const DEFAULT_PRINT_MARKER: &str = "STRB    R2, [R1], #1";

/// Static halt lines (0-based) of the toolchain prologue's print routine.
pub const DEFAULT_BREAKPOINT_LINES: [usize; 2] = [12, 13];

/// Failure to configure a capture run.
///
/// Fatal: without a breakpoint set the run cannot be configured at all.
#[derive(Debug, Error)]
pub enum PlanError {
    /// The program source could not be read for the marker scan.
    #[error("cannot read program source {}: {source}", .path.display())]
    Io {
        /// Path of the program source.
        path: PathBuf,
        /// Underlying read failure.
        #[source]
        source: std::io::Error,
    },
}

/// The fixed word-aligned memory region the program prints into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct OutputBuffer {
    /// Base address; always equal to the instruction memory size.
    pub base: u32,
    /// Size in bytes.
    pub size: u32,
}

impl OutputBuffer {
    /// The buffer at its pinned location after instruction memory.
    #[must_use]
    pub const fn pinned() -> Self {
        Self {
            base: INSTRUCTION_MEMORY_BYTES,
            size: OUTPUT_BUFFER_BYTES,
        }
    }

    /// Number of watched words in the buffer.
    #[must_use]
    pub const fn word_count(self) -> u32 {
        self.size / WORD_BYTES
    }

    /// Every watched word address, formatted the way the emulator expects
    /// (`0x<ADDR>`, uppercase hex), in ascending address order.
    #[must_use]
    pub fn watch_addresses(self) -> Vec<String> {
        (0..self.word_count())
            .map(|word| format!("0x{:X}", self.base + word * WORD_BYTES))
            .collect()
    }
}

impl Default for OutputBuffer {
    fn default() -> Self {
        Self::pinned()
    }
}

/// How the breakpoint set is obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum BreakpointSpec {
    /// A caller-supplied list of 0-based source-line indices, used when the
    /// target program's halt points are known in advance.
    Static(Vec<usize>),
    /// Scan the program source for an exact marker substring and halt on
    /// every line containing it.
    MarkerScan {
        /// The substring to look for.
        marker: String,
    },
}

impl BreakpointSpec {
    /// Marker scan with the default print-loop marker.
    #[must_use]
    pub fn default_marker_scan() -> Self {
        Self::MarkerScan {
            marker: DEFAULT_PRINT_MARKER.to_string(),
        }
    }
}

impl Default for BreakpointSpec {
    fn default() -> Self {
        Self::Static(DEFAULT_BREAKPOINT_LINES.to_vec())
    }
}

/// Configuration input to [`plan`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct PlanConfig {
    /// How to obtain the breakpoint set.
    pub breakpoints: BreakpointSpec,
}

/// Immutable description of one capture run, handed read-only to the
/// emulator before the run starts.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct CapturePlan {
    /// The watched memory region.
    pub buffer: OutputBuffer,
    /// 0-based source-line indices to halt at, in source order.
    pub breakpoints: Vec<usize>,
}

/// Computes the capture plan for a program.
///
/// The source file is only read in marker-scan mode; a static breakpoint
/// list needs no file access.
///
/// # Errors
///
/// [`PlanError::Io`] when the program source cannot be read for a marker
/// scan.
pub fn plan(program: &Path, config: &PlanConfig) -> Result<CapturePlan, PlanError> {
    let breakpoints = match &config.breakpoints {
        BreakpointSpec::Static(lines) => lines.clone(),
        BreakpointSpec::MarkerScan { marker } => {
            let source = fs::read_to_string(program).map_err(|source| PlanError::Io {
                path: program.to_path_buf(),
                source,
            })?;
            scan_for_marker(&source, marker)
        }
    };

    tracing::debug!(?breakpoints, "capture plan computed");
    Ok(CapturePlan {
        buffer: OutputBuffer::pinned(),
        breakpoints,
    })
}

/// Collects the 0-based index of every source line containing `marker`,
/// in source order.
///
/// Zero matches is a valid degenerate outcome: the run halts nowhere and
/// captures nothing.
#[must_use]
pub fn scan_for_marker(source: &str, marker: &str) -> Vec<usize> {
    source
        .lines()
        .enumerate()
        .filter(|(_, line)| line.contains(marker))
        .map(|(index, _)| index)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_is_pinned_after_instruction_memory() {
        let buffer = OutputBuffer::pinned();
        assert_eq!(buffer.base, 0x10000);
        assert_eq!(buffer.size, 0x1000);
        assert_eq!(buffer.word_count(), 1024);
    }

    #[test]
    fn watch_addresses_cover_the_buffer_word_by_word() {
        let addresses = OutputBuffer::pinned().watch_addresses();
        assert_eq!(addresses.len(), 1024);
        assert_eq!(addresses[0], "0x10000");
        assert_eq!(addresses[1], "0x10004");
        assert_eq!(addresses[1023], "0x10FFC");
    }

    #[test]
    fn marker_scan_records_matching_lines_in_order() {
        let source = "\
MOV R0, #0
MOV R1, #1
        STRB    R2, [R1], #1
MOV R2, #2
B loop
NOP
        STRB    R2, [R1], #1 ; store one byte
";
        let lines = scan_for_marker(source, DEFAULT_PRINT_MARKER);
        assert_eq!(lines, [2, 6]);
    }

    #[test]
    fn marker_scan_without_matches_is_empty() {
        let lines = scan_for_marker("MOV R0, #0\nB loop\n", DEFAULT_PRINT_MARKER);
        assert!(lines.is_empty());
    }

    #[test]
    fn static_spec_needs_no_file() {
        let config = PlanConfig {
            breakpoints: BreakpointSpec::Static(vec![4, 9]),
        };
        let plan =
            plan(Path::new("/nonexistent/program.s"), &config).expect("no file access needed");
        assert_eq!(plan.breakpoints, [4, 9]);
        assert_eq!(plan.buffer, OutputBuffer::pinned());
    }

    #[test]
    fn marker_scan_on_missing_file_is_fatal() {
        let config = PlanConfig {
            breakpoints: BreakpointSpec::default_marker_scan(),
        };
        let err = plan(Path::new("/nonexistent/program.s"), &config).expect_err("missing source");
        assert!(matches!(err, PlanError::Io { .. }));
    }

    #[test]
    fn default_spec_is_the_static_prologue_lines() {
        assert_eq!(
            BreakpointSpec::default(),
            BreakpointSpec::Static(vec![12, 13])
        );
    }
}
