//! Output-capture decoding pipeline for headless `VisUAL` emulator runs.

/// Hex word decoding with sentinel/padding/endianness rules.
pub mod decode;
pub use decode::{decode_word, DecodeError, WordDecode};

/// Line assembly from one halt event's word dumps.
pub mod line;
pub use line::{assemble_line, DecodedLine, LineOptions};

/// Execution-log parsing into halt events.
pub mod log;
pub use log::{parse_log, parse_log_str, HaltEvent, LogError, WordDump};

/// Capture planning: watched addresses and breakpoint discovery.
pub mod plan;
pub use plan::{
    plan, scan_for_marker, BreakpointSpec, CapturePlan, OutputBuffer, PlanConfig, PlanError,
    DEFAULT_BREAKPOINT_LINES, DEFAULT_PRINT_MARKER, INSTRUCTION_MEMORY_BYTES, OUTPUT_BUFFER_BYTES,
    WORD_BYTES,
};

/// Per-run decode outcomes and output rendering.
pub mod report;
pub use report::{
    extract_program_output, CaptureReport, LineOutcome, OUTPUT_END_MARKER, OUTPUT_START_MARKER,
};
