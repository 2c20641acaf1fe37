//! Headless `VisUAL` runner library.

// Initialized by the binary entry point only.
use tracing_subscriber as _;

/// External emulator invocation glue.
pub mod emulator;
/// Run-then-decode sequencing.
pub mod pipeline;
