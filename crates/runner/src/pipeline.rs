//! Run-then-decode sequencing for one capture run.
//!
//! Ordering is the whole point here: the XML log is written by the external
//! emulator process, so decoding must not start until that process has
//! returned. The decode step is an explicit on-completion finalizer invoked
//! exactly once after the run, even when the run itself failed: the emulator
//! may still have flushed a usable log before exiting. Log-read failures
//! degrade to an empty report; only a planning failure is fatal.

use std::path::Path;

use capture_core::{parse_log, plan, CaptureReport, LineOptions, PlanConfig, PlanError};

use crate::emulator::{log_path_for, Emulator};

/// Configuration for one capture run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CaptureConfig {
    /// How to compute the capture plan.
    pub plan: PlanConfig,
    /// How to assemble decoded lines.
    pub line_options: LineOptions,
}

/// Plans the capture, runs the emulator to completion, then decodes the log.
///
/// # Errors
///
/// [`PlanError`] when the breakpoint scan fails: without a plan the run
/// cannot be configured. Emulator and log failures are reported via
/// `tracing` and degrade to an empty report.
pub fn run_capture(
    program: &Path,
    config: &CaptureConfig,
    emulator: &dyn Emulator,
) -> Result<CaptureReport, PlanError> {
    let capture_plan = plan(program, &config.plan)?;
    let log = log_path_for(program);

    match emulator.run(program, &log, &capture_plan) {
        Ok(status) if status.success() => {}
        Ok(status) => {
            tracing::warn!(%status, "emulator exited with failure; decoding log anyway");
        }
        Err(error) => {
            tracing::warn!(%error, "emulator could not be launched; decoding log anyway");
        }
    }

    Ok(finalize(&log, &config.line_options))
}

/// The on-completion finalizer: reads and decodes the execution log.
///
/// The log may be missing or truncated when the run failed; that must not
/// crash the process.
fn finalize(log: &Path, options: &LineOptions) -> CaptureReport {
    match parse_log(log) {
        Ok(events) => CaptureReport::from_events(&events, options),
        Err(error) => {
            tracing::warn!(%error, "execution log unusable; reporting empty capture");
            CaptureReport::default()
        }
    }
}
