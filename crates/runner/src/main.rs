//! CLI entry point for the headless `VisUAL` runner binary.

use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process;

use capture_core as _;
use runner::emulator::JarEmulator;
use runner::pipeline::{run_capture, CaptureConfig};
use tracing as _;
use tracing_subscriber::EnvFilter;
#[cfg(test)]
use tempfile as _;

const USAGE_TEXT: &str = "\
Usage: visual-run <assembly-file>

Runs an assembly program under the external VisUAL emulator in headless
mode and prints everything the program wrote to its output buffer.

Options:
  -h, --help  Show this help message

Environment:
  VISUAL_JAR  Path to the emulator jar (default: visual.jar)
  VISUAL_CMD  Launcher command replacing `java -jar <jar>`
  RUST_LOG    Diagnostic log filter (e.g. capture_core=debug)
";

#[derive(Debug, PartialEq, Eq)]
enum ParseResult {
    Run(PathBuf),
    Help,
}

fn parse_args(mut args: impl Iterator<Item = OsString>) -> Result<ParseResult, String> {
    let first = args
        .next()
        .ok_or_else(|| "missing assembly file path".to_string())?;

    if first == "--help" || first == "-h" {
        return Ok(ParseResult::Help);
    }

    if first.to_string_lossy().starts_with('-') {
        return Err(format!("unknown option: {}", first.to_string_lossy()));
    }

    if let Some(extra) = args.next() {
        return Err(format!(
            "unexpected extra argument: {}",
            extra.to_string_lossy()
        ));
    }

    Ok(ParseResult::Run(PathBuf::from(first)))
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
}

fn run(program: &Path) -> i32 {
    if !program.exists() {
        eprintln!("error: file not found: {}", program.display());
        return 1;
    }

    println!("---- RUNNING PROGRAM ----");

    let config = CaptureConfig::default();
    let emulator = JarEmulator::from_env();

    match run_capture(program, &config, &emulator) {
        Ok(report) => {
            print!("{}", report.render());
            0
        }
        Err(error) => {
            eprintln!("error: {error}");
            1
        }
    }
}

fn main() {
    let exit_code = match parse_args(env::args_os().skip(1)) {
        Ok(ParseResult::Help) => {
            println!("{USAGE_TEXT}");
            0
        }
        Ok(ParseResult::Run(program)) => {
            init_tracing();
            run(&program)
        }
        Err(error) => {
            eprintln!("error: {error}");
            eprintln!("{USAGE_TEXT}");
            1
        }
    };

    process::exit(exit_code);
}
