//! External emulator invocation.
//!
//! The emulator itself is a black box: it receives the program path, the
//! log path, and the capture configuration, runs to completion, and writes
//! the XML execution log. Everything here is glue around spawning it; the
//! [`Emulator`] trait is the seam that lets the pipeline run against a stub
//! in tests.

use std::env;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};

use capture_core::CapturePlan;

/// Environment variable naming the emulator jar.
pub const JAR_ENV: &str = "VISUAL_JAR";

/// Environment variable replacing the whole launcher command. When set, the
/// named program is executed directly with the same arguments the jar would
/// receive; integration tests substitute a stub this way.
pub const CMD_ENV: &str = "VISUAL_CMD";

/// Jar file used when [`JAR_ENV`] is not set.
pub const DEFAULT_JAR: &str = "visual.jar";

/// Suffix appended to the program path to name the execution log.
pub const LOG_SUFFIX: &str = "_log.xml";

/// Logging mode handed to the emulator: dump watched memory on every
/// breakpoint hit.
const LOG_MODE: &str = "breakpoint";

/// Computes the execution log path for a program (`<program>_log.xml`).
#[must_use]
pub fn log_path_for(program: &Path) -> PathBuf {
    let mut name = program.as_os_str().to_os_string();
    name.push(LOG_SUFFIX);
    PathBuf::from(name)
}

/// Seam for launching one external emulator run.
pub trait Emulator {
    /// Runs `program` to completion, writing the execution log to `log`.
    ///
    /// # Errors
    ///
    /// Returns the spawn/wait failure when the external process could not
    /// be launched or waited on.
    fn run(&self, program: &Path, log: &Path, plan: &CapturePlan) -> io::Result<ExitStatus>;
}

/// Launches the `VisUAL` jar in headless breakpoint-logging mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JarEmulator {
    launcher: Launcher,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Launcher {
    /// `java -jar <jar>`.
    Jar(PathBuf),
    /// A direct command substituted via [`CMD_ENV`].
    Command(PathBuf),
}

impl JarEmulator {
    /// Resolves the launcher from the environment: [`CMD_ENV`] wins,
    /// then [`JAR_ENV`], then [`DEFAULT_JAR`] in the working directory.
    #[must_use]
    pub fn from_env() -> Self {
        let launcher = env::var_os(CMD_ENV).map_or_else(
            || {
                let jar = env::var_os(JAR_ENV)
                    .map_or_else(|| PathBuf::from(DEFAULT_JAR), PathBuf::from);
                Launcher::Jar(jar)
            },
            |command| Launcher::Command(PathBuf::from(command)),
        );
        Self { launcher }
    }

    /// An emulator launched as `java -jar <jar>`.
    #[must_use]
    pub const fn with_jar(jar: PathBuf) -> Self {
        Self {
            launcher: Launcher::Jar(jar),
        }
    }

    fn command(&self, program: &Path, log: &Path, plan: &CapturePlan) -> Command {
        let mut command = match &self.launcher {
            Launcher::Jar(jar) => {
                let mut command = Command::new("java");
                command.arg("-jar").arg(jar);
                command
            }
            Launcher::Command(path) => Command::new(path),
        };

        let breakpoints = plan
            .breakpoints
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",");

        command
            .arg(program)
            .arg(log)
            .arg("--mode")
            .arg(LOG_MODE)
            .arg("--breakpoints")
            .arg(breakpoints)
            .arg("--inst-mem-size")
            .arg(plan.buffer.base.to_string())
            .arg("--watch")
            .arg(plan.buffer.watch_addresses().join(","));
        command
    }
}

impl Emulator for JarEmulator {
    fn run(&self, program: &Path, log: &Path, plan: &CapturePlan) -> io::Result<ExitStatus> {
        let mut command = self.command(program, log, plan);
        tracing::debug!(?command, "launching emulator");
        command.status()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use capture_core::OutputBuffer;

    fn plan() -> CapturePlan {
        CapturePlan {
            buffer: OutputBuffer::pinned(),
            breakpoints: vec![12, 13],
        }
    }

    #[test]
    fn log_path_appends_suffix() {
        assert_eq!(
            log_path_for(Path::new("demos/hello.s")),
            PathBuf::from("demos/hello.s_log.xml")
        );
    }

    #[test]
    fn jar_launcher_builds_java_invocation() {
        let emulator = JarEmulator::with_jar(PathBuf::from("visual.jar"));
        let command = emulator.command(Path::new("hello.s"), Path::new("hello.s_log.xml"), &plan());

        assert_eq!(command.get_program(), "java");
        let args: Vec<_> = command
            .get_args()
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect();
        assert_eq!(args[0], "-jar");
        assert_eq!(args[1], "visual.jar");
        assert_eq!(args[2], "hello.s");
        assert_eq!(args[3], "hello.s_log.xml");
        assert!(args.contains(&"--mode".to_string()));
        assert!(args.contains(&"breakpoint".to_string()));
    }

    #[test]
    fn invocation_carries_the_full_capture_plan() {
        let emulator = JarEmulator::with_jar(PathBuf::from("visual.jar"));
        let command = emulator.command(Path::new("hello.s"), Path::new("hello.s_log.xml"), &plan());
        let args: Vec<_> = command
            .get_args()
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect();

        let breakpoints = &args[args.iter().position(|a| a == "--breakpoints").unwrap() + 1];
        assert_eq!(breakpoints, "12,13");

        let mem_size = &args[args.iter().position(|a| a == "--inst-mem-size").unwrap() + 1];
        assert_eq!(mem_size, "65536");

        let watch = &args[args.iter().position(|a| a == "--watch").unwrap() + 1];
        assert!(watch.starts_with("0x10000,0x10004,"));
        assert!(watch.ends_with("0x10FFC"));
        assert_eq!(watch.split(',').count(), 1024);
    }
}
