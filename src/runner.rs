//! Subprocess execution.
//!
//! [`crate::fingerprint::Fingerprinter`] only needs "run this program with
//! these arguments in this directory and tell me how it went". Keeping that
//! behind [`CommandRunner`] lets tests swap in a fake compiler.

use std::io;
use std::path::Path;
use std::process::Command;

/// Result of one finished process.
#[derive(Debug, Clone, Default)]
pub struct RunOutput {
    pub success: bool,
    /// `None` when the process was terminated by a signal.
    pub code: Option<i32>,
    /// Standard output followed by standard error. The two streams are
    /// captured separately, so their lines are not interleaved in the order
    /// the process wrote them.
    pub output: Vec<u8>,
}

impl RunOutput {
    pub fn output_lossy(&self) -> String {
        String::from_utf8_lossy(&self.output).to_string()
    }
}

pub trait CommandRunner: Send + Sync {
    /// Run `program` to completion. An `Err` means the process could not be
    /// started at all; a failing exit status is reported through `RunOutput`.
    fn run(&self, program: &str, args: &[String], dir: &Path) -> io::Result<RunOutput>;
}

/// Runs real processes with [`std::process::Command`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

impl CommandRunner for ProcessRunner {
    fn run(&self, program: &str, args: &[String], dir: &Path) -> io::Result<RunOutput> {
        let output = Command::new(program)
            .args(args)
            .current_dir(dir)
            .output()?;

        let mut combined = output.stdout;
        combined.extend_from_slice(&output.stderr);

        Ok(RunOutput {
            success: output.status.success(),
            code: output.status.code(),
            output: combined,
        })
    }
}
