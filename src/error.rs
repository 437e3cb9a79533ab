//! Error types for parsing and fingerprinting.
//!
//! Parsing and computing fail independently, so each has its own enum.
//! [`FingerprintError`] wraps both for callers that go from a raw command
//! line straight to a digest (the compilation database driver, the CLI).

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("command line is empty")]
    EmptyInvocation,

    #[error("failed to tokenize command line (unbalanced quotes or trailing escape): {0}")]
    Tokenize(String),

    #[error("unable to determine {} path from command line", missing_label(.input, .output))]
    MissingPath {
        /// True when no `-c <path>` was found.
        input: bool,
        /// True when no `-o <path>` / `/Fo<path>` was found.
        output: bool,
    },
}

fn missing_label(input: &bool, output: &bool) -> &'static str {
    match (*input, *output) {
        (true, true) => "input or output",
        (true, false) => "input",
        _ => "output",
    }
}

#[derive(Error, Debug)]
pub enum ComputeError {
    #[error("failed to launch compiler '{compiler}': {source}")]
    SubprocessStart {
        compiler: String,
        #[source]
        source: io::Error,
    },

    #[error("preprocessing with '{compiler}' failed ({})", exit_label(.code))]
    Preprocess {
        compiler: String,
        /// Exit code, `None` if the process was killed by a signal.
        code: Option<i32>,
        /// Captured stdout followed by stderr.
        output: String,
    },

    #[error("temporary file error: {0}")]
    TempFile(#[source] io::Error),

    #[error("failed to read preprocessed output {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

fn exit_label(code: &Option<i32>) -> String {
    match *code {
        Some(code) => format!("exit code {}", code),
        None => "terminated by signal".to_string(),
    }
}

impl ComputeError {
    /// Captured compiler output, if the compiler got far enough to produce any.
    pub fn compiler_output(&self) -> Option<&str> {
        match self {
            ComputeError::Preprocess { output, .. } => Some(output),
            _ => None,
        }
    }
}

#[derive(Error, Debug)]
pub enum FingerprintError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Compute(#[from] ComputeError),
}
