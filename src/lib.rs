//! # ctc - Compiler Invocation Fingerprints
//!
//! ctc computes a content-based cache key for a single C/C++ compile action.
//! It parses the command line a build system would run, re-runs the same
//! compiler in preprocess-only mode, and hashes the preprocessed output.
//! The key follows every header and macro the translation unit depends on,
//! and ignores where the object file is written.
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::path::Path;
//!
//! let invocation = ctc::invocation::parse("cc -DNDEBUG -c src/main.c -o build/main.o")?;
//! let fingerprint = ctc::fingerprint::compute(Path::new("."), &invocation)?;
//! println!("{}", fingerprint);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Module Organization
//!
//! - [`invocation`] - Command line parsing (`-c`, `-o`, `/Fo`, `-c --`)
//! - [`fingerprint`] - Preprocess-and-hash
//! - [`compdb`] - Batch fingerprinting of `compile_commands.json`

/// Compilation database loading and batch fingerprinting.
pub mod compdb;

/// Configuration file parsing (`ctc.toml`).
pub mod config;

/// GNU vs MSVC argument dialects.
pub mod dialect;

/// Error types.
pub mod error;

/// Hints for failed preprocessor runs.
pub mod feedback;

/// Preprocess-and-hash fingerprint computation.
pub mod fingerprint;

/// Compiler command line parsing.
pub mod invocation;

/// Subprocess execution seam.
pub mod runner;

/// Terminal UI utilities (tables).
pub mod ui;

pub use error::{ComputeError, FingerprintError, ParseError};
pub use fingerprint::{Fingerprint, Fingerprinter, compute};
pub use invocation::{CompilerInvocation, parse};
