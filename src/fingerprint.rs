//! Fingerprints from preprocessed source.
//!
//! The compiler is re-run in preprocess-only mode with its output redirected
//! to a private temporary file, and the SHA-256 of that file becomes the
//! fingerprint. Macro expansion, header inclusion and conditional
//! compilation are all resolved by the compiler itself, so every transitive
//! input that can change the object file changes the digest too, while the
//! object path (which is dropped during parsing) never does.

use crate::dialect::Dialect;
use crate::error::{ComputeError, FingerprintError};
use crate::invocation::{self, CompilerInvocation};
use crate::runner::{CommandRunner, ProcessRunner};
use sha2::{Digest, Sha256};
use std::fmt;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

const TEMP_PREFIX: &str = "ctc-";
const TEMP_SUFFIX: &str = ".i";

/// SHA-256 of one preprocessed translation unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        self.to_string()
    }
}

impl From<[u8; 32]> for Fingerprint {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

/// Computes fingerprints by running the preprocessor through a [`CommandRunner`].
///
/// Holds no mutable state; one instance can serve any number of threads.
#[derive(Debug, Clone, Default)]
pub struct Fingerprinter<R = ProcessRunner> {
    runner: R,
    temp_dir: Option<PathBuf>,
    msvc_compilers: Vec<String>,
}

impl Fingerprinter<ProcessRunner> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<R: CommandRunner> Fingerprinter<R> {
    pub fn with_runner(runner: R) -> Self {
        Self {
            runner,
            temp_dir: None,
            msvc_compilers: Vec::new(),
        }
    }

    /// Put preprocessor output under `dir` instead of the system temp directory.
    pub fn temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = Some(dir.into());
        self
    }

    /// Extra compiler names driven with MSVC flags.
    pub fn msvc_compilers(mut self, names: Vec<String>) -> Self {
        self.msvc_compilers = names;
        self
    }

    pub fn dialect(&self, invocation: &CompilerInvocation) -> Dialect {
        Dialect::detect(invocation.compiler(), &self.msvc_compilers)
    }

    /// Preprocess `invocation` inside `working_directory` and hash the result.
    pub fn compute(
        &self,
        working_directory: &Path,
        invocation: &CompilerInvocation,
    ) -> Result<Fingerprint, ComputeError> {
        // Closed before the compiler runs; removed when `temp` drops.
        let temp = self.create_temp()?;

        let dialect = self.dialect(invocation);
        let mut args = invocation.arguments().to_vec();
        args.extend(dialect.preprocess_args(&temp, invocation.input_path()));

        log::debug!(
            "[{}] {} {} (in {})",
            invocation.input_path(),
            invocation.compiler(),
            args.join(" "),
            working_directory.display()
        );

        let run = self
            .runner
            .run(invocation.compiler(), &args, working_directory)
            .map_err(|source| ComputeError::SubprocessStart {
                compiler: invocation.compiler().to_string(),
                source,
            })?;

        if !run.success {
            return Err(ComputeError::Preprocess {
                compiler: invocation.compiler().to_string(),
                code: run.code,
                output: run.output_lossy(),
            });
        }

        let fingerprint = hash_file(&temp)?;
        temp.close().map_err(ComputeError::TempFile)?;

        log::debug!("[{}] fingerprint {}", invocation.input_path(), fingerprint);
        Ok(fingerprint)
    }

    /// Parse `command_line` and compute its fingerprint in one step.
    pub fn fingerprint_command(
        &self,
        working_directory: &Path,
        command_line: &str,
    ) -> Result<Fingerprint, FingerprintError> {
        let invocation = invocation::parse(command_line)?;
        Ok(self.compute(working_directory, &invocation)?)
    }

    fn create_temp(&self) -> Result<tempfile::TempPath, ComputeError> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(TEMP_PREFIX).suffix(TEMP_SUFFIX);

        let file = match &self.temp_dir {
            Some(dir) => builder.tempfile_in(dir),
            None => builder.tempfile(),
        }
        .map_err(ComputeError::TempFile)?;

        Ok(file.into_temp_path())
    }
}

/// Fingerprint `invocation` with the real compiler and default settings.
pub fn compute(
    working_directory: &Path,
    invocation: &CompilerInvocation,
) -> Result<Fingerprint, ComputeError> {
    Fingerprinter::new().compute(working_directory, invocation)
}

fn hash_file(path: &Path) -> Result<Fingerprint, ComputeError> {
    let read_err = |source: std::io::Error| ComputeError::Read {
        path: path.to_path_buf(),
        source,
    };

    let mut file = fs::File::open(path).map_err(read_err)?;
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 8192];

    loop {
        let n = file.read(&mut buffer).map_err(read_err)?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }

    let mut digest = [0u8; 32];
    digest.copy_from_slice(&hasher.finalize());
    Ok(Fingerprint(digest))
}
