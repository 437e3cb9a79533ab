//! JSON compilation database (`compile_commands.json`) support.
//!
//! CMake, Meson, Bear and most other generators can dump the exact command
//! line for every translation unit in this format, which makes it the natural
//! batch input for fingerprinting. Each entry carries either a `command`
//! string or a pre-split `arguments` array.

use crate::error::{FingerprintError, ParseError};
use crate::fingerprint::{Fingerprint, Fingerprinter};
use crate::invocation::{self, CompilerInvocation};
use crate::runner::CommandRunner;
use anyhow::{Context, Result};
use rayon::prelude::*;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_DATABASE: &str = "compile_commands.json";

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct CompileCommand {
    pub directory: PathBuf,
    pub file: String,
    #[serde(default)]
    pub command: Option<String>,
    #[serde(default)]
    pub arguments: Option<Vec<String>>,
    #[serde(default)]
    pub output: Option<String>,
}

impl CompileCommand {
    pub fn invocation(&self) -> Result<CompilerInvocation, ParseError> {
        if let Some(arguments) = &self.arguments {
            return CompilerInvocation::from_words(arguments.iter().cloned());
        }
        match &self.command {
            Some(command) => invocation::parse(command),
            None => Err(ParseError::EmptyInvocation),
        }
    }
}

/// Read a database. Relative `directory` entries are resolved against the
/// directory holding the database file.
pub fn load(path: &Path) -> Result<Vec<CompileCommand>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let mut entries: Vec<CompileCommand> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {} - expected a JSON array", path.display()))?;

    let base = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    for entry in &mut entries {
        if entry.directory.is_relative() {
            entry.directory = base.join(&entry.directory);
        }
    }

    Ok(entries)
}

/// Fingerprint every entry in parallel. Results are in entry order and
/// independent: one failure never affects the others.
pub fn fingerprint_all<R: CommandRunner>(
    fingerprinter: &Fingerprinter<R>,
    entries: &[CompileCommand],
) -> Vec<Result<Fingerprint, FingerprintError>> {
    fingerprint_all_with(fingerprinter, entries, |_| {})
}

/// Like [`fingerprint_all`], calling `on_done` as each entry finishes.
pub fn fingerprint_all_with<R, F>(
    fingerprinter: &Fingerprinter<R>,
    entries: &[CompileCommand],
    on_done: F,
) -> Vec<Result<Fingerprint, FingerprintError>>
where
    R: CommandRunner,
    F: Fn(&CompileCommand) + Sync + Send,
{
    entries
        .par_iter()
        .map(|entry| {
            let result = match entry.invocation() {
                Ok(inv) => fingerprinter
                    .compute(&entry.directory, &inv)
                    .map_err(FingerprintError::from),
                Err(e) => Err(e.into()),
            };
            on_done(entry);
            result
        })
        .collect()
}
