use serde::Serialize;
use std::path::Path;

/// Compiler driver argument dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Dialect {
    /// GCC, Clang and anything else that takes `-E -o`
    Gnu,
    /// cl.exe and clang-cl (`/P /Fi`)
    Msvc,
}

impl Dialect {
    /// Pick the dialect from the compiler name on the command line.
    ///
    /// `extra_msvc` lists additional executable names (without `.exe`) that
    /// should be driven with MSVC flags, e.g. a wrapper script around cl.
    pub fn detect(compiler: &str, extra_msvc: &[String]) -> Self {
        let stem = executable_stem(compiler);

        if stem == "cl" || stem.contains("clang-cl") {
            return Dialect::Msvc;
        }
        if extra_msvc.iter().any(|name| name.eq_ignore_ascii_case(&stem)) {
            return Dialect::Msvc;
        }
        Dialect::Gnu
    }

    /// Flags appended after the invocation's own arguments to preprocess
    /// `input` into `temp`, keeping comments.
    pub fn preprocess_args(&self, temp: &Path, input: &str) -> Vec<String> {
        let temp = temp.to_string_lossy();
        match self {
            Dialect::Msvc => vec![
                "/P".to_string(),
                "/C".to_string(),
                format!("/Fi{}", temp),
                input.to_string(),
            ],
            Dialect::Gnu => vec![
                "-E".to_string(),
                "-C".to_string(),
                "-o".to_string(),
                temp.to_string(),
                input.to_string(),
            ],
        }
    }
}

/// Lowercased file name without directory or `.exe`.
///
/// Splits on both separators so Windows paths are recognized on any host.
fn executable_stem(compiler: &str) -> String {
    let name = compiler
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(compiler)
        .to_lowercase();
    match name.strip_suffix(".exe") {
        Some(stem) => stem.to_string(),
        None => name,
    }
}
