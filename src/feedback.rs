use crate::error::ComputeError;
use colored::*;
use regex::Regex;
use std::io;
use std::sync::LazyLock;

static MISSING_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?:fatal error: (\S+): No such file or directory|'([^']+)' file not found|Cannot open include file: '([^']+)')",
    )
    .expect("valid regex")
});

/// Turns a failed preprocessor run into a short hint for the user.
pub struct PreprocessFeedback;

impl PreprocessFeedback {
    pub fn analyze(output: &str) -> Option<String> {
        // 1. Missing header
        if let Some(caps) = MISSING_HEADER.captures(output) {
            let header = caps
                .iter()
                .skip(1)
                .flatten()
                .next()
                .map(|m| m.as_str())
                .unwrap_or("a header");
            return Some(format!(
                "The preprocessor could not find {}.\nCheck that the {} flags in the command line match the build's working directory.",
                header.bold().yellow(),
                "-I".bold().green()
            ));
        }

        // 2. Flag the compiler does not understand
        if output.contains("unknown argument")
            || output.contains("unrecognized command-line option")
            || output.contains("unrecognized command line option")
            || output.contains("D8021")
        {
            return Some(format!(
                "The compiler rejected a flag.\nThe command line may belong to a different compiler than {}.",
                "the one it names".bold().yellow()
            ));
        }

        // 3. #error hit during preprocessing
        if output.contains("#error") || output.contains("fatal error C1189") {
            return Some(format!(
                "An {} directive fired.\nSome required {} is probably missing from the command line.",
                "#error".bold().red(),
                "-D define".bold().yellow()
            ));
        }

        None
    }

    /// Hint for any fingerprinting failure, including ones without compiler output.
    pub fn for_error(err: &ComputeError) -> Option<String> {
        match err {
            ComputeError::SubprocessStart { compiler, source }
                if source.kind() == io::ErrorKind::NotFound =>
            {
                Some(format!(
                    "Compiler {} was not found.\nUse an absolute path or make sure it is on PATH.",
                    compiler.bold().yellow()
                ))
            }
            ComputeError::Preprocess { output, .. } => Self::analyze(output),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gcc_missing_header() {
        let out = "a.c:1:10: fatal error: foo/bar.h: No such file or directory\ncompilation terminated.";
        let msg = PreprocessFeedback::analyze(out).unwrap();
        assert!(msg.contains("foo/bar.h"));
    }

    #[test]
    fn test_clang_missing_header() {
        let out = "a.c:1:10: fatal error: 'zlib.h' file not found";
        let msg = PreprocessFeedback::analyze(out).unwrap();
        assert!(msg.contains("zlib.h"));
    }

    #[test]
    fn test_msvc_missing_header() {
        let out = "a.cpp(1): fatal error C1083: Cannot open include file: 'windows.h': No such file or directory";
        let msg = PreprocessFeedback::analyze(out).unwrap();
        assert!(msg.contains("windows.h"));
    }

    #[test]
    fn test_unknown_flag() {
        let out = "clang: error: unknown argument: '-fno-such-thing'";
        let msg = PreprocessFeedback::analyze(out).unwrap();
        assert!(msg.contains("rejected a flag"));
    }

    #[test]
    fn test_error_directive() {
        let out = "a.c:3:2: error: #error \"CONFIG_H must be defined\"";
        let msg = PreprocessFeedback::analyze(out).unwrap();
        assert!(msg.contains("directive fired"));
    }

    #[test]
    fn test_no_hint_for_unrelated_output() {
        assert!(PreprocessFeedback::analyze("internal compiler error: Segmentation fault").is_none());
    }

    #[test]
    fn test_hint_for_missing_compiler() {
        let err = ComputeError::SubprocessStart {
            compiler: "clang-99".to_string(),
            source: io::Error::new(io::ErrorKind::NotFound, "not found"),
        };
        let msg = PreprocessFeedback::for_error(&err).unwrap();
        assert!(msg.contains("clang-99"));
    }
}
