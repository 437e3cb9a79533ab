//! Compiler command line parsing.
//!
//! Turns the literal command line a build system runs for one translation
//! unit into a [`CompilerInvocation`]: the compiler, the source file, the
//! object file, and every other flag in its original order.
//!
//! Recognized path flags:
//!
//! - `-c <src>` and the CMake-on-Windows form `-c -- <src>`
//! - `-o <obj>`
//! - `/Fo <obj>` and `/Fo<obj>` (MSVC, clang-cl)

use crate::error::ParseError;
use serde::Serialize;

/// One parsed compile action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompilerInvocation {
    compiler: String,
    arguments: Vec<String>,
    input_path: String,
    output_path: String,
}

/// Split a command line with POSIX shell quoting and parse it.
pub fn parse(command_line: &str) -> Result<CompilerInvocation, ParseError> {
    let words = shlex::split(command_line)
        .ok_or_else(|| ParseError::Tokenize(command_line.to_string()))?;
    CompilerInvocation::from_words(words)
}

impl CompilerInvocation {
    /// Parse an already tokenized command line (compiler first).
    pub fn from_words<I, S>(words: I) -> Result<Self, ParseError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let words: Vec<String> = words.into_iter().map(Into::into).collect();
        let Some((compiler, rest)) = words.split_first() else {
            return Err(ParseError::EmptyInvocation);
        };

        let mut arguments = Vec::with_capacity(rest.len());
        let mut input_path: Option<&str> = None;
        let mut output_path: Option<&str> = None;

        let mut i = 0;
        while i < rest.len() {
            let word = rest[i].as_str();
            let next = rest.get(i + 1).map(String::as_str);

            if word == "-c"
                && input_path.is_none()
                && let Some(next) = next
            {
                // CMake on Windows separates the source from -c with "--"
                match rest.get(i + 2) {
                    Some(after) if next == "--" => {
                        input_path = Some(after.as_str());
                        i += 3;
                    }
                    _ => {
                        input_path = Some(next);
                        i += 2;
                    }
                }
                continue;
            }

            if (word == "-o" || word == "/Fo")
                && output_path.is_none()
                && let Some(next) = next
            {
                output_path = Some(next);
                i += 2;
                continue;
            }

            if let Some(path) = word.strip_prefix("/Fo")
                && !path.is_empty()
                && output_path.is_none()
            {
                output_path = Some(path);
                i += 1;
                continue;
            }

            let repeated = (word == "-c" && input_path.is_some())
                || ((word == "-o" || word.starts_with("/Fo")) && output_path.is_some());
            if repeated {
                log::warn!(
                    "ignoring repeated '{}' in command for {}; forwarding it as a plain argument",
                    word,
                    compiler
                );
            }
            arguments.push(word.to_string());
            i += 1;
        }

        match (input_path, output_path) {
            (Some(input), Some(output)) if !input.is_empty() && !output.is_empty() => Ok(Self {
                compiler: compiler.clone(),
                arguments,
                input_path: input.to_string(),
                output_path: output.to_string(),
            }),
            (input, output) => Err(ParseError::MissingPath {
                input: input.is_none_or(str::is_empty),
                output: output.is_none_or(str::is_empty),
            }),
        }
    }

    /// Compiler executable, exactly as written on the command line.
    pub fn compiler(&self) -> &str {
        &self.compiler
    }

    /// Every flag except the compiler and the captured source/object paths.
    pub fn arguments(&self) -> &[String] {
        &self.arguments
    }

    pub fn input_path(&self) -> &str {
        &self.input_path
    }

    pub fn output_path(&self) -> &str {
        &self.output_path
    }
}
