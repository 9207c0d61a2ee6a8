// Input sources for the qlisp REPL binary: a file, a string argument, stdin,
// or the interactive line editor.

use clap::ValueEnum;
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use tracing::debug;

/// Where the program text comes from
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum InputSource {
    /// Line-by-line REPL
    #[default]
    Interactive,
    /// Evaluate the `--string` argument
    String,
    /// Evaluate the `--file` argument
    File,
    /// Evaluate everything read from stdin
    Pipe,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InputConfig {
    pub source: InputSource,
    pub file_path: Option<PathBuf>,
    pub string_content: Option<String>,
}

impl InputConfig {
    pub fn from_file(file_path: PathBuf) -> Self {
        Self {
            source: InputSource::File,
            file_path: Some(file_path),
            string_content: None,
        }
    }

    pub fn from_string(content: String) -> Self {
        Self {
            source: InputSource::String,
            file_path: None,
            string_content: Some(content),
        }
    }

    pub fn from_pipe() -> Self {
        Self {
            source: InputSource::Pipe,
            file_path: None,
            string_content: None,
        }
    }
}

/// Program text together with a name for diagnostics
#[derive(Debug)]
pub struct InputContent {
    pub content: String,
    pub source_name: String,
}

/// Read the whole program for a non-interactive source.
pub fn read_input_content(config: &InputConfig) -> Result<InputContent, InputError> {
    match config.source {
        InputSource::File => {
            let file_path = config
                .file_path
                .as_ref()
                .ok_or(InputError::MissingFileArgument)?;

            let content = fs::read_to_string(file_path).map_err(|error| {
                InputError::FileReadError {
                    path: file_path.clone(),
                    error,
                }
            })?;
            debug!(path = %file_path.display(), bytes = content.len(), "read input file");

            Ok(InputContent {
                content,
                source_name: file_path.to_string_lossy().to_string(),
            })
        }

        InputSource::String => {
            let content = config
                .string_content
                .clone()
                .ok_or(InputError::MissingStringArgument)?;
            debug!(bytes = content.len(), "using string input");

            Ok(InputContent {
                content,
                source_name: "<string>".to_string(),
            })
        }

        InputSource::Pipe => {
            let content = read_from(io::stdin().lock())?;
            debug!(bytes = content.len(), "read stdin");

            Ok(InputContent {
                content,
                source_name: "<stdin>".to_string(),
            })
        }

        InputSource::Interactive => Err(InputError::InteractiveNotSupported),
    }
}

fn read_from(mut reader: impl Read) -> Result<String, InputError> {
    let mut content = String::new();
    reader
        .read_to_string(&mut content)
        .map_err(InputError::StdinReadError)?;
    Ok(content)
}

/// Check that the argument a source needs was supplied.
pub fn validate_input_args(
    source: InputSource,
    file_path: &Option<PathBuf>,
    string_content: &Option<String>,
) -> Result<(), InputError> {
    match source {
        InputSource::File if file_path.is_none() => Err(InputError::MissingFileArgument),
        InputSource::String if string_content.is_none() => {
            Err(InputError::MissingStringArgument)
        }
        _ => Ok(()),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("--file argument required when using --input file")]
    MissingFileArgument,

    #[error("--string argument required when using --input string")]
    MissingStringArgument,

    #[error("error reading file '{}': {error}", path.display())]
    FileReadError {
        path: PathBuf,
        #[source]
        error: io::Error,
    },

    #[error("error reading from stdin: {0}")]
    StdinReadError(#[source] io::Error),

    #[error("interactive mode has no program text to read")]
    InteractiveNotSupported,
}
