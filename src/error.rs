//! Error types shared by the parser, the translator and the file driver.

use std::io;
use std::path::PathBuf;

use snafu::Snafu;

pub type TranslateResult<T> = Result<T, TranslateError>;

/// Why a single command line could not be translated.
#[derive(Debug, Clone, PartialEq, Eq, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum CommandError {
    #[snafu(display("unrecognized command `{word}`"))]
    UnknownCommand { word: String },

    #[snafu(display("malformed operand: {reason}"))]
    MalformedOperand { reason: String },

    #[snafu(display("unsupported operation: {reason}"))]
    Unsupported { reason: String },
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum TranslateError {
    #[snafu(display("{unit}:{line}: {source} in `{text}`"))]
    Command {
        unit: String,
        line: usize,
        text: String,
        source: CommandError,
    },

    #[snafu(display("unable to read {}: {source}", path.display()))]
    ReadSource { path: PathBuf, source: io::Error },

    #[snafu(display("unable to write {}: {source}", path.display()))]
    WriteOutput { path: PathBuf, source: io::Error },

    #[snafu(display("no .vm files found in {}", path.display()))]
    NoSources { path: PathBuf },

    #[snafu(display("cannot derive a unit name from {}", path.display()))]
    UnitName { path: PathBuf },
}

impl TranslateError {
    /// The line-level cause, if this error came from a command.
    pub fn command_error(&self) -> Option<&CommandError> {
        match self {
            TranslateError::Command { source, .. } => Some(source),
            _ => None,
        }
    }
}
