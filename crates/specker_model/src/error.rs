//! Error types for the spec model.

use std::path::PathBuf;
use thiserror::Error;

use crate::section::SectionKind;

/// Result type alias for spec model operations.
pub type SpecResult<T> = Result<T, SpecError>;

/// Errors that can occur while reading, mutating or rendering a spec model.
///
/// Absence of a tag or section is not an error; queries return `Option`.
#[derive(Error, Debug)]
pub enum SpecError {
    #[error("Malformed input at line {line}: {message}")]
    MalformedInput { line: usize, message: String },

    #[error("Section index {index} out of range (model has {len} sections)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Invalid {kind} section at index {index}: {message}")]
    InvalidSectionState {
        index: usize,
        kind: SectionKind,
        message: String,
    },

    #[error("No spec model available to render")]
    NoModel,

    #[error("Model reader is already borrowed for writing")]
    ReaderBusy,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration in {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl SpecError {
    pub(crate) fn invalid_section(
        index: usize,
        kind: SectionKind,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidSectionState {
            index,
            kind,
            message: message.into(),
        }
    }
}
