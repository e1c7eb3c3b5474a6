//! Errors raised by the CLI itself, on top of [`specker_model::SpecError`].

use thiserror::Error;

use crate::ExitCodes;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Tag not found: {0}")]
    TagNotFound(String),

    #[error("Release '{0}' has no numeric component to bump")]
    UnbumpableRelease(String),

    #[error("Invalid date '{0}': expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("--output cannot be combined with --in-place")]
    ConflictingOutput,
}

impl CliError {
    pub fn exit_code(&self) -> u8 {
        match self {
            CliError::TagNotFound(_) | CliError::UnbumpableRelease(_) => ExitCodes::GENERAL_ERROR,
            CliError::InvalidDate(_) | CliError::ConflictingOutput => ExitCodes::INVALID_ARGS,
        }
    }
}
