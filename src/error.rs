use thiserror::Error;

use crate::parse::ParseError;
use crate::{CompileError, IssueLineError, RegistryError};

/// Unified error type covering parsing, registration, validation,
/// configuration, issue exports and I/O.
///
/// Returned by convenience methods like
/// [`RuleEngine::load_file()`](crate::RuleEngine::load_file).
#[derive(Debug, Error)]
pub enum RulecheckError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error(transparent)]
    IssueLine(#[from] IssueLineError),

    #[error("config error: {0}")]
    Config(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
