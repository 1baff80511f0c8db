use std::fmt;
use std::str::FromStr;

use super::error::IssueLineError;

/// Classification of a recorded [`Issue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IssueKind {
    Warning,
    Problem,
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueKind::Warning => write!(f, "warning"),
            IssueKind::Problem => write!(f, "problem"),
        }
    }
}

/// A single warning or problem recorded during a test run.
///
/// Displays in the export format `[{path}]: {message}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    kind: IssueKind,
    message: String,
    path: String,
}

impl Issue {
    pub fn new(kind: IssueKind, message: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            path: path.into(),
        }
    }

    pub fn warning(message: impl Into<String>, path: impl Into<String>) -> Self {
        Self::new(IssueKind::Warning, message, path)
    }

    pub fn problem(message: impl Into<String>, path: impl Into<String>) -> Self {
        Self::new(IssueKind::Problem, message, path)
    }

    #[must_use]
    pub fn kind(&self) -> IssueKind {
        self.kind
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Navigation path pointing at the offending item.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]: {}", self.path, self.message)
    }
}

/// One line of an issue export read back from text.
///
/// The export format does not carry the issue kind, so only the path and
/// message survive a round trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueLine {
    pub path: String,
    pub message: String,
}

impl FromStr for IssueLine {
    type Err = IssueLineError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let body = line
            .strip_prefix('[')
            .ok_or_else(|| IssueLineError::MissingBracket { line: line.to_owned() })?;
        let (path, message) = body
            .split_once("]: ")
            .ok_or_else(|| IssueLineError::MissingSeparator { line: line.to_owned() })?;
        Ok(Self {
            path: path.to_owned(),
            message: message.to_owned(),
        })
    }
}

impl From<&Issue> for IssueLine {
    fn from(issue: &Issue) -> Self {
        Self {
            path: issue.path.clone(),
            message: issue.message.clone(),
        }
    }
}
