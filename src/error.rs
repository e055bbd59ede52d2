//! Error types for the record parser and the treepath grammar.
//!
//! Game-rule failures (occupied points, self-capture, ko) are not errors:
//! they come back as plain values from the rules engine.

use thiserror::Error;

/// A structurally invalid game record.
///
/// Lines are counted from zero and columns from one, so the first character
/// of a record is at line 0, column 1.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("SGF parse error at line {line}, column {column}, char {ch:?}: {message}")]
pub struct ParseError {
    pub line: usize,
    pub column: usize,
    pub ch: char,
    pub message: String,
}

/// A treepath string that does not follow the path grammar.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreepathError {
    #[error("unexpected token {token:?} in path {path:?}")]
    UnexpectedToken { token: String, path: String },

    #[error("expected a number but found {token:?} in path {path:?}")]
    ExpectedNumber { token: String, path: String },

    #[error("variation multiplier without a variation in path {path:?}")]
    DanglingMultiplier { path: String },

    #[error("path {path:?} expands past {max} steps")]
    TooLong { path: String, max: usize },
}
