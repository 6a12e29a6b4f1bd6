use std::path::PathBuf;

use thiserror::Error;

use crate::moves::Move;

/// Errors raised while reading an arrangement from its text form.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("board must be at least 1x1, got {width}x{height}")]
    EmptyBoard { width: usize, height: usize },

    #[error("expected {expected} cells for the board, found {found}")]
    WrongLength { expected: usize, found: usize },

    #[error("unknown cell symbol {symbol:?} at index {index}")]
    UnknownSymbol { symbol: char, index: usize },

    #[error("arrangement has no blank")]
    MissingBlank,

    #[error("arrangement has a second blank at index {index}")]
    ExtraBlank { index: usize },

    #[error("label {symbol:?} appears more than once (index {index})")]
    DuplicateLabel { symbol: char, index: usize },

    #[error("a {width}x{height} board has more cells than the label space allows")]
    TooManyCells { width: usize, height: usize },
}

/// Errors from replaying a move string against an arrangement.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MoveError {
    #[error("move {step} ({mv}) from cell {from} leaves the board or enters a wall")]
    InvalidMove { step: usize, mv: Move, from: usize },

    #[error("unknown move symbol {symbol:?} at position {index}")]
    UnknownSymbol { symbol: char, index: usize },
}

/// Errors from the batch problem / reference files.
#[derive(Error, Debug)]
pub enum ProblemError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed header on line {line}: {reason}")]
    Header { line: usize, reason: String },

    #[error("malformed record on line {line}: {reason}")]
    Record { line: usize, reason: String },

    #[error("record on line {line}: {source}")]
    Arrangement {
        line: usize,
        #[source]
        source: ParseError,
    },
}
