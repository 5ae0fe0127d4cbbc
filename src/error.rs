//! Error taxonomy.
//!
//! Mirrors the layered-enum-plus-top-level-wrapper shape used throughout the
//! format: small per-concern `thiserror` enums, rolled up into one top-level
//! error via `#[from]`.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("index store at {path} is unavailable: {reason}")]
    Unavailable { path: PathBuf, reason: String },
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

#[derive(Error, Debug)]
pub enum IndexerError {
    #[error("{path}: line {line} has geometry ({actual_len}, term={actual_term}), expected ({expected_len}, term={expected_term})")]
    LineGeometryViolation {
        path: PathBuf,
        line: u64,
        expected_len: u32,
        expected_term: u8,
        actual_len: u32,
        actual_term: u8,
    },
    #[error("{path}: line {line} is {len} bytes, exceeding the 65535-byte limit")]
    LineTooLong { path: PathBuf, line: u64, len: usize },
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Top-level error surfaced by every fallible operation on [`crate::SeqDex`].
#[derive(Error, Debug)]
pub enum SeqDexError {
    #[error("path is neither a file, a directory, nor a nonempty list: {0}")]
    PathInvalid(PathBuf),

    #[error("no files in {dir} match pattern {glob:?}")]
    NoMatchingFiles { dir: PathBuf, glob: String },

    #[error("index unavailable: {0}")]
    IndexUnavailable(#[from] StoreError),

    #[error(transparent)]
    Indexer(#[from] IndexerError),

    #[error("unknown identifier: {0}")]
    UnknownId(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("attempted to mutate a read-only index")]
    ReadOnlyViolation,
}

pub type Result<T> = std::result::Result<T, SeqDexError>;
