//! Error types for a generation pass

use thiserror::Error;

/// Why a generation pass was rejected
///
/// All of these describe a target list that disagrees with the files it
/// refers to. They are checked before any file is rewritten, so a pass
/// either produces every file or none.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RewriteError {
    #[error("Target refers to unknown file '{0}'")]
    UnknownFile(String),
    #[error("File '{0}' was supplied more than once")]
    DuplicateFile(String),
    #[error("Invalid target span in '{file}': end ({end}) < start ({start})")]
    InvalidRange {
        file: String,
        start: usize,
        end: usize,
    },
    #[error("Target span {start}..{end} out of bounds in '{file}' (length: {len})")]
    OutOfBounds {
        file: String,
        start: usize,
        end: usize,
        len: usize,
    },
    #[error("Package clause offset {offset} out of bounds in '{file}' (length: {len})")]
    PackageClauseOutOfBounds {
        file: String,
        offset: usize,
        len: usize,
    },
}

/// A type alias for `Result<T, RewriteError>`
pub type Result<T> = std::result::Result<T, RewriteError>;
