use std::fs;
use std::io;
use std::path::Path;

use thiserror::Error;

use crate::position::LineIndex;

/// A source file loaded into memory, ready to be rewritten
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// Path the file was loaded from; also its identity within a pass
    pub path: String,
    /// File content as valid UTF-8
    pub content: String,
    /// Byte length of the content
    pub len: usize,
    /// BLAKE3 hash of the content (hex-encoded)
    pub checksum: String,
    /// Byte offset just past the package clause's name, where the
    /// runtime import is inserted
    pub package_end: usize,
    /// Line start table used to resolve offsets
    pub line_index: LineIndex,
}

impl SourceFile {
    /// Build a source file from text that is already in memory
    pub fn from_text(path: impl Into<String>, content: impl Into<String>, package_end: usize) -> Self {
        let content = content.into();
        let line_index = LineIndex::new(content.as_bytes());
        Self {
            path: path.into(),
            len: content.len(),
            checksum: checksum(content.as_bytes()),
            content,
            package_end,
            line_index,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.content.as_bytes()
    }
}

/// Error types for file operations
#[derive(Debug, Error)]
pub enum FileError {
    #[error("File not found: {0}")]
    NotFound(String),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Invalid UTF-8 in file: {0}")]
    InvalidUtf8(String),
}

/// Hex-encoded BLAKE3 hash of `bytes`
pub fn checksum(bytes: &[u8]) -> String {
    blake3::hash(bytes).to_hex().to_string()
}

/// Read a source file from disk with UTF-8 validation
///
/// # Arguments
/// * `path` - Path to the file to read
/// * `package_end` - Offset reported by the analysis pass for the end of
///   the package clause
///
/// # Returns
/// * `Ok(SourceFile)` - File content with checksum and line index
/// * `Err(FileError)` - File not found, I/O error, or invalid UTF-8
pub fn read_source<P: AsRef<Path>>(path: P, package_end: usize) -> Result<SourceFile, FileError> {
    let path_ref = path.as_ref();

    if !path_ref.exists() {
        return Err(FileError::NotFound(path_ref.display().to_string()));
    }

    let bytes = fs::read(path_ref)?;
    let content = String::from_utf8(bytes)
        .map_err(|_| FileError::InvalidUtf8(path_ref.display().to_string()))?;

    tracing::trace!(path = %path_ref.display(), len = content.len(), "loaded source file");

    Ok(SourceFile::from_text(
        path_ref.display().to_string(),
        content,
        package_end,
    ))
}
