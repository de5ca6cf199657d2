use crate::file::SourceFile;

/// Position in a source file (line and column numbers)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    /// Line number (1-indexed)
    pub line: usize,
    /// Column number (1-indexed, in bytes)
    pub column: usize,
}

impl Position {
    pub const fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Table of line start offsets for one text
///
/// Built once per file so that every offset lookup is a binary search
/// instead of a rescan from the top of the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineIndex {
    /// Byte offset of the first byte of every line; always starts with 0
    line_starts: Vec<usize>,
    /// Length of the indexed text
    len: usize,
}

impl LineIndex {
    /// Build the index for `text`. Lines are terminated by `\n`.
    pub fn new(text: &[u8]) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(
            text.iter()
                .enumerate()
                .filter(|(_, b)| **b == b'\n')
                .map(|(i, _)| i + 1),
        );
        Self {
            line_starts,
            len: text.len(),
        }
    }

    /// Convert a byte offset to line and column
    ///
    /// # Panics
    /// Panics if `offset` is past the end of the indexed text.
    pub fn position(&self, offset: usize) -> Position {
        assert!(
            offset <= self.len,
            "offset {offset} out of bounds (text length: {})",
            self.len
        );
        // Index of the last line start that is <= offset
        let line = self.line_starts.partition_point(|&start| start <= offset) - 1;
        Position {
            line: line + 1,
            column: offset - self.line_starts[line] + 1,
        }
    }
}

/// Resolves byte offsets of a source file to line/column positions
///
/// Implementations must be pure and synchronous; the generator shares one
/// resolver across the worker threads that rewrite different files.
pub trait PositionResolver: Sync {
    fn resolve(&self, file: &SourceFile, offset: usize) -> Position;
}

impl<F> PositionResolver for F
where
    F: Fn(&SourceFile, usize) -> Position + Sync,
{
    fn resolve(&self, file: &SourceFile, offset: usize) -> Position {
        self(file, offset)
    }
}

/// Resolver backed by the line index each [`SourceFile`] carries
#[derive(Debug, Clone, Copy, Default)]
pub struct LineIndexResolver;

impl PositionResolver for LineIndexResolver {
    fn resolve(&self, file: &SourceFile, offset: usize) -> Position {
        file.line_index.position(offset)
    }
}
