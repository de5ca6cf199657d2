//! Position markers embedded in generated text.
//!
//! A marker has the form `/*line :<line>:<column>*/`. A position-aware
//! consumer treats the byte right after the marker as if it were at
//! `<line>:<column>` of the original file, and keeps counting from there
//! until the next marker. The file name part before the first colon is
//! always empty, which keeps the current file.

use std::fmt;
use std::ops::Range;
use std::str::FromStr;

use thiserror::Error;

use crate::position::{LineIndex, Position};

const PREFIX: &str = "/*line :";
const SUFFIX: &str = "*/";

/// A `/*line :L:C*/` marker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineMarker {
    pub position: Position,
}

impl LineMarker {
    pub const fn new(position: Position) -> Self {
        Self { position }
    }
}

impl From<Position> for LineMarker {
    fn from(position: Position) -> Self {
        Self { position }
    }
}

impl fmt::Display for LineMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{PREFIX}{}:{}{SUFFIX}",
            self.position.line, self.position.column
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MarkerParseError {
    #[error("missing `/*line :` prefix")]
    MissingPrefix,
    #[error("missing `*/` terminator")]
    MissingSuffix,
    #[error("expected `<line>:<column>`, got {0:?}")]
    Malformed(String),
    #[error("line and column must be at least 1, got {line}:{column}")]
    ZeroPosition { line: usize, column: usize },
}

impl FromStr for LineMarker {
    type Err = MarkerParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rest = s.strip_prefix(PREFIX).ok_or(MarkerParseError::MissingPrefix)?;
        let body = rest.strip_suffix(SUFFIX).ok_or(MarkerParseError::MissingSuffix)?;

        let malformed = || MarkerParseError::Malformed(body.to_string());
        let (line, column) = body.split_once(':').ok_or_else(malformed)?;
        let line: usize = line.parse().map_err(|_| malformed())?;
        let column: usize = column.parse().map_err(|_| malformed())?;

        if line == 0 || column == 0 {
            return Err(MarkerParseError::ZeroPosition { line, column });
        }
        Ok(Self::new(Position::new(line, column)))
    }
}

/// Find every well-formed marker in `text`, with the byte range it occupies
///
/// Text that starts like a marker but does not parse is skipped.
pub fn find_markers(text: &[u8]) -> Vec<(Range<usize>, LineMarker)> {
    let mut found = Vec::new();
    let mut from = 0;

    while let Some(start) = find(text, PREFIX.as_bytes(), from) {
        let Some(close) = find(text, SUFFIX.as_bytes(), start + PREFIX.len()) else {
            break;
        };
        let end = close + SUFFIX.len();
        let parsed = std::str::from_utf8(&text[start..end])
            .ok()
            .and_then(|s| s.parse::<LineMarker>().ok());

        match parsed {
            Some(marker) => {
                found.push((start..end, marker));
                from = end;
            }
            None => from = start + 1,
        }
    }

    found
}

/// Map an offset in rewritten text to the original position it is
/// attributed to
///
/// Offsets before the first marker map to their physical position in the
/// rewritten text.
///
/// # Panics
/// Panics if `offset` is past the end of `text`.
pub fn remap(text: &[u8], offset: usize) -> Position {
    assert!(
        offset <= text.len(),
        "offset {offset} out of bounds (text length: {})",
        text.len()
    );

    let last = find_markers(text)
        .into_iter()
        .take_while(|(range, _)| range.end <= offset)
        .last();

    let Some((range, marker)) = last else {
        return LineIndex::new(text).position(offset);
    };

    let tail = &text[range.end..offset];
    match tail.iter().rposition(|&b| b == b'\n') {
        None => Position::new(
            marker.position.line,
            marker.position.column + tail.len(),
        ),
        Some(last_newline) => {
            let newlines = tail.iter().filter(|&&b| b == b'\n').count();
            Position::new(
                marker.position.line + newlines,
                tail.len() - last_newline,
            )
        }
    }
}

fn find(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    if from >= haystack.len() {
        return None;
    }
    haystack[from..]
        .windows(needle.len())
        .position(|window| window == needle)
        .map(|i| i + from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_format() {
        let marker = LineMarker::new(Position::new(3, 10));
        assert_eq!(marker.to_string(), "/*line :3:10*/");
    }

    #[test]
    fn test_parse_back_what_was_printed() {
        for (line, column) in [(1, 1), (3, 10), (1200, 87)] {
            let marker = LineMarker::from(Position::new(line, column));
            let parsed: LineMarker = marker.to_string().parse().unwrap();
            assert_eq!(parsed, marker);
        }
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            "//line :1:1".parse::<LineMarker>(),
            Err(MarkerParseError::MissingPrefix)
        );
        assert_eq!(
            "/*line :1:1".parse::<LineMarker>(),
            Err(MarkerParseError::MissingSuffix)
        );
        assert_eq!(
            "/*line :12*/".parse::<LineMarker>(),
            Err(MarkerParseError::Malformed("12".to_string()))
        );
        assert_eq!(
            "/*line :a:b*/".parse::<LineMarker>(),
            Err(MarkerParseError::Malformed("a:b".to_string()))
        );
        assert_eq!(
            "/*line :0:4*/".parse::<LineMarker>(),
            Err(MarkerParseError::ZeroPosition { line: 0, column: 4 })
        );
    }

    #[test]
    fn test_find_markers_skips_lookalikes() {
        let text = b"a/*line :x*/ b/*line :2:5*/c/*line :9:1*/";
        let markers = find_markers(text);

        assert_eq!(markers.len(), 2);
        assert_eq!(markers[0].1.position, Position::new(2, 5));
        assert_eq!(&text[markers[0].0.clone()], b"/*line :2:5*/");
        assert_eq!(markers[1].1.position, Position::new(9, 1));
        assert_eq!(markers[1].0.end, text.len());
    }

    #[test]
    fn test_remap_before_any_marker_is_physical() {
        let text = b"ab\ncd/*line :10:1*/ef";
        assert_eq!(remap(text, 4), Position::new(2, 2));
    }

    #[test]
    fn test_remap_after_marker() {
        let text = b"generated\n/*line :7:3*/xy\nzw";
        let after = text.len() - "xy\nzw".len();

        assert_eq!(remap(text, after), Position::new(7, 3));
        assert_eq!(remap(text, after + 1), Position::new(7, 4));
        // After the newline we are on the next original line
        assert_eq!(remap(text, after + 3), Position::new(8, 1));
        assert_eq!(remap(text, after + 4), Position::new(8, 2));
    }

    #[test]
    fn test_remap_uses_latest_marker() {
        let text = b"/*line :1:1*/a/*line :5:9*/b";
        assert_eq!(remap(text, text.len() - 1), Position::new(5, 9));
    }
}
