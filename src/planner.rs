//! Generates the text spliced into a file for each rewrite target.

use std::sync::OnceLock;

use regex::Regex;

use crate::config::RewriteConfig;
use crate::file::SourceFile;
use crate::marker::LineMarker;
use crate::position::PositionResolver;
use crate::target::RewriteTarget;

/// An insertion ready to be registered with a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedEdit {
    /// Offset in the original text
    pub offset: usize,
    pub payload: String,
}

/// Builds import and replacement payloads for one configuration
#[derive(Debug, Clone, Copy)]
pub struct EditPlanner<'a> {
    config: &'a RewriteConfig,
}

impl<'a> EditPlanner<'a> {
    pub fn new(config: &'a RewriteConfig) -> Self {
        Self { config }
    }

    /// The import of the runtime dependency, placed right after the
    /// package name
    ///
    /// The trailing marker points back at the insertion point itself, so
    /// the rest of the package clause line keeps its original position.
    pub fn import(&self, file: &SourceFile, resolver: &dyn PositionResolver) -> PlannedEdit {
        let offset = file.package_end;
        let marker = LineMarker::from(resolver.resolve(file, offset));
        PlannedEdit {
            offset,
            payload: format!(
                "\nimport {} {};{marker}",
                self.config.alias,
                quote_literal(&self.config.import_path)
            ),
        }
    }

    /// The edits turning `var x T` into `var x = T{...}`
    ///
    /// Returns the opening `= ` before the declared type first, then the
    /// composite literal body after the declaration. The body ends with a
    /// marker for the declaration's end, so code following it in the file
    /// is attributed to its original position.
    pub fn replacement(
        &self,
        target: &RewriteTarget,
        file: &SourceFile,
        resolver: &dyn PositionResolver,
    ) -> [PlannedEdit; 2] {
        let alias = &self.config.alias;
        let mut body = String::from("{\n");
        for key in &target.keys {
            body.push_str(&format!("\t{key}: {alias}.Load({}),\n", quote_literal(key)));
        }
        let marker = LineMarker::from(resolver.resolve(file, target.end));
        body.push_str(&format!("}}{marker}"));

        [
            PlannedEdit {
                offset: target.start,
                payload: "= ".to_string(),
            },
            PlannedEdit {
                offset: target.end,
                payload: body,
            },
        ]
    }
}

/// Quote `value` as a Go interpreted string literal
///
/// Printable characters are kept as is; quotes, backslashes and
/// non-printable characters are escaped.
pub fn quote_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\u{07}' => out.push_str("\\a"),
            '\u{08}' => out.push_str("\\b"),
            '\u{0C}' => out.push_str("\\f"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{0B}' => out.push_str("\\v"),
            c if is_printable(c) => out.push(c),
            c if (c as u32) < 0x80 => out.push_str(&format!("\\x{:02x}", c as u32)),
            c if (c as u32) < 0x10000 => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push_str(&format!("\\U{:08x}", c as u32)),
        }
    }
    out.push('"');
    out
}

/// Whether `c` may appear unescaped in a literal: letters, marks,
/// numbers, punctuation, symbols and the ASCII space
fn is_printable(c: char) -> bool {
    if c == ' ' || c.is_ascii_graphic() {
        return true;
    }
    let mut buf = [0; 4];
    !non_printable_re().is_match(c.encode_utf8(&mut buf))
}

/// Matches one character from the Other (control, format, surrogate,
/// private use, unassigned) or Separator categories
///
/// # Panics
///
/// Panics if the regex pattern is invalid.
fn non_printable_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    #[allow(clippy::expect_used)]
    RE.get_or_init(|| Regex::new(r"^[\p{C}\p{Z}]$").expect("Invalid non-printable regex pattern"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::{LineIndexResolver, Position};

    const SOURCE: &str = "package cfg\n\nvar secrets struct {\n\tapiKey string\n\tdbPass string\n}\n\nfunc f() {}\n";

    fn file() -> SourceFile {
        SourceFile::from_text("cfg.go", SOURCE, "package cfg".len())
    }

    fn target(keys: &[&str]) -> RewriteTarget {
        let start = SOURCE.find("struct").unwrap();
        let end = SOURCE.find("}\n\nfunc").unwrap() + 1;
        RewriteTarget::new("cfg.go", start, end, keys.iter().copied())
    }

    #[test]
    fn test_import_payload() {
        let config = RewriteConfig::new("runtime/secrets", "__dep");
        let planned = EditPlanner::new(&config).import(&file(), &LineIndexResolver);

        assert_eq!(planned.offset, 11);
        assert_eq!(
            planned.payload,
            "\nimport __dep \"runtime/secrets\";/*line :1:12*/"
        );
    }

    #[test]
    fn test_replacement_payloads() {
        let config = RewriteConfig::new("runtime/secrets", "__dep");
        let target = target(&["apiKey", "dbPass"]);
        let [open, body] = EditPlanner::new(&config).replacement(&target, &file(), &LineIndexResolver);

        assert_eq!(open.offset, target.start);
        assert_eq!(open.payload, "= ");
        assert_eq!(body.offset, target.end);
        assert_eq!(
            body.payload,
            "{\n\tapiKey: __dep.Load(\"apiKey\"),\n\tdbPass: __dep.Load(\"dbPass\"),\n}/*line :6:2*/"
        );
    }

    #[test]
    fn test_keys_keep_order_and_duplicates() {
        let config = RewriteConfig::default();
        let target = target(&["B", "A", "B"]);
        let [_, body] = EditPlanner::new(&config).replacement(&target, &file(), &LineIndexResolver);

        let lines: Vec<&str> = body.payload.lines().collect();
        assert_eq!(
            lines[1..4],
            [
                "\tB: __encore_secrets.Load(\"B\"),",
                "\tA: __encore_secrets.Load(\"A\"),",
                "\tB: __encore_secrets.Load(\"B\"),",
            ]
        );
    }

    #[test]
    fn test_marker_uses_resolver() {
        let config = RewriteConfig::default();
        let resolver = |_: &SourceFile, offset: usize| Position::new(offset, 99);
        let target = target(&["k"]);
        let [_, body] = EditPlanner::new(&config).replacement(&target, &file(), &resolver);

        assert!(body.payload.ends_with(&format!("}}/*line :{}:99*/", target.end)));
    }

    #[test]
    fn test_quote_plain() {
        assert_eq!(quote_literal("apiKey"), "\"apiKey\"");
        assert_eq!(quote_literal(""), "\"\"");
    }

    #[test]
    fn test_quote_escapes() {
        assert_eq!(quote_literal("a\"b\\c"), r#""a\"b\\c""#);
        assert_eq!(quote_literal("tab\there\n"), r#""tab\there\n""#);
        assert_eq!(quote_literal("\u{07}\u{08}\u{0C}\r\u{0B}"), r#""\a\b\f\r\v""#);
        assert_eq!(quote_literal("\u{00}\u{1b}\u{7f}"), r#""\x00\x1b\x7f""#);
    }

    #[test]
    fn test_quote_unicode() {
        assert_eq!(quote_literal("clé☃"), "\"clé☃\"");
        assert_eq!(quote_literal("\u{00a0}\u{feff}"), r#""\u00a0\ufeff""#);
        assert_eq!(quote_literal("\u{85}"), r#""\u0085""#);
        assert_eq!(quote_literal("\u{e0001}"), r#""\U000e0001""#);
    }

    #[test]
    fn test_quote_private_use_unassigned_and_format() {
        // Private use
        assert_eq!(quote_literal("\u{E000}"), r#""\ue000""#);
        assert_eq!(quote_literal("\u{10FFFD}"), r#""\U0010fffd""#);
        // Unassigned
        assert_eq!(quote_literal("\u{0378}"), r#""\u0378""#);
        // Format characters outside the common invisible ones
        assert_eq!(quote_literal("\u{0600}"), r#""\u0600""#);
        assert_eq!(quote_literal("\u{110BD}"), r#""\U000110bd""#);
        // Line and paragraph separators
        assert_eq!(quote_literal("\u{2028}\u{2029}"), r#""\u2028\u2029""#);
    }

    #[test]
    fn test_quote_keeps_marks_and_symbols() {
        assert_eq!(quote_literal("e\u{0301}€𝄞"), "\"e\u{0301}€𝄞\"");
    }
}
