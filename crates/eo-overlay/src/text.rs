//! Error text classification: code-frame stripping, file references and
//! the file-location line.

use crate::descriptor::SourceLocation;
use regex::Regex;
use std::sync::LazyLock;

// A code-frame line is `[>] <n> | source` or the caret line `   | ^^^`.
static CODE_FRAME_LINE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    compile(r"(?m)^(?:>?\s+[0-9]+\s+\|.*|\s+\|\s*\^.*)(?:\r?\n|\z)")
});

// Absolute POSIX or Windows path followed by `:line:column`.
static FILE_REFERENCE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    compile(r"(?P<path>(?:[a-zA-Z]:\\|/).*?):(?P<line>[0-9]+):(?P<column>[0-9]+)")
});

fn compile(pattern: &str) -> Option<Regex> {
    match Regex::new(pattern) {
        Ok(regex) => Some(regex),
        Err(error) => {
            tracing::warn!(%error, pattern, "failed to compile overlay pattern");
            None
        }
    }
}

/// Removes every embedded code-frame line and trims the result.
pub fn strip_code_frame(message: &str) -> String {
    match CODE_FRAME_LINE.as_ref() {
        Some(regex) => regex.replace_all(message, "").trim().to_owned(),
        None => message.trim().to_owned(),
    }
}

/// `path:line:column` occurrence inside displayed text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileReference<'a> {
    /// Exact matched text, used as the link label.
    pub label: &'a str,
    /// Path without the trailing position, sent to the editor endpoint.
    pub path: &'a str,
    pub line: u32,
    pub column: u32,
}

/// Piece of a region's text in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextSegment<'a> {
    Plain(&'a str),
    File(FileReference<'a>),
}

/// Splits `text` into plain spans and file references, left to right.
/// Concatenating the spans and labels reproduces `text` exactly. With
/// `links` false the whole text is one plain span.
pub fn segments(text: &str, links: bool) -> Vec<TextSegment<'_>> {
    let mut out = Vec::new();
    let regex = match FILE_REFERENCE.as_ref() {
        Some(regex) if links => regex,
        _ => {
            if !text.is_empty() {
                out.push(TextSegment::Plain(text));
            }
            return out;
        }
    };

    let mut cursor = 0_usize;
    for captures in regex.captures_iter(text) {
        let (Some(whole), Some(path), Some(line), Some(column)) = (
            captures.get(0),
            captures.name("path"),
            captures.name("line"),
            captures.name("column"),
        ) else {
            continue;
        };

        if whole.start() > cursor {
            out.push(TextSegment::Plain(&text[cursor..whole.start()]));
        }
        out.push(TextSegment::File(FileReference {
            label: whole.as_str(),
            path: path.as_str(),
            line: parse_position(line.as_str()),
            column: parse_position(column.as_str()),
        }));
        cursor = whole.end();
    }

    if cursor < text.len() {
        out.push(TextSegment::Plain(&text[cursor..]));
    }
    out
}

fn parse_position(raw: &str) -> u32 {
    raw.parse().unwrap_or(u32::MAX)
}

/// Text of the file region and whether it may carry links.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileLocation {
    pub text: String,
    pub linkable: bool,
}

/// Picks the file line: `loc` wins over `id`, query suffixes are dropped,
/// and nothing is shown when neither is present.
pub fn file_location(loc: Option<&SourceLocation>, id: Option<&str>) -> Option<FileLocation> {
    let id = id.filter(|id| !id.is_empty());

    if let Some(loc) = loc {
        let file = loc
            .file
            .as_deref()
            .filter(|file| !file.is_empty())
            .or(id)
            .map(strip_query)
            .filter(|file| !file.is_empty());

        let parts: Vec<String> = [
            file.map(str::to_owned),
            loc.line.map(|line| line.to_string()),
            loc.column.map(|column| column.to_string()),
        ]
        .into_iter()
        .flatten()
        .collect();

        if parts.is_empty() {
            return None;
        }
        return Some(FileLocation {
            text: parts.join(":"),
            linkable: true,
        });
    }

    let file = strip_query(id?);
    if file.is_empty() {
        return None;
    }
    Some(FileLocation {
        text: file.to_owned(),
        linkable: false,
    })
}

/// Drops everything from the first `?`.
pub fn strip_query(file: &str) -> &str {
    file.split('?').next().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::FileLocation;
    use super::TextSegment;
    use super::file_location;
    use super::segments;
    use super::strip_code_frame;
    use crate::descriptor::SourceLocation;

    fn labels<'a>(parts: &[TextSegment<'a>]) -> Vec<&'a str> {
        parts
            .iter()
            .filter_map(|part| match part {
                TextSegment::File(reference) => Some(reference.label),
                TextSegment::Plain(_) => None,
            })
            .collect()
    }

    fn rejoin(parts: &[TextSegment<'_>]) -> String {
        parts
            .iter()
            .map(|part| match part {
                TextSegment::Plain(text) => *text,
                TextSegment::File(reference) => reference.label,
            })
            .collect()
    }

    #[test]
    fn strips_inline_code_frame() {
        let message = "Unexpected token\n  12 | const x = 1\n     | ^\n";
        assert_eq!(strip_code_frame(message), "Unexpected token");
    }

    #[test]
    fn strips_frame_without_trailing_newline() {
        let message = "Unexpected token\n  12 | const x = 1\n     | ^";
        assert_eq!(strip_code_frame(message), "Unexpected token");
    }

    #[test]
    fn strips_marked_lines_and_keeps_surrounding_text() {
        let message = "Parse error\n  1 | a\n> 2 | b(\n    |   ^\n  3 | c\nsee docs\r\n";
        assert_eq!(strip_code_frame(message), "Parse error\nsee docs");
    }

    #[test]
    fn message_without_frame_is_only_trimmed() {
        let message = "  Cannot find module 'x' | y  \n";
        assert_eq!(strip_code_frame(message), "Cannot find module 'x' | y");
    }

    #[test]
    fn finds_posix_and_windows_references() {
        let text = "at /a/b.css:3:7\n    at foo (C:\\c\\d.ts:1:1) done";
        let parts = segments(text, true);
        assert_eq!(labels(&parts), vec!["/a/b.css:3:7", "C:\\c\\d.ts:1:1"]);
        assert_eq!(rejoin(&parts), text);
        assert_eq!(parts.last(), Some(&TextSegment::Plain(") done")));

        let TextSegment::File(first) = parts[1] else {
            panic!("expected a file reference, got {:?}", parts[1]);
        };
        assert_eq!(first.path, "/a/b.css");
        assert_eq!((first.line, first.column), (3, 7));
    }

    #[test]
    fn positions_must_be_ascii_digits() {
        let text = "/a.ts:\u{661}\u{662}:\u{663} then /b.ts:12:3";
        let parts = segments(text, true);
        assert_eq!(labels(&parts), vec!["/a.ts:\u{661}\u{662}:\u{663} then /b.ts:12:3"]);

        let parts = segments("/a.ts:\u{661}\u{662}:\u{663}", true);
        assert_eq!(parts, vec![TextSegment::Plain("/a.ts:\u{661}\u{662}:\u{663}")]);

        let message = "Oops\n  \u{661}\u{662} | const x = 1";
        assert_eq!(strip_code_frame(message), message);
    }

    #[test]
    fn lazy_path_stops_at_first_position() {
        let parts = segments("/x.ts:10:5:2", true);
        assert_eq!(labels(&parts), vec!["/x.ts:10:5"]);
        assert_eq!(parts.last(), Some(&TextSegment::Plain(":2")));
    }

    #[test]
    fn text_without_references_stays_plain() {
        let parts = segments("no files here: 1:2", true);
        assert_eq!(parts, vec![TextSegment::Plain("no files here: 1:2")]);
        assert!(segments("", true).is_empty());
    }

    #[test]
    fn disabled_links_produce_no_references() {
        let parts = segments("at /a/b.css:3:7", false);
        assert_eq!(parts, vec![TextSegment::Plain("at /a/b.css:3:7")]);
    }

    #[test]
    fn location_prefers_loc_and_strips_query() {
        let loc = SourceLocation::new("/a/b.css?x=1", 3, 7);
        assert_eq!(
            file_location(Some(&loc), Some("/ignored.ts")),
            Some(FileLocation {
                text: "/a/b.css:3:7".to_owned(),
                linkable: true,
            })
        );
    }

    #[test]
    fn location_falls_back_to_id() {
        let loc = SourceLocation {
            file: None,
            line: Some(4),
            column: Some(2),
        };
        assert_eq!(
            file_location(Some(&loc), Some("/src/x.vue?vue&type=style")).map(|l| l.text),
            Some("/src/x.vue:4:2".to_owned())
        );
        assert_eq!(
            file_location(None, Some("/src/x.vue?vue")),
            Some(FileLocation {
                text: "/src/x.vue".to_owned(),
                linkable: false,
            })
        );
    }

    #[test]
    fn missing_location_parts_are_omitted() {
        let loc = SourceLocation {
            file: Some("/a.ts".to_owned()),
            line: Some(9),
            column: None,
        };
        assert_eq!(
            file_location(Some(&loc), None).map(|l| l.text),
            Some("/a.ts:9".to_owned())
        );
        assert_eq!(file_location(Some(&SourceLocation::default()), None), None);
    }

    #[test]
    fn no_location_fields_means_no_file_line() {
        assert_eq!(file_location(None, None), None);
        assert_eq!(file_location(None, Some("")), None);
    }
}
