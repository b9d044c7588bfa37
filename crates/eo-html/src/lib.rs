//! Markup fragment parsing into the page DOM.

use eo_core::OverlayResult;
use eo_dom::Document;
use eo_dom::NodeId;

const VOID_ELEMENTS: &[&str] = &["br", "hr", "img", "input", "link", "meta", "wbr"];
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// Parses trusted template markup (static component templates) into nodes.
#[derive(Debug, Default)]
pub struct FragmentParser;

impl FragmentParser {
    /// Appends the nodes described by `markup` under `parent` and returns the
    /// top-level nodes created. Whitespace-only text between tags is dropped.
    pub fn parse_into(
        &self,
        document: &mut Document,
        parent: NodeId,
        markup: &str,
    ) -> OverlayResult<Vec<NodeId>> {
        let bytes = markup.as_bytes();
        let mut idx = 0_usize;
        let mut open: Vec<(String, NodeId)> = Vec::new();
        let mut top_level = Vec::new();

        while idx < bytes.len() {
            let current = open.last().map(|(_, id)| *id).unwrap_or(parent);

            if bytes[idx] != b'<' {
                let next = find_byte(bytes, idx, b'<').unwrap_or(bytes.len());
                let raw = &markup[idx..next];
                if !raw.trim().is_empty() {
                    let text = document.create_text_node(&decode_entities(raw));
                    document.append_child(current, text)?;
                    if open.is_empty() {
                        top_level.push(text);
                    }
                }
                idx = next;
                continue;
            }

            if starts_with(bytes, idx, b"<!--") {
                idx = skip_comment(bytes, idx);
                continue;
            }

            if starts_with(bytes, idx, b"<!") {
                idx = skip_to_gt(bytes, idx.saturating_add(2));
                continue;
            }

            let Some((tag, next_idx)) = parse_tag(bytes, idx) else {
                // A stray `<` is plain text.
                let text = document.create_text_node("<");
                document.append_child(current, text)?;
                idx = idx.saturating_add(1);
                continue;
            };

            if tag.is_end {
                if let Some(position) = open.iter().rposition(|(name, _)| *name == tag.name) {
                    open.truncate(position);
                }
                idx = next_idx;
                continue;
            }

            let element = document.create_element(&tag.name);
            for (name, value) in &tag.attributes {
                document.set_attribute(element, name, value)?;
            }
            document.append_child(current, element)?;
            if open.is_empty() {
                top_level.push(element);
            }

            if RAW_TEXT_ELEMENTS.contains(&tag.name.as_str()) && !tag.self_closing {
                let (raw, after_raw) = read_raw_text_until_end_tag(markup, next_idx, &tag.name);
                if !raw.is_empty() {
                    let text = document.create_text_node(raw);
                    document.append_child(element, text)?;
                }
                idx = after_raw;
                continue;
            }

            if !tag.self_closing && !VOID_ELEMENTS.contains(&tag.name.as_str()) {
                open.push((tag.name, element));
            }
            idx = next_idx;
        }

        Ok(top_level)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ParsedTag {
    name: String,
    attributes: Vec<(String, String)>,
    is_end: bool,
    self_closing: bool,
}

fn parse_tag(bytes: &[u8], start: usize) -> Option<(ParsedTag, usize)> {
    if bytes.get(start).copied() != Some(b'<') {
        return None;
    }

    let mut idx = start.saturating_add(1);
    let mut is_end = false;
    if bytes.get(idx).copied() == Some(b'/') {
        is_end = true;
        idx = idx.saturating_add(1);
    }

    let name_start = idx;
    while idx < bytes.len() && is_tag_name_char(bytes[idx]) {
        idx = idx.saturating_add(1);
    }
    if idx == name_start {
        return None;
    }

    let name = String::from_utf8_lossy(&bytes[name_start..idx]).to_ascii_lowercase();
    let mut attributes = Vec::new();
    let mut self_closing = false;

    loop {
        idx = skip_spaces(bytes, idx);
        match bytes.get(idx).copied() {
            None => return None,
            Some(b'>') => break,
            Some(b'/') => {
                self_closing = true;
                idx = idx.saturating_add(1);
            }
            Some(_) => {
                let (attribute, after) = parse_attribute(bytes, idx)?;
                if !is_end {
                    attributes.push(attribute);
                }
                idx = after;
            }
        }
    }

    Some((
        ParsedTag {
            name,
            attributes,
            is_end,
            self_closing,
        },
        idx.saturating_add(1),
    ))
}

fn parse_attribute(bytes: &[u8], start: usize) -> Option<((String, String), usize)> {
    let mut idx = start;
    while idx < bytes.len()
        && !matches!(bytes[idx], b'=' | b'>' | b'/')
        && !bytes[idx].is_ascii_whitespace()
    {
        idx = idx.saturating_add(1);
    }
    if idx == start {
        return None;
    }
    let name = String::from_utf8_lossy(&bytes[start..idx]).to_ascii_lowercase();

    let after_name = skip_spaces(bytes, idx);
    if bytes.get(after_name).copied() != Some(b'=') {
        return Some(((name, String::new()), idx));
    }

    let value_start = skip_spaces(bytes, after_name.saturating_add(1));
    match bytes.get(value_start).copied() {
        Some(quote @ (b'"' | b'\'')) => {
            let close = find_byte(bytes, value_start.saturating_add(1), quote)?;
            let raw = String::from_utf8_lossy(&bytes[value_start + 1..close]);
            Some(((name, decode_entities(&raw)), close.saturating_add(1)))
        }
        Some(_) => {
            let mut end = value_start;
            while end < bytes.len() && !bytes[end].is_ascii_whitespace() && bytes[end] != b'>' {
                end = end.saturating_add(1);
            }
            let raw = String::from_utf8_lossy(&bytes[value_start..end]);
            Some(((name, decode_entities(&raw)), end))
        }
        None => None,
    }
}

fn read_raw_text_until_end_tag<'a>(
    input: &'a str,
    start: usize,
    tag_name: &str,
) -> (&'a str, usize) {
    let bytes = input.as_bytes();
    let tag_bytes = tag_name.as_bytes();
    let mut idx = start;

    while idx < bytes.len() {
        if bytes[idx] == b'<'
            && bytes.get(idx.saturating_add(1)).copied() == Some(b'/')
            && starts_with_ignore_ascii_case(bytes, idx.saturating_add(2), tag_bytes)
        {
            if let Some((_, end_idx)) = parse_tag(bytes, idx) {
                return (&input[start..idx], end_idx);
            }
        }

        idx = idx.saturating_add(1);
    }

    (&input[start..], bytes.len())
}

fn decode_entities(input: &str) -> String {
    if !input.contains('&') {
        return input.to_owned();
    }

    input
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", "\u{a0}")
        .replace("&amp;", "&")
}

fn skip_comment(bytes: &[u8], start: usize) -> usize {
    find_subslice(bytes, start.saturating_add(4), b"-->")
        .map(|end| end.saturating_add(3))
        .unwrap_or(bytes.len())
}

fn skip_to_gt(bytes: &[u8], start: usize) -> usize {
    find_byte(bytes, start, b'>')
        .map(|end| end.saturating_add(1))
        .unwrap_or(bytes.len())
}

fn skip_spaces(bytes: &[u8], mut idx: usize) -> usize {
    while idx < bytes.len() && bytes[idx].is_ascii_whitespace() {
        idx = idx.saturating_add(1);
    }
    idx
}

fn is_tag_name_char(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_' | b':')
}

fn starts_with(bytes: &[u8], idx: usize, pattern: &[u8]) -> bool {
    let end = idx.saturating_add(pattern.len());
    end <= bytes.len() && bytes[idx..end] == *pattern
}

fn starts_with_ignore_ascii_case(bytes: &[u8], idx: usize, pattern: &[u8]) -> bool {
    let end = idx.saturating_add(pattern.len());
    end <= bytes.len() && bytes[idx..end].eq_ignore_ascii_case(pattern)
}

fn find_subslice(bytes: &[u8], from: usize, needle: &[u8]) -> Option<usize> {
    if from >= bytes.len() {
        return None;
    }

    bytes[from..]
        .windows(needle.len())
        .position(|window| window == needle)
        .map(|offset| from + offset)
}

fn find_byte(bytes: &[u8], from: usize, byte: u8) -> Option<usize> {
    bytes
        .get(from..)?
        .iter()
        .position(|candidate| *candidate == byte)
        .map(|offset| from + offset)
}

#[cfg(test)]
mod tests {
    use super::FragmentParser;
    use eo_dom::Document;

    fn parse(doc: &mut Document, markup: &str) -> Vec<eo_dom::NodeId> {
        let parent = doc.body();
        match FragmentParser.parse_into(doc, parent, markup) {
            Ok(nodes) => nodes,
            Err(error) => panic!("{error}"),
        }
    }

    #[test]
    fn builds_nested_elements_with_attributes() {
        let mut doc = Document::new();
        let nodes = parse(
            &mut doc,
            r#"<div class="backdrop" part="backdrop"><pre class='file' part=file></pre></div>"#,
        );
        assert_eq!(nodes.len(), 1);

        let backdrop = nodes[0];
        assert_eq!(
            doc.element(backdrop).and_then(|el| el.attribute("part")),
            Some("backdrop")
        );
        let pre = doc.query_selector(backdrop, "pre.file");
        assert!(pre.is_some());
        assert_eq!(
            pre.and_then(|id| doc.element(id)).and_then(|el| el.attribute("part")),
            Some("file")
        );
    }

    #[test]
    fn keeps_style_contents_as_raw_text() {
        let mut doc = Document::new();
        let nodes = parse(&mut doc, "<style>.a > .b { color: red; }</style><div></div>");
        assert_eq!(nodes.len(), 2);
        assert_eq!(doc.text_content(nodes[0]), ".a > .b { color: red; }");
        assert!(doc.children(nodes[1]).is_empty());
    }

    #[test]
    fn void_elements_do_not_swallow_siblings() {
        let mut doc = Document::new();
        let nodes = parse(&mut doc, "<div>one<br>two <code>x</code></div>");
        let div = nodes[0];
        assert_eq!(doc.children(div).len(), 4);
        assert_eq!(doc.text_content(div), "onetwo x");
    }

    #[test]
    fn decodes_basic_entities_and_skips_comments() {
        let mut doc = Document::new();
        let nodes = parse(&mut doc, "<!-- note --><p title=\"a &amp; b\">1 &lt; 2</p>");
        assert_eq!(nodes.len(), 1);
        assert_eq!(doc.text_content(nodes[0]), "1 < 2");
        assert_eq!(
            doc.element(nodes[0]).and_then(|el| el.attribute("title")),
            Some("a & b")
        );
    }
}
