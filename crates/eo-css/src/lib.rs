//! Scoped stylesheet model: rules, custom properties and colour values.

use std::collections::BTreeMap;

const MAX_VAR_DEPTH: usize = 8;
const HOST_SELECTORS: &[&str] = &[":host", ":root"];
const GROUPING_AT_RULES: &[&str] = &["@media", "@supports", "@layer"];

/// Single `name: value` pair inside a rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub name: String,
    pub value: String,
}

/// Rule with its selector list kept as written (whitespace normalised).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleRule {
    pub selector: String,
    pub declarations: Vec<Declaration>,
}

impl StyleRule {
    pub fn selectors(&self) -> impl Iterator<Item = &str> {
        self.selector.split(',').map(str::trim)
    }

    pub fn declaration(&self, name: &str) -> Option<&str> {
        self.declarations
            .iter()
            .rev()
            .find(|declaration| declaration.name.eq_ignore_ascii_case(name))
            .map(|declaration| declaration.value.as_str())
    }
}

/// Style rules compiled from a component's `<style>` source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleSheet {
    pub rules: Vec<StyleRule>,
}

impl StyleSheet {
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Last declared value of `property` for an exact selector (one entry of
    /// a selector list), with `var()` references left untouched.
    pub fn declared(&self, selector: &str, property: &str) -> Option<&str> {
        self.rules
            .iter()
            .rev()
            .filter(|rule| rule.selectors().any(|candidate| candidate == selector))
            .find_map(|rule| rule.declaration(property))
    }

    /// Custom properties (`--name`) declared on the scope root.
    pub fn custom_properties(&self) -> BTreeMap<String, String> {
        let mut properties = BTreeMap::new();
        for rule in &self.rules {
            if !rule
                .selectors()
                .any(|selector| HOST_SELECTORS.contains(&selector))
            {
                continue;
            }
            for declaration in &rule.declarations {
                if declaration.name.starts_with("--") {
                    properties.insert(declaration.name.clone(), declaration.value.clone());
                }
            }
        }
        properties
    }

    /// Declared value of `property` for `selector` with `var()` substituted.
    pub fn computed(&self, selector: &str, property: &str) -> Option<String> {
        let declared = self.declared(selector, property)?;
        Some(self.resolve(declared))
    }

    /// Substitutes `var(--name[, fallback])` references using the scope's
    /// custom properties. Unknown names without fallback resolve to empty.
    pub fn resolve(&self, value: &str) -> String {
        let properties = self.custom_properties();
        resolve_vars(value, &properties, 0)
    }
}

fn resolve_vars(value: &str, properties: &BTreeMap<String, String>, depth: usize) -> String {
    if depth >= MAX_VAR_DEPTH || !value.contains("var(") {
        return value.to_owned();
    }

    let mut out = String::with_capacity(value.len());
    let mut rest = value;
    while let Some(start) = rest.find("var(") {
        out.push_str(&rest[..start]);
        let args_start = start + "var(".len();
        let Some(close) = find_closing_paren(rest, args_start) else {
            out.push_str(&rest[start..]);
            return out;
        };

        let args = &rest[args_start..close];
        let (name, fallback) = match find_top_level(args, 0, b',') {
            Some(comma) => (args[..comma].trim(), Some(args[comma + 1..].trim())),
            None => (args.trim(), None),
        };

        let replacement = properties
            .get(name)
            .map(String::as_str)
            .or(fallback)
            .unwrap_or_default();
        out.push_str(&resolve_vars(replacement, properties, depth + 1));
        rest = &rest[close + 1..];
    }
    out.push_str(rest);
    out
}

/// 8-bit sRGB colour with alpha.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    /// Parses `#rgb`, `#rrggbb`, `#rrggbbaa`, `rgb()` and `rgba()` notation.
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        if let Some(hex) = input.strip_prefix('#') {
            return parse_hex(hex);
        }

        let lower = input.to_ascii_lowercase();
        let args = lower
            .strip_prefix("rgba(")
            .or_else(|| lower.strip_prefix("rgb("))?
            .strip_suffix(')')?;
        let parts: Vec<&str> = args.split(',').map(str::trim).collect();
        if !(3..=4).contains(&parts.len()) {
            return None;
        }

        let channel = |raw: &str| raw.parse::<u8>().ok();
        let alpha = match parts.get(3) {
            Some(raw) => {
                let value = raw.parse::<f32>().ok()?;
                (value.clamp(0.0, 1.0) * 255.0).round() as u8
            }
            None => 255,
        };

        Some(Self {
            r: channel(parts[0])?,
            g: channel(parts[1])?,
            b: channel(parts[2])?,
            a: alpha,
        })
    }
}

fn parse_hex(hex: &str) -> Option<Color> {
    if !hex.bytes().all(|byte| byte.is_ascii_hexdigit()) {
        return None;
    }

    let nibble = |idx: usize| u8::from_str_radix(hex.get(idx..idx + 1)?, 16).ok();
    let byte = |idx: usize| u8::from_str_radix(hex.get(idx..idx + 2)?, 16).ok();

    match hex.len() {
        3 => Some(Color {
            r: nibble(0)? * 17,
            g: nibble(1)? * 17,
            b: nibble(2)? * 17,
            a: 255,
        }),
        6 | 8 => Some(Color {
            r: byte(0)?,
            g: byte(2)?,
            b: byte(4)?,
            a: if hex.len() == 8 { byte(6)? } else { 255 },
        }),
        _ => None,
    }
}

/// Parses CSS source text.
#[derive(Debug, Default)]
pub struct CssParser;

impl CssParser {
    pub fn parse(&self, input: &str) -> StyleSheet {
        let sanitized = strip_comments(input);
        let mut rules = Vec::new();
        collect_rules(&sanitized, &mut rules);
        StyleSheet { rules }
    }
}

fn collect_rules(input: &str, out: &mut Vec<StyleRule>) {
    let mut cursor = 0_usize;
    while let Some((selector_raw, body, next)) = next_block(input, cursor) {
        cursor = next;

        let selector = normalize_ws(selector_raw);
        if selector.is_empty() {
            continue;
        }

        let lower = selector.to_ascii_lowercase();
        if GROUPING_AT_RULES.iter().any(|rule| lower.starts_with(rule)) {
            collect_rules(body, out);
            continue;
        }
        if lower.starts_with('@') {
            continue;
        }

        let declarations = parse_declarations(body);
        if !declarations.is_empty() {
            out.push(StyleRule {
                selector,
                declarations,
            });
        }
    }
}

fn next_block(input: &str, from: usize) -> Option<(&str, &str, usize)> {
    let bytes = input.as_bytes();
    let mut start = from;
    while start < bytes.len() && (bytes[start].is_ascii_whitespace() || bytes[start] == b';') {
        start += 1;
    }
    if start >= bytes.len() {
        return None;
    }

    let open = find_top_level(input, start, b'{')?;
    let close = find_closing_brace(input, open + 1)?;
    Some((&input[start..open], &input[open + 1..close], close + 1))
}

fn parse_declarations(body: &str) -> Vec<Declaration> {
    split_top_level(body, b';')
        .into_iter()
        .filter_map(|raw| {
            let raw = raw.trim();
            let colon = find_top_level(raw, 0, b':')?;
            let name = raw[..colon].trim();
            let value = normalize_ws(raw[colon + 1..].trim());
            if name.is_empty() || value.is_empty() {
                return None;
            }
            Some(Declaration {
                name: name.to_owned(),
                value,
            })
        })
        .collect()
}

/// Tracks string literals and bracket nesting while scanning CSS bytes.
#[derive(Debug, Default)]
struct Nesting {
    quote: Option<u8>,
    escape: bool,
    parens: u32,
    brackets: u32,
}

impl Nesting {
    /// Feeds one byte. Returns true when the byte sits at the top level
    /// (outside strings, parentheses and brackets).
    fn feed(&mut self, byte: u8) -> bool {
        if let Some(quote) = self.quote {
            if self.escape {
                self.escape = false;
            } else if byte == b'\\' {
                self.escape = true;
            } else if byte == quote {
                self.quote = None;
            }
            return false;
        }

        match byte {
            b'"' | b'\'' => {
                self.quote = Some(byte);
                false
            }
            b'(' => {
                self.parens += 1;
                false
            }
            b')' => {
                self.parens = self.parens.saturating_sub(1);
                false
            }
            b'[' => {
                self.brackets += 1;
                false
            }
            b']' => {
                self.brackets = self.brackets.saturating_sub(1);
                false
            }
            _ => self.parens == 0 && self.brackets == 0,
        }
    }
}

fn find_top_level(input: &str, from: usize, needle: u8) -> Option<usize> {
    let mut nesting = Nesting::default();
    input
        .bytes()
        .enumerate()
        .skip(from)
        .find(|(_, byte)| nesting.feed(*byte) && *byte == needle)
        .map(|(idx, _)| idx)
}

fn find_closing_brace(input: &str, from: usize) -> Option<usize> {
    let mut nesting = Nesting::default();
    let mut depth = 1_u32;
    for (idx, byte) in input.bytes().enumerate().skip(from) {
        if nesting.quote.is_some() {
            nesting.feed(byte);
            continue;
        }
        match byte {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(idx);
                }
            }
            _ => {
                nesting.feed(byte);
            }
        }
    }
    None
}

fn find_closing_paren(input: &str, from: usize) -> Option<usize> {
    let mut depth = 1_u32;
    for (idx, byte) in input.bytes().enumerate().skip(from) {
        match byte {
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(idx);
                }
            }
            _ => {}
        }
    }
    None
}

fn split_top_level(input: &str, delimiter: u8) -> Vec<&str> {
    let mut nesting = Nesting::default();
    let mut parts = Vec::new();
    let mut start = 0_usize;
    for (idx, byte) in input.bytes().enumerate() {
        if nesting.feed(byte) && byte == delimiter {
            parts.push(&input[start..idx]);
            start = idx + 1;
        }
    }
    parts.push(&input[start..]);
    parts
}

fn strip_comments(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut nesting = Nesting::default();
    let mut idx = 0_usize;

    while idx < bytes.len() {
        let byte = bytes[idx];
        if nesting.quote.is_none() && byte == b'/' && bytes.get(idx + 1) == Some(&b'*') {
            idx = input[idx + 2..]
                .find("*/")
                .map(|end| idx + 2 + end + 2)
                .unwrap_or(bytes.len());
            continue;
        }
        nesting.feed(byte);
        out.push(byte);
        idx += 1;
    }

    String::from_utf8_lossy(&out).into_owned()
}

fn normalize_ws(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}
