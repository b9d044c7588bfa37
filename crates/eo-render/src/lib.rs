//! Paints a component's render surface into terminal text.
//!
//! Styling comes from the `<style>` elements inside the surface: colours are
//! resolved through its custom properties and emitted as 24-bit ANSI
//! escapes. Layout is deliberately flat: block elements start new lines,
//! `pre` keeps its whitespace, everything else collapses it.

use eo_css::Color;
use eo_css::CssParser;
use eo_css::StyleSheet;
use eo_dom::Document;
use eo_dom::ElementData;
use eo_dom::NodeId;
use eo_dom::NodeKind;

const BLOCK_TAGS: &[&str] = &["div", "p", "pre", "section", "header", "footer"];
const HIDDEN_TAGS: &[&str] = &["style", "script", "template"];
const ANSI_RESET: &str = "\x1b[0m";

/// Rendered text, one entry per terminal line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frame {
    pub lines: Vec<String>,
}

impl Frame {
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct TextEffects {
    color: Option<Color>,
    bold: bool,
    underline: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Span {
    text: String,
    effects: TextEffects,
}

#[derive(Debug, Default)]
struct LineBuilder {
    lines: Vec<Vec<Span>>,
    current: Vec<Span>,
}

impl LineBuilder {
    fn push(&mut self, text: &str, effects: TextEffects) {
        if text.is_empty() {
            return;
        }
        match self.current.last_mut() {
            Some(last) if last.effects == effects => last.text.push_str(text),
            _ => self.current.push(Span {
                text: text.to_owned(),
                effects,
            }),
        }
    }

    fn newline(&mut self) {
        self.lines.push(std::mem::take(&mut self.current));
    }

    /// Starts a new line unless already at the start of one.
    fn block_boundary(&mut self) {
        if !self.current.is_empty() {
            self.newline();
        }
    }

    fn at_line_start(&self) -> bool {
        self.current.iter().all(|span| span.text.is_empty())
    }

    fn finish(mut self) -> Vec<Vec<Span>> {
        self.block_boundary();
        self.lines
    }
}

/// Terminal painter. `plain` output carries no escape sequences.
#[derive(Debug, Clone, Copy, Default)]
pub struct Renderer {
    plain: bool,
}

impl Renderer {
    pub fn ansi() -> Self {
        Self { plain: false }
    }

    pub fn plain() -> Self {
        Self { plain: true }
    }

    /// Renders the subtree under `root`, typically a shadow root.
    pub fn render(&self, document: &Document, root: NodeId) -> Frame {
        let sheet = collect_styles(document, root);
        let mut builder = LineBuilder::default();
        let mut ctx = Ctx {
            document,
            sheet: &sheet,
            out: &mut builder,
        };
        for child in document.children(root) {
            render_node(&mut ctx, *child, TextEffects::default(), false);
        }

        let lines = builder
            .finish()
            .into_iter()
            .map(|spans| self.encode(&spans))
            .collect();
        Frame { lines }
    }

    fn encode(&self, spans: &[Span]) -> String {
        let mut line = String::new();
        for span in spans {
            if self.plain || span.effects == TextEffects::default() {
                line.push_str(&span.text);
                continue;
            }

            if let Some(color) = span.effects.color {
                line.push_str(&format!("\x1b[38;2;{};{};{}m", color.r, color.g, color.b));
            }
            if span.effects.bold {
                line.push_str("\x1b[1m");
            }
            if span.effects.underline {
                line.push_str("\x1b[4m");
            }
            line.push_str(&span.text);
            line.push_str(ANSI_RESET);
        }
        line
    }
}

struct Ctx<'a> {
    document: &'a Document,
    sheet: &'a StyleSheet,
    out: &'a mut LineBuilder,
}

fn collect_styles(document: &Document, root: NodeId) -> StyleSheet {
    let source: String = document
        .query_selector_all(root, "style")
        .into_iter()
        .map(|id| document.text_content(id))
        .collect::<Vec<_>>()
        .join("\n");

    if source.is_empty() {
        return StyleSheet::empty();
    }
    CssParser.parse(&source)
}

fn render_node(ctx: &mut Ctx<'_>, id: NodeId, inherited: TextEffects, preformatted: bool) {
    let document = ctx.document;
    let Some(node) = document.node(id) else {
        return;
    };

    match &node.kind {
        NodeKind::Text(text) => render_text(ctx.out, text, inherited, preformatted),
        NodeKind::Element(element) => render_element(ctx, id, element, inherited, preformatted),
        NodeKind::Document | NodeKind::ShadowRoot { .. } => {}
    }
}

fn render_element(
    ctx: &mut Ctx<'_>,
    id: NodeId,
    element: &ElementData,
    inherited: TextEffects,
    preformatted: bool,
) {
    let tag = element.tag.as_str();
    if HIDDEN_TAGS.contains(&tag) {
        return;
    }
    if tag == "br" {
        ctx.out.newline();
        return;
    }

    let effects = style_for(ctx.sheet, element, inherited);
    let block = BLOCK_TAGS.contains(&tag);
    let preformatted = preformatted || tag == "pre";

    if block {
        ctx.out.block_boundary();
    }
    let document = ctx.document;
    for child in document.children(id) {
        render_node(ctx, *child, effects, preformatted);
    }
    if block {
        ctx.out.block_boundary();
    }
}

fn render_text(out: &mut LineBuilder, text: &str, effects: TextEffects, preformatted: bool) {
    if preformatted {
        let mut pieces = text.split('\n');
        if let Some(first) = pieces.next() {
            out.push(first.trim_end_matches('\r'), effects);
        }
        for piece in pieces {
            out.newline();
            out.push(piece.trim_end_matches('\r'), effects);
        }
        return;
    }

    let collapsed = collapse_whitespace(text);
    let collapsed = if out.at_line_start() {
        collapsed.trim_start()
    } else {
        collapsed.as_str()
    };
    out.push(collapsed, effects);
}

fn collapse_whitespace(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut in_space = false;
    for ch in input.chars() {
        if ch.is_whitespace() {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(ch);
            in_space = false;
        }
    }
    out
}

/// Cascades `color`, `font-weight` and `text-decoration` from the tag and
/// class selectors matching `element`; later, more specific matches win.
fn style_for(sheet: &StyleSheet, element: &ElementData, inherited: TextEffects) -> TextEffects {
    let mut effects = inherited;
    let tag = element.tag.as_str();

    let mut selectors = vec![tag.to_owned()];
    for class in element.classes() {
        selectors.push(format!(".{class}"));
        selectors.push(format!("{tag}.{class}"));
    }

    for selector in &selectors {
        if let Some(color) = sheet
            .computed(selector, "color")
            .and_then(|value| Color::parse(&value))
        {
            effects.color = Some(color);
        }
        if let Some(weight) = sheet.computed(selector, "font-weight") {
            effects.bold = is_bold(&weight);
        }
        if let Some(decoration) = sheet.computed(selector, "text-decoration") {
            effects.underline = decoration.split_whitespace().any(|part| part == "underline");
        }
    }
    effects
}

fn is_bold(weight: &str) -> bool {
    match weight.trim() {
        "bold" | "bolder" => true,
        numeric => numeric.parse::<u16>().is_ok_and(|value| value >= 600),
    }
}
