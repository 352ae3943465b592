//! Layout: flattening the content tree into wrapped display lines
//!
//! Every line carries styled segments plus the section it belongs to.
//! The layout also records where each section starts, where each quoted
//! block sits, and which lines hold search marks.

use unicode_width::UnicodeWidthChar;

use crate::document::{ContentTree, Element, ElementKind, Fragment, Node};

/// Presentation role of a piece of text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Heading,
    Body,
    Quote,
    Source,
    Strong,
    Bullet,
    Mark,
}

/// A run of text with one role
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub text: String,
    pub role: Role,
}

impl Segment {
    pub fn new(text: impl Into<String>, role: Role) -> Self {
        Self {
            text: text.into(),
            role,
        }
    }
}

/// One screen line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayLine {
    pub segments: Vec<Segment>,
    /// Section the line belongs to
    pub section: usize,
}

impl DisplayLine {
    pub fn has_mark(&self) -> bool {
        self.segments.iter().any(|s| s.role == Role::Mark)
    }
}

/// Lines occupied by a quoted block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockSpan {
    pub section: usize,
    /// Index of the block among its section's children
    pub child: usize,
    pub kind: ElementKind,
    /// First line
    pub start: usize,
    /// One past the last line
    pub end: usize,
}

/// The laid out lesson
#[derive(Debug, Clone, Default)]
pub struct Layout {
    pub lines: Vec<DisplayLine>,
    /// First line of each section
    pub section_starts: Vec<usize>,
    /// Quoted blocks, in document order
    pub quotes: Vec<BlockSpan>,
    /// Lines containing at least one mark, ascending
    pub mark_lines: Vec<usize>,
    /// Width the layout was computed for
    pub width: usize,
}

impl Layout {
    /// Lay out `tree` for a given width (at least 1 column)
    pub fn build(tree: &ContentTree, width: usize) -> Self {
        let width = width.max(1);
        let mut layout = Layout {
            width,
            ..Default::default()
        };

        for (section_idx, section) in tree.sections.iter().enumerate() {
            if section_idx > 0 {
                layout.push_blank(section_idx - 1);
            }
            layout.section_starts.push(layout.lines.len());

            let mut loose = Vec::new();
            for (child_idx, child) in section.children.iter().enumerate() {
                match child {
                    Node::Element(block) => {
                        layout.flush_loose(section_idx, &mut loose);
                        layout.push_block(section_idx, child_idx, block);
                    }
                    leaf => collect_leaf(leaf, Role::Body, &mut loose),
                }
            }
            layout.flush_loose(section_idx, &mut loose);
        }

        for (idx, line) in layout.lines.iter().enumerate() {
            if line.has_mark() {
                layout.mark_lines.push(idx);
            }
        }

        layout
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn line(&self, idx: usize) -> Option<&DisplayLine> {
        self.lines.get(idx)
    }

    fn push_blank(&mut self, section: usize) {
        self.lines.push(DisplayLine {
            segments: Vec::new(),
            section,
        });
    }

    fn push_wrapped(&mut self, section: usize, segments: &[Segment], indent: usize) {
        for segments in wrap(segments, self.width.saturating_sub(indent).max(1)) {
            let mut line = Vec::with_capacity(segments.len() + 1);
            if indent > 0 {
                line.push(Segment::new(" ".repeat(indent), Role::Body));
            }
            line.extend(segments);
            self.lines.push(DisplayLine {
                segments: line,
                section,
            });
        }
    }

    fn flush_loose(&mut self, section: usize, loose: &mut Vec<Segment>) {
        if !loose.is_empty() {
            self.push_wrapped(section, loose, 0);
            self.push_blank(section);
            loose.clear();
        }
    }

    fn push_block(&mut self, section: usize, child: usize, block: &Element) {
        let start = self.lines.len();

        match block.kind {
            ElementKind::List => {
                for node in &block.children {
                    let mut segments = vec![Segment::new("• ", Role::Bullet)];
                    collect_leaf(node, Role::Body, &mut segments);
                    self.push_wrapped(section, &segments, 0);
                }
            }
            kind => {
                let base = match kind {
                    ElementKind::Heading => Role::Heading,
                    k if k.is_quote() => Role::Quote,
                    _ => Role::Body,
                };
                let indent = if kind.is_quote() { 2 } else { 0 };

                let mut body = Vec::new();
                let mut sources = Vec::new();
                for node in &block.children {
                    match node {
                        Node::Element(el) if el.kind == ElementKind::Source => sources.push(el),
                        _ => collect_leaf(node, base, &mut body),
                    }
                }
                if !body.is_empty() {
                    self.push_wrapped(section, &body, indent);
                }
                for source in sources {
                    let mut segments = vec![Segment::new("— ", Role::Source)];
                    collect_leaf_children(source, Role::Source, &mut segments);
                    self.push_wrapped(section, &segments, indent);
                }
            }
        }

        if block.kind.is_quote() {
            self.quotes.push(BlockSpan {
                section,
                child,
                kind: block.kind,
                start,
                end: self.lines.len(),
            });
        }
        self.push_blank(section);
    }
}

/// Append the segments of a node (recursing into inline containers)
fn collect_leaf(node: &Node, base: Role, out: &mut Vec<Segment>) {
    match node {
        Node::Text(text) => out.push(Segment::new(text.clone(), base)),
        Node::Marked(fragments) => {
            for fragment in fragments {
                let role = match fragment {
                    Fragment::Mark(_) => Role::Mark,
                    Fragment::Plain(_) => base,
                };
                out.push(Segment::new(fragment.text(), role));
            }
        }
        Node::Element(el) => {
            let role = if el.kind == ElementKind::Strong && base != Role::Heading {
                Role::Strong
            } else {
                base
            };
            collect_leaf_children(el, role, out);
        }
    }
}

fn collect_leaf_children(el: &Element, base: Role, out: &mut Vec<Segment>) {
    for child in &el.children {
        collect_leaf(child, base, out);
    }
}

/// Greedy word wrap of styled segments to `width` display columns
///
/// Words wider than a line are broken between characters. Embedded
/// newlines start a new line.
pub fn wrap(segments: &[Segment], width: usize) -> Vec<Vec<Segment>> {
    let width = width.max(1);
    let mut lines: Vec<Vec<(char, Role)>> = vec![Vec::new()];
    let mut line_width = 0;
    let mut word: Vec<(char, Role)> = Vec::new();
    let mut word_width = 0;

    fn place(
        lines: &mut Vec<Vec<(char, Role)>>,
        line_width: &mut usize,
        word: &mut Vec<(char, Role)>,
        word_width: &mut usize,
        width: usize,
    ) {
        if *line_width + *word_width > width && *line_width > 0 {
            lines.push(Vec::new());
            *line_width = 0;
        }
        for (ch, role) in word.drain(..) {
            let w = ch.width().unwrap_or(0);
            if *line_width + w > width && *line_width > 0 {
                lines.push(Vec::new());
                *line_width = 0;
            }
            if let Some(current) = lines.last_mut() {
                current.push((ch, role));
            }
            *line_width += w;
        }
        *word_width = 0;
    }

    for segment in segments {
        for ch in segment.text.chars() {
            if ch == '\n' {
                place(&mut lines, &mut line_width, &mut word, &mut word_width, width);
                lines.push(Vec::new());
                line_width = 0;
                continue;
            }
            word.push((ch, segment.role));
            word_width += ch.width().unwrap_or(0);
            if ch.is_whitespace() {
                place(&mut lines, &mut line_width, &mut word, &mut word_width, width);
            }
        }
    }
    place(&mut lines, &mut line_width, &mut word, &mut word_width, width);

    lines.into_iter().map(merge_roles).collect()
}

/// Join consecutive characters with the same role into segments
fn merge_roles(chars: Vec<(char, Role)>) -> Vec<Segment> {
    let mut segments: Vec<Segment> = Vec::new();
    for (ch, role) in chars {
        match segments.last_mut() {
            Some(last) if last.role == role => last.text.push(ch),
            _ => segments.push(Segment::new(ch.to_string(), role)),
        }
    }
    segments
}

/// Render the layout as plain text, marks wrapped in «»
pub fn render_plain(layout: &Layout) -> String {
    let mut out = String::new();
    for line in &layout.lines {
        for segment in &line.segments {
            if segment.role == Role::Mark {
                out.push('«');
                out.push_str(&segment.text);
                out.push('»');
            } else {
                out.push_str(&segment.text);
            }
        }
        let trimmed = out.trim_end_matches(' ').len();
        out.truncate(trimmed);
        out.push('\n');
    }
    out
}
