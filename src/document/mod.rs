//! Lesson content tree
//!
//! A lesson is an ordered forest of section containers. Sections hold
//! blocks (paragraphs, verses, hadith, supplications, lists), blocks hold
//! text runs and inline containers. Text runs are the only nodes that carry
//! searchable text of their own.
//!
//! A text run that currently contains search matches is stored as a single
//! [`Node::Marked`] holding its plain and marked fragments in order, so the
//! run can be collapsed back into one [`Node::Text`] without touching its
//! neighbours.

mod loader;

pub use loader::load;
#[cfg(test)]
pub use loader::parse;

/// Structural role of a container node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Section,
    Heading,
    Paragraph,
    Ayah,
    Hadith,
    Duaa,
    Source,
    Strong,
    List,
    Item,
}

impl ElementKind {
    /// Parse a block kind as written in a lesson file
    pub fn from_block_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "paragraph" | "p" | "text" => Some(Self::Paragraph),
            "heading" | "h" => Some(Self::Heading),
            "ayah" | "verse" => Some(Self::Ayah),
            "hadith" => Some(Self::Hadith),
            "duaa" | "dua" => Some(Self::Duaa),
            "list" => Some(Self::List),
            _ => None,
        }
    }

    /// Quoted blocks are the ones readers copy
    pub fn is_quote(self) -> bool {
        matches!(self, Self::Ayah | Self::Hadith | Self::Duaa)
    }
}

/// Piece of a text run that has been split by search matches
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    Plain(String),
    Mark(String),
}

impl Fragment {
    pub fn text(&self) -> &str {
        match self {
            Fragment::Plain(text) | Fragment::Mark(text) => text,
        }
    }

    pub fn is_mark(&self) -> bool {
        matches!(self, Fragment::Mark(_))
    }
}

/// A node in the content tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Plain text run
    Text(String),
    /// Text run currently split into plain and marked fragments
    Marked(Vec<Fragment>),
    /// Container
    Element(Element),
}

impl Node {
    /// Append this node's text content to `out`
    pub fn write_text(&self, out: &mut String) {
        match self {
            Node::Text(text) => out.push_str(text),
            Node::Marked(fragments) => {
                for fragment in fragments {
                    out.push_str(fragment.text());
                }
            }
            Node::Element(element) => element.write_text(out),
        }
    }
}

/// A container node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub kind: ElementKind,
    pub id: Option<String>,
    pub children: Vec<Node>,
}

impl Element {
    /// Create an empty container
    pub fn new(kind: ElementKind) -> Self {
        Self {
            kind,
            id: None,
            children: Vec::new(),
        }
    }

    /// Builder: set the element id
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Builder: append a text run (empty runs are dropped)
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.push_text(text);
        self
    }

    /// Builder: append a child container
    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(Node::Element(child));
        self
    }

    /// Append a text run (empty runs are dropped)
    pub fn push_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        if !text.is_empty() {
            self.children.push(Node::Text(text));
        }
    }

    /// Concatenated text of every leaf below this element
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.write_text(&mut out);
        out
    }

    fn write_text(&self, out: &mut String) {
        for child in &self.children {
            child.write_text(out);
        }
    }

    /// Visit every text leaf below this element in document order
    pub fn visit_leaves<F: FnMut(&Node)>(&self, f: &mut F) {
        for child in &self.children {
            match child {
                Node::Element(element) => element.visit_leaves(f),
                _ => f(child),
            }
        }
    }

    /// Visit every text leaf below this element in document order, mutably
    pub fn visit_leaves_mut<F: FnMut(&mut Node)>(&mut self, f: &mut F) {
        for child in &mut self.children {
            match child {
                Node::Element(element) => element.visit_leaves_mut(f),
                _ => f(child),
            }
        }
    }
}

/// A searchable set of root containers
///
/// Traversals never leave the roots returned here.
pub trait TextTree {
    fn roots(&self) -> &[Element];
    fn roots_mut(&mut self) -> &mut [Element];

    /// Visit every text leaf with the index of its root
    fn visit_leaves<F: FnMut(usize, &Node)>(&self, mut f: F) {
        for (idx, root) in self.roots().iter().enumerate() {
            root.visit_leaves(&mut |node: &Node| f(idx, node));
        }
    }

    /// Visit every text leaf mutably with the index of its root
    fn visit_leaves_mut<F: FnMut(usize, &mut Node)>(&mut self, mut f: F) {
        for (idx, root) in self.roots_mut().iter_mut().enumerate() {
            root.visit_leaves_mut(&mut |node: &mut Node| f(idx, node));
        }
    }

    /// Concatenated text of all roots
    fn text_content(&self) -> String {
        let mut out = String::new();
        for root in self.roots() {
            root.write_text(&mut out);
        }
        out
    }
}

/// A loaded lesson
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentTree {
    /// Lesson title (shown in the mode line, not searched)
    pub title: String,
    /// Section containers in document order
    pub sections: Vec<Element>,
}

impl ContentTree {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            sections: Vec::new(),
        }
    }

    /// Builder: append a section
    pub fn with_section(mut self, section: Element) -> Self {
        self.sections.push(section);
        self
    }

    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    /// Section id, falling back to its position
    pub fn section_id(&self, idx: usize) -> String {
        self.sections
            .get(idx)
            .and_then(|s| s.id.clone())
            .unwrap_or_else(|| format!("section-{}", idx + 1))
    }

    /// Text of the section's heading, if it has one
    pub fn section_title(&self, idx: usize) -> Option<String> {
        let section = self.sections.get(idx)?;
        section.children.iter().find_map(|child| match child {
            Node::Element(el) if el.kind == ElementKind::Heading => Some(el.text_content()),
            _ => None,
        })
    }
}

impl TextTree for ContentTree {
    fn roots(&self) -> &[Element] {
        &self.sections
    }

    fn roots_mut(&mut self) -> &mut [Element] {
        &mut self.sections
    }
}
