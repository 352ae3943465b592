//! Copying quoted blocks
//!
//! Copied text goes to the system clipboard; every successful copy is also
//! kept in a short history, most recent first. Copy problems are logged and
//! reported as messages; they never propagate.

use std::collections::VecDeque;

use crate::document::{ContentTree, Element, ElementKind, Node};
use crate::layout::BlockSpan;

/// Feedback shown after a successful copy
pub const COPIED_MESSAGE: &str = "✓ تم النسخ";

/// Destination for copied text
pub trait ClipboardSink {
    fn set_text(&mut self, text: &str) -> Result<(), String>;
}

/// The system clipboard
///
/// Opened on first use and kept open, so the copied text stays available
/// for as long as the viewer runs.
#[derive(Default)]
pub struct SystemClipboard {
    inner: Option<arboard::Clipboard>,
}

impl ClipboardSink for SystemClipboard {
    fn set_text(&mut self, text: &str) -> Result<(), String> {
        let clipboard = match self.inner.take() {
            Some(clipboard) => clipboard,
            None => arboard::Clipboard::new()
                .map_err(|e| format!("Failed to access clipboard: {}", e))?,
        };
        let clipboard = self.inner.insert(clipboard);
        clipboard
            .set_text(text)
            .map_err(|e| format!("Failed to copy to clipboard: {}", e))
    }
}

/// Copies to a sink, remembering the most recent ones
pub struct Clipboard {
    /// Most recent first
    history: VecDeque<String>,
    capacity: usize,
    sink: Box<dyn ClipboardSink>,
}

impl Clipboard {
    /// Copy to the system clipboard
    pub fn new(capacity: usize) -> Self {
        Self::with_sink(capacity, Box::new(SystemClipboard::default()))
    }

    pub fn with_sink(capacity: usize, sink: Box<dyn ClipboardSink>) -> Self {
        let capacity = capacity.max(1);
        Self {
            history: VecDeque::with_capacity(capacity),
            capacity,
            sink,
        }
    }

    /// Copy `text`. Returns false (and remembers nothing) for blank text or
    /// when the sink refuses it.
    pub fn copy(&mut self, text: &str) -> bool {
        if text.trim().is_empty() {
            tracing::warn!("nothing to copy");
            return false;
        }
        if let Err(err) = self.sink.set_text(text) {
            tracing::warn!(error = %err, "copy failed");
            return false;
        }
        self.history.push_front(text.to_string());
        self.history.truncate(self.capacity);
        tracing::debug!(chars = text.chars().count(), "copied block");
        true
    }

    /// Most recent copy
    pub fn latest(&self) -> Option<&str> {
        self.history.front().map(String::as_str)
    }
}

/// Pick the quoted block to copy for a view starting at `top`
///
/// Prefers the block the top line falls inside, then the first block that
/// starts on screen.
pub fn copy_target(quotes: &[BlockSpan], top: usize, height: usize) -> Option<BlockSpan> {
    quotes
        .iter()
        .find(|q| q.start <= top && top < q.end)
        .or_else(|| quotes.iter().find(|q| q.start >= top && q.start < top + height))
        .copied()
}

/// Text of a quoted block without its attribution
pub fn quote_text(tree: &ContentTree, span: &BlockSpan) -> Option<String> {
    let section = tree.sections.get(span.section)?;
    match section.children.get(span.child)? {
        Node::Element(block) => Some(text_without_source(block)),
        _ => None,
    }
}

fn text_without_source(el: &Element) -> String {
    let mut out = String::new();
    for child in &el.children {
        match child {
            Node::Element(inner) if inner.kind == ElementKind::Source => {}
            Node::Element(inner) => out.push_str(&text_without_source(inner)),
            leaf => leaf.write_text(&mut out),
        }
    }
    out
}
