//! Literal, case-insensitive substring matching
//!
//! The query is always escaped before it is compiled, so characters such as
//! `.`, `*` or `(` only ever match themselves.

use std::ops::Range;

use regex::{Regex, RegexBuilder};

use crate::document::Fragment;

/// Matches one query literally, ignoring case
#[derive(Debug, Clone)]
pub struct LiteralMatcher {
    /// Compiled, escaped pattern
    pattern: Regex,
}

impl LiteralMatcher {
    /// Build a matcher for `query`
    ///
    /// Returns None for an empty query or when the pattern cannot be
    /// compiled (for instance when it exceeds the regex size limit).
    pub fn new(query: &str) -> Option<Self> {
        if query.is_empty() {
            return None;
        }
        match RegexBuilder::new(&regex::escape(query))
            .case_insensitive(true)
            .build()
        {
            Ok(pattern) => Some(Self { pattern }),
            Err(err) => {
                tracing::warn!(error = %err, "could not build search pattern");
                None
            }
        }
    }

    /// Byte ranges of every non-overlapping match, left to right
    pub fn find_spans(&self, text: &str) -> Vec<Range<usize>> {
        self.pattern.find_iter(text).map(|m| m.range()).collect()
    }

    /// Split `text` into plain and marked fragments
    ///
    /// Returns None when there is no match. The fragments concatenate back
    /// to exactly `text`.
    pub fn split(&self, text: &str) -> Option<Vec<Fragment>> {
        let spans = self.find_spans(text);
        if spans.is_empty() {
            return None;
        }

        let mut fragments = Vec::with_capacity(spans.len() * 2 + 1);
        let mut pos = 0;
        for span in spans {
            if span.start > pos {
                fragments.push(Fragment::Plain(text[pos..span.start].to_string()));
            }
            fragments.push(Fragment::Mark(text[span.clone()].to_string()));
            pos = span.end;
        }
        if pos < text.len() {
            fragments.push(Fragment::Plain(text[pos..].to_string()));
        }

        Some(fragments)
    }
}
