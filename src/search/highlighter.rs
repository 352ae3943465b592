//! Search highlighting over a content tree
//!
//! Every query change first removes all existing marks, then re-scans the
//! text runs of the tree for the new query. A run with matches becomes one
//! [`Node::Marked`] group; removing the marks collapses the group back into
//! a single [`Node::Text`], so highlighting never leaves anything behind.

use std::ops::Range;

use super::matcher::LiteralMatcher;
use crate::document::{Fragment, Node, TextTree};

/// Queries shorter than this many characters are not searched
pub const DEFAULT_MIN_QUERY_CHARS: usize = 3;

/// Where a mark sits in the tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkLocation {
    /// Index of the root container (section)
    pub section: usize,
    /// Ordinal of the text run within its section, in document order
    pub run: usize,
    /// Character range of the match within its run
    pub chars: Range<usize>,
    /// The matched text as it appears in the document
    pub text: String,
}

/// Maintains one transient highlight pass for the current query
#[derive(Debug, Clone)]
pub struct SearchHighlighter {
    /// Current query, as typed
    query: String,
    /// Matcher for the current query (None when nothing is highlighted)
    matcher: Option<LiteralMatcher>,
    /// Minimum query length in characters
    min_chars: usize,
}

impl SearchHighlighter {
    /// Create a highlighter with the default minimum query length
    pub fn new() -> Self {
        Self::with_min_chars(DEFAULT_MIN_QUERY_CHARS)
    }

    /// Create a highlighter that ignores queries shorter than `min_chars`
    pub fn with_min_chars(min_chars: usize) -> Self {
        Self {
            query: String::new(),
            matcher: None,
            min_chars: min_chars.max(1),
        }
    }

    /// The current query
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Whether the current query is long enough to be highlighted
    pub fn is_active(&self) -> bool {
        self.matcher.is_some()
    }

    pub fn min_chars(&self) -> usize {
        self.min_chars
    }

    /// Replace the current query, re-highlighting the tree
    ///
    /// Returns the number of marks created.
    pub fn set_query<T: TextTree + ?Sized>(&mut self, tree: &mut T, query: &str) -> usize {
        let removed = remove_marks(tree);
        self.query = query.to_string();
        self.matcher = None;

        if query.chars().count() < self.min_chars {
            tracing::trace!(removed, "query below minimum length");
            return 0;
        }

        let matcher = match LiteralMatcher::new(query) {
            Some(matcher) => matcher,
            None => return 0,
        };

        let mut created = 0;
        tree.visit_leaves_mut(|_, node| {
            let fragments = match node {
                Node::Text(text) => matcher.split(text),
                _ => None,
            };
            if let Some(fragments) = fragments {
                created += fragments.iter().filter(|f| f.is_mark()).count();
                *node = Node::Marked(fragments);
            }
        });

        tracing::debug!(query, removed, created, "highlight pass");
        self.matcher = Some(matcher);
        created
    }

    /// Remove every mark, restoring the original text runs
    ///
    /// The query is kept; calling this on a clean tree does nothing.
    pub fn clear<T: TextTree + ?Sized>(&mut self, tree: &mut T) {
        let removed = remove_marks(tree);
        if removed > 0 {
            tracing::debug!(removed, "highlights cleared");
        }
        self.matcher = None;
    }

    /// Remove every mark and forget the query
    pub fn reset<T: TextTree + ?Sized>(&mut self, tree: &mut T) {
        self.clear(tree);
        self.query.clear();
    }

    /// Number of marks currently in the tree
    pub fn mark_count<T: TextTree + ?Sized>(&self, tree: &T) -> usize {
        let mut count = 0;
        tree.visit_leaves(|_, node| {
            if let Node::Marked(fragments) = node {
                count += fragments.iter().filter(|f| f.is_mark()).count();
            }
        });
        count
    }

    /// Every mark in document order
    pub fn marks<T: TextTree + ?Sized>(&self, tree: &T) -> Vec<MarkLocation> {
        let mut marks = Vec::new();
        let mut current_section = usize::MAX;
        let mut run = 0;

        tree.visit_leaves(|section, node| {
            if section != current_section {
                current_section = section;
                run = 0;
            } else {
                run += 1;
            }

            if let Node::Marked(fragments) = node {
                let mut offset = 0;
                for fragment in fragments {
                    let len = fragment.text().chars().count();
                    if let Fragment::Mark(text) = fragment {
                        marks.push(MarkLocation {
                            section,
                            run,
                            chars: offset..offset + len,
                            text: text.clone(),
                        });
                    }
                    offset += len;
                }
            }
        });

        marks
    }
}

impl Default for SearchHighlighter {
    fn default() -> Self {
        Self::new()
    }
}

/// Collapse every marked run back into a single text run
fn remove_marks<T: TextTree + ?Sized>(tree: &mut T) -> usize {
    let mut removed = 0;
    tree.visit_leaves_mut(|_, node| {
        let restored = match node {
            Node::Marked(fragments) => Some(fragments.iter().map(Fragment::text).collect::<String>()),
            _ => None,
        };
        if let Some(text) = restored {
            *node = Node::Text(text);
            removed += 1;
        }
    });
    removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{ContentTree, Element, ElementKind};

    fn tree_with(runs: &[&str]) -> ContentTree {
        let mut section = Element::new(ElementKind::Section).with_id("s");
        for run in runs {
            section = section.with_child(Element::new(ElementKind::Paragraph).with_text(*run));
        }
        ContentTree::new("t").with_section(section)
    }

    fn marked_texts(hl: &SearchHighlighter, tree: &ContentTree) -> Vec<String> {
        hl.marks(tree).into_iter().map(|m| m.text).collect()
    }

    #[test]
    fn test_clear_is_idempotent() {
        let mut tree = tree_with(&["a sound heart", "the heart of it"]);
        let mut hl = SearchHighlighter::new();
        hl.set_query(&mut tree, "heart");

        hl.clear(&mut tree);
        let once = tree.clone();
        hl.clear(&mut tree);
        assert_eq!(tree, once);
        assert_eq!(hl.mark_count(&tree), 0);
    }

    #[test]
    fn test_round_trip_restores_tree() {
        let original = tree_with(&["a sound heart", "HEART heart", "", "nothing"]);
        let mut tree = original.clone();
        let mut hl = SearchHighlighter::new();

        for query in ["hea", "heart", "heart ", "ea", "zzz", "sound heart"] {
            hl.set_query(&mut tree, query);
        }
        hl.clear(&mut tree);

        assert_eq!(tree.text_content(), original.text_content());
        assert_eq!(tree, original);
    }

    #[test]
    fn test_short_queries_are_ignored() {
        let mut tree = tree_with(&["abcabc"]);
        let mut hl = SearchHighlighter::new();

        assert_eq!(hl.set_query(&mut tree, "a"), 0);
        assert_eq!(hl.mark_count(&tree), 0);
        assert_eq!(hl.set_query(&mut tree, "ab"), 0);
        assert_eq!(hl.mark_count(&tree), 0);
        assert!(!hl.is_active());

        assert_eq!(hl.set_query(&mut tree, "abc"), 2);
        assert!(hl.mark_count(&tree) >= 1);
        assert!(hl.is_active());
    }

    #[test]
    fn test_short_query_still_clears_previous_marks() {
        let mut tree = tree_with(&["abcabc"]);
        let mut hl = SearchHighlighter::new();
        hl.set_query(&mut tree, "abc");
        hl.set_query(&mut tree, "ab");
        assert_eq!(hl.mark_count(&tree), 0);
        assert_eq!(hl.query(), "ab");
    }

    #[test]
    fn test_case_insensitive_single_match() {
        let mut tree = tree_with(&["Allah is Great"]);
        let mut hl = SearchHighlighter::new();
        assert_eq!(hl.set_query(&mut tree, "ALLAH"), 1);

        let marks = hl.marks(&tree);
        assert_eq!(marks.len(), 1);
        assert_eq!(marks[0].text, "Allah");
        assert_eq!(marks[0].chars, 0..5);
    }

    #[test]
    fn test_matches_do_not_overlap() {
        let mut tree = tree_with(&["aaaa"]);
        let mut hl = SearchHighlighter::with_min_chars(2);
        assert_eq!(hl.set_query(&mut tree, "aa"), 2);

        let ranges: Vec<_> = hl.marks(&tree).into_iter().map(|m| m.chars).collect();
        assert_eq!(ranges, vec![0..2, 2..4]);
    }

    #[test]
    fn test_query_is_literal_text() {
        let mut tree = tree_with(&["a.b and axb"]);
        let mut hl = SearchHighlighter::with_min_chars(1);

        hl.set_query(&mut tree, ".");
        assert_eq!(marked_texts(&hl, &tree), vec!["."]);

        hl.set_query(&mut tree, "a.b");
        assert_eq!(marked_texts(&hl, &tree), vec!["a.b"]);

        // Unbalanced metacharacters must not fail
        assert_eq!(hl.set_query(&mut tree, "(a["), 0);
    }

    #[test]
    fn test_requery_replaces_marks() {
        let mut tree = tree_with(&["foo and bar", "bar foo"]);
        let mut hl = SearchHighlighter::new();

        hl.set_query(&mut tree, "foo");
        assert_eq!(marked_texts(&hl, &tree), vec!["foo", "foo"]);

        hl.set_query(&mut tree, "bar");
        assert_eq!(marked_texts(&hl, &tree), vec!["bar", "bar"]);
        assert_eq!(hl.mark_count(&tree), 2);
    }

    #[test]
    fn test_same_query_twice_is_stable() {
        let mut tree = tree_with(&["heart heart"]);
        let mut hl = SearchHighlighter::new();
        hl.set_query(&mut tree, "heart");
        let first = tree.clone();
        hl.set_query(&mut tree, "heart");
        assert_eq!(tree, first);
    }

    #[test]
    fn test_empty_tree_and_empty_sections() {
        let mut empty = ContentTree::default();
        let mut hl = SearchHighlighter::new();
        assert_eq!(hl.set_query(&mut empty, "anything"), 0);

        let mut tree = ContentTree::new("t")
            .with_section(Element::new(ElementKind::Section))
            .with_section(Element::new(ElementKind::Section).with_child(Element::new(ElementKind::Paragraph)));
        assert_eq!(hl.set_query(&mut tree, "anything"), 0);
        hl.clear(&mut tree);
    }

    #[test]
    fn test_arabic_match_offsets_are_characters() {
        let text = "قال رسول الله صلى الله عليه وسلم";
        let mut tree = tree_with(&[text]);
        let mut hl = SearchHighlighter::new();

        assert_eq!(hl.set_query(&mut tree, "الله"), 2);
        let marks = hl.marks(&tree);
        assert_eq!(marks[0].chars, 9..13);
        let chars: Vec<char> = text.chars().collect();
        let found: String = chars[marks[0].chars.clone()].iter().collect();
        assert_eq!(found, "الله");

        hl.clear(&mut tree);
        assert_eq!(tree.text_content(), text);
    }

    #[test]
    fn test_matches_stay_within_runs() {
        let section = Element::new(ElementKind::Section).with_child(
            Element::new(ElementKind::Paragraph)
                .with_text("sou")
                .with_child(Element::new(ElementKind::Strong).with_text("nd heart"))
                .with_text(" sound"),
        );
        let mut tree = ContentTree::new("t").with_section(section);
        let original = tree.clone();
        let mut hl = SearchHighlighter::new();

        assert_eq!(hl.set_query(&mut tree, "sound"), 1);
        let marks = hl.marks(&tree);
        assert_eq!(marks[0].run, 2);
        assert_eq!(marks[0].chars, 1..6);

        hl.reset(&mut tree);
        assert_eq!(tree, original);
        assert_eq!(hl.query(), "");
    }

    #[test]
    fn test_adjacent_runs_are_not_merged() {
        let section = Element::new(ElementKind::Section).with_child(
            Element::new(ElementKind::Paragraph)
                .with_text("heart")
                .with_text("heart"),
        );
        let mut tree = ContentTree::new("t").with_section(section);
        let original = tree.clone();
        let mut hl = SearchHighlighter::new();

        hl.set_query(&mut tree, "heart");
        hl.clear(&mut tree);
        assert_eq!(tree, original);
    }

    #[test]
    fn test_mark_locations_per_section() {
        let mut tree = ContentTree::new("t")
            .with_section(Element::new(ElementKind::Section).with_text("one heart"))
            .with_section(
                Element::new(ElementKind::Section)
                    .with_text("none")
                    .with_text("two hearts"),
            );
        let mut hl = SearchHighlighter::new();
        hl.set_query(&mut tree, "heart");

        let marks = hl.marks(&tree);
        assert_eq!(marks.len(), 2);
        assert_eq!((marks[0].section, marks[0].run), (0, 0));
        assert_eq!((marks[1].section, marks[1].run), (1, 1));
        assert_eq!(marks[1].chars, 4..9);
    }

    mod round_trip {
        use super::*;
        use proptest::prelude::*;

        fn arb_tree() -> impl Strategy<Value = ContentTree> {
            let run = "[aAbB. َال]{0,10}";
            let block = prop::collection::vec(run, 0..4);
            let section = prop::collection::vec(block, 0..4);
            prop::collection::vec(section, 0..4).prop_map(|sections| {
                let mut tree = ContentTree::new("t");
                for blocks in sections {
                    let mut section = Element::new(ElementKind::Section);
                    for runs in blocks {
                        let mut para = Element::new(ElementKind::Paragraph);
                        for (i, text) in runs.into_iter().enumerate() {
                            if i % 2 == 1 {
                                para = para.with_child(Element::new(ElementKind::Strong).with_text(text));
                            } else {
                                para.push_text(text);
                            }
                        }
                        section = section.with_child(para);
                    }
                    tree.sections.push(section);
                }
                tree
            })
        }

        proptest! {
            #[test]
            fn any_query_sequence_then_clear_restores_tree(
                original in arb_tree(),
                queries in prop::collection::vec("[aAbB. َال]{0,4}", 1..6),
            ) {
                let mut tree = original.clone();
                let mut hl = SearchHighlighter::new();
                for query in &queries {
                    hl.set_query(&mut tree, query);
                    prop_assert_eq!(tree.text_content(), original.text_content());
                }
                hl.clear(&mut tree);
                prop_assert_eq!(tree.text_content(), original.text_content());
                prop_assert_eq!(&tree, &original);
            }
        }
    }
}
