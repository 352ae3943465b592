//! Incremental search
//!
//! - [`LiteralMatcher`]: escaped, case-insensitive substring matching
//! - [`SearchHighlighter`]: marks every match in a content tree and removes
//!   the marks again without residue

mod highlighter;
mod matcher;

pub use highlighter::{SearchHighlighter, DEFAULT_MIN_QUERY_CHARS};
