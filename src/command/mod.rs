//! Command dispatch system
//!
//! This module provides the key binding table and command implementations.
//! Commands are organized into submodules by category.

mod misc;
mod navigation;
mod search;

use std::collections::HashMap;

use crate::error::Result;
use crate::input::{special, Key};
use crate::viewer::Viewer;

/// Command result status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandStatus {
    Success,
    Failure,
    Abort,
}

/// Command function signature
pub type CommandFn = fn(&mut Viewer) -> Result<CommandStatus>;

/// Key binding entry with command function and name
struct BindingEntry {
    function: CommandFn,
    name: &'static str,
}

/// Key binding table
pub struct KeyTable {
    bindings: HashMap<u32, BindingEntry>,
}

impl KeyTable {
    /// Create an empty key table
    pub fn new() -> Self {
        Self {
            bindings: HashMap::new(),
        }
    }

    /// Create key table with default bindings
    pub fn with_defaults() -> Self {
        let mut table = Self::new();
        table.setup_defaults();
        table
    }

    /// Add a key binding with command name
    pub fn bind_named(&mut self, key: Key, cmd: CommandFn, name: &'static str) {
        self.bindings.insert(key.code(), BindingEntry { function: cmd, name });
    }

    /// Look up a command for a key
    pub fn lookup(&self, key: Key) -> Option<CommandFn> {
        self.bindings.get(&key.code()).map(|e| e.function)
    }

    /// Look up a command name for a key
    pub fn lookup_name(&self, key: Key) -> Option<&'static str> {
        self.bindings.get(&key.code()).map(|e| e.name)
    }

    /// Get all bindings as (key, command_name) pairs, sorted by name
    pub fn all_bindings(&self) -> Vec<(Key, &'static str)> {
        let mut bindings: Vec<_> = self
            .bindings
            .iter()
            .map(|(&code, entry)| (Key(code), entry.name))
            .collect();
        bindings.sort_by(|a, b| a.1.cmp(b.1).then(a.0.code().cmp(&b.0.code())));
        bindings
    }

    /// Set up default key bindings
    fn setup_defaults(&mut self) {
        use misc::*;
        use navigation::*;
        use search::*;

        // Line movement
        self.bind_named(Key::ctrl('n'), scroll_line_down, "scroll-line-down");
        self.bind_named(Key::ctrl('p'), scroll_line_up, "scroll-line-up");
        self.bind_named(Key::char('j'), scroll_line_down, "scroll-line-down");
        self.bind_named(Key::char('k'), scroll_line_up, "scroll-line-up");
        self.bind_named(Key::special(special::DOWN), scroll_line_down, "scroll-line-down");
        self.bind_named(Key::special(special::UP), scroll_line_up, "scroll-line-up");

        // Page movement
        self.bind_named(Key::ctrl('v'), scroll_page_down, "scroll-page-down");
        self.bind_named(Key::meta('v'), scroll_page_up, "scroll-page-up");
        self.bind_named(Key::char(' '), scroll_page_down, "scroll-page-down");
        self.bind_named(Key::special(special::PAGE_DOWN), scroll_page_down, "scroll-page-down");
        self.bind_named(Key::special(special::PAGE_UP), scroll_page_up, "scroll-page-up");

        // Whole lesson
        self.bind_named(Key::meta('<'), scroll_to_top, "scroll-to-top");
        self.bind_named(Key::meta('>'), scroll_to_bottom, "scroll-to-bottom");
        self.bind_named(Key::special(special::HOME), scroll_to_top, "scroll-to-top");
        self.bind_named(Key::special(special::END), scroll_to_bottom, "scroll-to-bottom");
        self.bind_named(Key::char('t'), scroll_to_top, "scroll-to-top");

        // Sections
        self.bind_named(Key::char(']'), next_section, "next-section");
        self.bind_named(Key::char('['), previous_section, "previous-section");

        // Search
        self.bind_named(Key::ctrl('f'), open_search, "open-search");
        self.bind_named(Key::char('/'), open_search, "open-search");
        self.bind_named(Key::ctrl('s'), next_match, "next-match");
        self.bind_named(Key::ctrl('r'), previous_match, "previous-match");
        self.bind_named(Key::char('n'), next_match, "next-match");
        self.bind_named(Key::char('N'), previous_match, "previous-match");

        // Copy
        self.bind_named(Key::char('c'), copy_quote, "copy-quote");
        self.bind_named(Key::meta('w'), copy_quote, "copy-quote");
        self.bind_named(Key::char('y'), show_last_copy, "show-last-copy");

        // Screen refresh
        self.bind_named(Key::ctrl('l'), redraw_display, "redraw-display");

        // Help
        self.bind_named(Key::special(special::F1), describe_bindings, "describe-bindings");
        self.bind_named(Key::char('?'), describe_bindings, "describe-bindings");

        // Quit
        self.bind_named(Key::char('q'), quit, "quit");
        self.bind_named(Key::ctlx_ctrl('c'), quit, "quit");

        // Abort
        self.bind_named(Key::ctrl('g'), abort, "keyboard-quit");
    }
}

impl Default for KeyTable {
    fn default() -> Self {
        Self::with_defaults()
    }
}
