//! Viewer state and main loop
//!
//! The viewer owns the lesson tree and every piece of UI state. It does not
//! own the terminal: `run` borrows one, everything else works headless so
//! key handling can be driven directly.

use std::time::{Duration, Instant};

use crate::clipboard::{self, Clipboard, COPIED_MESSAGE};
use crate::command::{CommandStatus, KeyTable};
use crate::config::Config;
use crate::display::{Chrome, Display};
use crate::document::ContentTree;
use crate::error::Result;
use crate::input::{special, InputState, Key, BACKSPACE};
use crate::layout::Layout;
use crate::navigation::Navigator;
use crate::search::SearchHighlighter;
use crate::search_bar::{Debouncer, SearchBar};
use crate::style::Theme;
use crate::terminal::{TermEvent, Terminal};
use crate::viewport::Viewport;

/// Rows taken by the mode line and the minibuffer
const CHROME_ROWS: u16 = 2;

/// Direction for match navigation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

/// Main viewer state
pub struct Viewer {
    /// The lesson being read
    pub tree: ContentTree,
    /// Highlights matches inside `tree`
    pub highlighter: SearchHighlighter,
    pub search_bar: SearchBar,
    pub debouncer: Debouncer,
    /// Wrapped lines for the current width and marks
    pub layout: Layout,
    pub viewport: Viewport,
    pub navigator: Navigator,
    pub clipboard: Clipboard,
    pub display: Display,
    pub input: InputState,
    pub keytab: KeyTable,
    pub theme: Theme,
    pub config: Config,
    /// Whether the viewer is running
    pub running: bool,
    /// Marks created by the last applied query
    match_count: usize,
    /// Index into `layout.mark_lines` of the last match jumped to
    match_cursor: Option<usize>,
    /// Terminal width
    cols: usize,
    /// When the key being handled arrived
    key_time: Instant,
}

impl Viewer {
    /// Create a viewer for a `cols` x `rows` screen
    pub fn new(tree: ContentTree, config: Config, cols: u16, rows: u16) -> Self {
        let cols = cols.max(1) as usize;
        let width = wrap_width(&config, cols);
        let layout = Layout::build(&tree, width);
        let mut viewport = Viewport::new(text_rows(rows));
        viewport.set_height(text_rows(rows), layout.len());

        Self {
            highlighter: SearchHighlighter::with_min_chars(config.min_query_chars),
            search_bar: SearchBar::new(),
            debouncer: Debouncer::new(config.debounce()),
            navigator: Navigator::from_config(&config),
            clipboard: Clipboard::new(config.clipboard_size),
            display: Display::new(),
            input: InputState::new(),
            keytab: KeyTable::with_defaults(),
            theme: Theme::default(),
            running: true,
            match_count: 0,
            match_cursor: None,
            tree,
            layout,
            viewport,
            config,
            cols,
            key_time: Instant::now(),
        }
    }

    /// Run the main loop until quit
    pub fn run(&mut self, terminal: &mut Terminal) -> Result<()> {
        self.resize(terminal.cols(), terminal.rows());

        while self.running {
            self.render(terminal)?;

            // Wake up for pending searches and expiring messages
            if let Some(wait) = self.next_deadline(Instant::now()) {
                if !terminal.poll_event(wait)? {
                    self.tick(Instant::now());
                    continue;
                }
            }

            match terminal.read_event()? {
                TermEvent::Key(key_event) => {
                    if let Some(key) = self.input.translate_key(key_event) {
                        self.handle_key(key, Instant::now())?;
                    } else if self.input.is_pending() {
                        self.display.set_message("C-x -");
                    }
                }
                TermEvent::Resize(cols, rows) => self.resize(cols, rows),
            }
            self.tick(Instant::now());
        }

        Ok(())
    }

    fn render(&mut self, terminal: &mut Terminal) -> Result<()> {
        let mode_line = self.mode_line();
        let minibuffer = self.minibuffer_text();
        let chrome = Chrome {
            mode_line: &mode_line,
            minibuffer: &minibuffer,
            minibuffer_cursor: self.search_bar.is_focused() && self.display.message().is_none(),
        };
        self.display
            .render(terminal, &self.layout, &self.viewport, &self.theme, &chrome)
    }

    /// Handle a key press
    pub fn handle_key(&mut self, key: Key, now: Instant) -> Result<()> {
        // Clear any previous message
        self.display.clear_transient();
        self.key_time = now;

        if self.search_bar.is_focused() && self.handle_search_key(key, now) {
            return Ok(());
        }

        // Escape closes a visible but unfocused bar
        if key == Key::escape() {
            if self.search_bar.is_visible() {
                self.close_search();
            }
            return Ok(());
        }

        if let Some(cmd) = self.keytab.lookup(key) {
            tracing::trace!(key = %key.display_name(), command = self.keytab.lookup_name(key), "dispatch");
            match cmd(self)? {
                CommandStatus::Success | CommandStatus::Failure => {}
                CommandStatus::Abort => self.display.set_message("Quit"),
            }
        } else {
            self.display.set_message("Key not bound");
        }

        Ok(())
    }

    /// Handle a key while the search bar has focus. Returns false for keys
    /// the bar leaves to the page (arrows, paging).
    fn handle_search_key(&mut self, key: Key, now: Instant) -> bool {
        if key == Key::escape() || key == Key::ctrl('g') {
            self.close_search();
            return true;
        }

        // Enter applies a pending query and jumps to the next match; a
        // query that already jumped to its first match stays there
        if key == Key::enter() || key == Key::ctrl('s') {
            if !self.flush_search() {
                self.goto_match(Direction::Forward);
            }
            return true;
        }

        if key == Key::ctrl('r') {
            if !self.flush_search() {
                self.goto_match(Direction::Backward);
            }
            return true;
        }

        // No cursor inside the bar, so there is nothing to delete forward
        if key == Key::special(special::DELETE) {
            return true;
        }

        // Tab hands the keyboard back to the page
        if key == Key::ctrl('i') {
            self.search_bar.blur();
            return true;
        }

        let changed = if key == BACKSPACE || key == Key::ctrl('h') {
            self.search_bar.delete_backward()
        } else if key == Key::ctrl('w') {
            self.search_bar.delete_word()
        } else if key == Key::ctrl('u') {
            self.search_bar.clear_input()
        } else if key.is_self_insert() {
            match key.base_char() {
                Some(ch) => self.search_bar.insert(ch),
                None => false,
            }
        } else {
            return false;
        };

        if changed {
            self.search_changed(now);
        }
        true
    }

    /// Show the search bar with focus
    pub fn open_search(&mut self) {
        self.search_bar.show();
        self.display.clear_message();
    }

    /// Hide the search bar, remove every mark and forget the query
    pub fn close_search(&mut self) {
        self.search_bar.hide();
        self.search_bar.clear_input();
        self.debouncer.cancel();
        self.highlighter.reset(&mut self.tree);
        self.match_count = 0;
        self.match_cursor = None;
        self.relayout();
        tracing::debug!("search closed");
    }

    fn search_changed(&mut self, now: Instant) {
        if self.debouncer.changed(now) {
            self.apply_query();
        }
    }

    /// Apply a pending query now. Returns true when that moved to a match.
    fn flush_search(&mut self) -> bool {
        self.debouncer.flush() && self.apply_query()
    }

    /// Apply the search bar's value to the lesson. Returns true when the
    /// view moved to the first match.
    pub fn apply_query(&mut self) -> bool {
        let query = self.search_bar.value().to_string();
        self.match_count = self.highlighter.set_query(&mut self.tree, &query);
        self.match_cursor = None;
        self.relayout();

        // Bring the first match into view unless one is already visible
        let visible = self
            .layout
            .mark_lines
            .iter()
            .any(|&line| self.viewport.contains(line));
        !visible && !self.layout.mark_lines.is_empty() && self.goto_match(Direction::Forward)
    }

    /// Handle timers: debounced queries and expiring messages
    pub fn tick(&mut self, now: Instant) {
        if self.debouncer.due(now) {
            self.apply_query();
        }
        self.display.expire(now);
    }

    /// How long the main loop may block waiting for input
    pub fn next_deadline(&self, now: Instant) -> Option<Duration> {
        match (self.debouncer.remaining(now), self.display.message_remaining(now)) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Scroll so the next or previous line with a match is on screen
    pub fn goto_match(&mut self, direction: Direction) -> bool {
        let lines = &self.layout.mark_lines;
        if lines.is_empty() {
            if self.highlighter.is_active() {
                self.display.set_message("No matches");
            }
            return false;
        }

        let top = self.viewport.top();
        let idx = match (self.match_cursor, direction) {
            (Some(i), Direction::Forward) => (i + 1) % lines.len(),
            (Some(i), Direction::Backward) => (i + lines.len() - 1) % lines.len(),
            (None, Direction::Forward) => lines.iter().position(|&l| l >= top).unwrap_or(0),
            (None, Direction::Backward) => {
                let bottom = top + self.viewport.height();
                lines.iter().rposition(|&l| l < bottom).unwrap_or(lines.len() - 1)
            }
        };

        let line = lines[idx];
        self.match_cursor = Some(idx);
        self.viewport.ensure_visible(line, self.layout.len());
        true
    }

    /// Copy the quoted block at the top of the view
    pub fn copy_quote(&mut self, now: Instant) -> bool {
        let target = clipboard::copy_target(
            &self.layout.quotes,
            self.viewport.top(),
            self.viewport.height(),
        );
        let Some(span) = target else {
            self.display.set_message("No quote on screen");
            return false;
        };

        let Some(text) = clipboard::quote_text(&self.tree, &span) else {
            self.display.set_message("Nothing to copy");
            return false;
        };
        let copied = self.clipboard.copy(&text);
        if copied {
            self.display
                .set_timed_message(COPIED_MESSAGE, now + self.config.copy_feedback());
        } else {
            tracing::warn!(section = span.section, block = span.child, "copy failed");
            self.display.set_message("Copy failed");
        }
        copied
    }

    /// When the key being handled arrived
    pub fn key_time(&self) -> Instant {
        self.key_time
    }

    /// Scroll by `delta` lines
    pub fn scroll_by(&mut self, delta: isize) {
        self.viewport.scroll_by(delta, self.layout.len());
    }

    /// Put the first line of section `idx` at the top of the view
    pub fn goto_section(&mut self, idx: usize) {
        if let Some(&start) = self.layout.section_starts.get(idx) {
            self.viewport.scroll_to(start, self.layout.len());
        }
    }

    /// Index of the section being read
    pub fn active_section(&self) -> Option<usize> {
        self.navigator
            .active_section(&self.layout.section_starts, self.viewport.top())
    }

    /// Number of marks from the last applied query
    pub fn match_count(&self) -> usize {
        self.match_count
    }

    /// Stop the main loop
    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Adapt to a new terminal size
    pub fn resize(&mut self, cols: u16, rows: u16) {
        self.cols = cols.max(1) as usize;
        self.viewport.set_height(text_rows(rows), self.layout.len());
        self.relayout();
    }

    /// Rebuild the layout after the tree or the width changed
    fn relayout(&mut self) {
        self.layout = Layout::build(&self.tree, wrap_width(&self.config, self.cols));
        self.match_cursor = None;
        let height = self.viewport.height();
        self.viewport.set_height(height, self.layout.len());
        self.display.force_redraw();
    }

    /// Mode line: title, active section, match count, position
    pub fn mode_line(&self) -> String {
        let mut line = format!(" {}", self.tree.title);

        if let Some(idx) = self.active_section() {
            let name = self
                .tree
                .section_title(idx)
                .unwrap_or_else(|| self.tree.section_id(idx));
            line.push_str(&format!(" | {}", name));
        }

        if self.highlighter.is_active() {
            line.push_str(&format!(" | {} matches", self.match_count));
        }

        line.push_str(&format!(" | {}", self.position()));

        let top = self.viewport.top();
        if self.navigator.show_scroll_top(top) {
            line.push_str(" | ↑ t");
        }
        line.push(' ');
        line
    }

    fn position(&self) -> String {
        let total = self.layout.len();
        let top = self.viewport.top();
        let height = self.viewport.height();
        if self.layout.is_empty() || total <= height {
            "All".to_string()
        } else if top == 0 {
            "Top".to_string()
        } else if top + height >= total {
            "Bot".to_string()
        } else {
            format!("{}%", top * 100 / total.saturating_sub(height))
        }
    }

    /// Minibuffer: a message wins over the search prompt
    pub fn minibuffer_text(&self) -> String {
        if let Some(msg) = self.display.message() {
            return msg.to_string();
        }
        if !self.search_bar.is_visible() {
            return String::new();
        }

        let mut text = self.search_bar.prompt();
        if self.highlighter.is_active() {
            if self.match_count == 0 {
                text.push_str("  [no matches]");
            } else {
                text.push_str(&format!("  [{}]", self.match_count));
            }
        }
        text
    }
}

fn text_rows(rows: u16) -> usize {
    rows.saturating_sub(CHROME_ROWS).max(1) as usize
}

fn wrap_width(config: &Config, cols: usize) -> usize {
    if config.wrap_width == 0 {
        cols
    } else {
        config.wrap_width.min(cols)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clipboard::test_support::{FailingSink, MemorySink};
    use crate::document::parse;

    const LESSON: &str = r#"
title = "القلب السليم"

[[sections]]
id = "intro"
title = "مقدمة"
[[sections.blocks]]
kind = "paragraph"
text = "القلب محل نظر الله من العبد"
[[sections.blocks]]
kind = "ayah"
text = "يوم لا ينفع مال ولا بنون إلا من أتى الله بقلب سليم"
source = "الشعراء"

[[sections]]
id = "signs"
title = "علامات القلب السليم"
[[sections.blocks]]
kind = "paragraph"
text = "أن يكون القلب خاليا من الشرك"
[[sections.blocks]]
kind = "hadith"
text = "ألا وإن في الجسد مضغة إذا صلحت صلح الجسد كله"
source = "متفق عليه"
"#;

    fn viewer(rows: u16) -> Viewer {
        let tree = parse(LESSON).unwrap();
        let mut v = Viewer::new(tree, Config::default(), 80, rows);
        v.clipboard = Clipboard::with_sink(8, Box::new(MemorySink::default()));
        v
    }

    /// Two matches for "target", both below a three-line view
    fn far_targets() -> ContentTree {
        let mut lesson = String::from("title = \"far\"\n[[sections]]\nid = \"s\"\n");
        let texts = [
            "one", "two", "three", "four", "five", "six", "seven", "target first",
            "eight", "nine", "ten", "target second", "eleven",
        ];
        for text in texts {
            lesson.push_str(&format!(
                "[[sections.blocks]]\nkind = \"paragraph\"\ntext = \"{}\"\n",
                text
            ));
        }
        parse(&lesson).unwrap()
    }

    fn type_str(v: &mut Viewer, s: &str, now: Instant) {
        for ch in s.chars() {
            v.handle_key(Key::char(ch), now).unwrap();
        }
    }

    #[test]
    fn test_find_opens_focused_bar() {
        let mut v = viewer(24);
        let now = Instant::now();
        v.handle_key(Key::ctrl('f'), now).unwrap();
        assert!(v.search_bar.is_visible());
        assert!(v.search_bar.is_focused());
        assert!(v.minibuffer_text().contains(crate::search_bar::PLACEHOLDER));
    }

    #[test]
    fn test_typing_highlights_after_min_chars() {
        let mut v = viewer(24);
        let now = Instant::now();
        v.handle_key(Key::ctrl('f'), now).unwrap();

        type_str(&mut v, "قل", now);
        assert!(!v.highlighter.is_active());
        assert_eq!(v.match_count(), 0);

        type_str(&mut v, "ب", now);
        assert!(v.highlighter.is_active());
        assert_eq!(v.match_count(), 4);
        assert!(!v.layout.mark_lines.is_empty());
        assert!(v.mode_line().contains("4 matches"));
    }

    #[test]
    fn test_escape_closes_and_restores() {
        let mut v = viewer(24);
        let original = v.tree.clone();
        let now = Instant::now();

        v.handle_key(Key::ctrl('f'), now).unwrap();
        type_str(&mut v, "القلب", now);
        assert!(v.match_count() > 0);

        v.handle_key(Key::escape(), now).unwrap();
        assert!(!v.search_bar.is_visible());
        assert_eq!(v.search_bar.value(), "");
        assert_eq!(v.highlighter.query(), "");
        assert_eq!(v.tree, original);
        assert!(v.layout.mark_lines.is_empty());
    }

    #[test]
    fn test_keys_go_to_bar_while_focused() {
        let mut v = viewer(24);
        let now = Instant::now();
        v.handle_key(Key::ctrl('f'), now).unwrap();
        type_str(&mut v, "qct", now);
        assert!(v.running);
        assert_eq!(v.search_bar.value(), "qct");

        v.handle_key(BACKSPACE, now).unwrap();
        assert_eq!(v.search_bar.value(), "qc");

        // Tab hands keys back to the page
        v.handle_key(Key::ctrl('i'), now).unwrap();
        assert!(v.search_bar.is_visible());
        v.handle_key(Key::char('q'), now).unwrap();
        assert!(!v.running);
    }

    #[test]
    fn test_debounced_query_applies_on_tick() {
        let config = Config {
            search_debounce_ms: 200,
            ..Config::default()
        };
        let mut v = Viewer::new(parse(LESSON).unwrap(), config, 80, 24);
        let start = Instant::now();

        v.handle_key(Key::ctrl('f'), start).unwrap();
        type_str(&mut v, "الجسد", start);
        assert!(!v.highlighter.is_active());
        assert_eq!(v.next_deadline(start), Some(Duration::from_millis(200)));

        v.tick(start + Duration::from_millis(100));
        assert!(!v.highlighter.is_active());

        v.tick(start + Duration::from_millis(200));
        assert!(v.highlighter.is_active());
        assert_eq!(v.match_count(), 2);
        assert_eq!(v.next_deadline(start), None);
    }

    #[test]
    fn test_enter_flushes_pending_query() {
        let config = Config {
            search_debounce_ms: 500,
            ..Config::default()
        };
        let mut v = Viewer::new(parse(LESSON).unwrap(), config, 80, 24);
        let now = Instant::now();
        v.handle_key(Key::ctrl('f'), now).unwrap();
        type_str(&mut v, "مضغة", now);
        v.handle_key(Key::enter(), now).unwrap();
        assert_eq!(v.match_count(), 1);
    }

    #[test]
    fn test_enter_after_debounce_stays_on_first_match() {
        let now = Instant::now();
        let mut cursors = Vec::new();
        for debounce_ms in [0, 300] {
            let config = Config {
                search_debounce_ms: debounce_ms,
                ..Config::default()
            };
            let mut v = Viewer::new(far_targets(), config, 80, 5);
            v.handle_key(Key::ctrl('f'), now).unwrap();
            type_str(&mut v, "target", now);
            v.handle_key(Key::enter(), now).unwrap();

            assert_eq!(v.match_count(), 2);
            assert!(v.layout.mark_lines[0] >= v.viewport.height());
            assert!(v.viewport.contains(v.layout.mark_lines[0]));
            cursors.push(v.match_cursor);
        }
        assert_eq!(cursors, vec![Some(0), Some(0)]);
    }

    #[test]
    fn test_delete_key_is_quiet_in_search_bar() {
        let mut v = viewer(24);
        let now = Instant::now();
        v.handle_key(Key::ctrl('f'), now).unwrap();
        type_str(&mut v, "قلب", now);
        v.handle_key(Key::special(special::DELETE), now).unwrap();
        assert_eq!(v.search_bar.value(), "قلب");
        assert_eq!(v.display.message(), None);
    }

    #[test]
    fn test_next_match_scrolls_into_view() {
        let mut v = viewer(6);
        let now = Instant::now();
        v.handle_key(Key::ctrl('f'), now).unwrap();
        type_str(&mut v, "مضغة", now);

        let line = v.layout.mark_lines[0];
        assert!(v.viewport.contains(line));
        assert!(v.viewport.top() > 0);

        v.handle_key(Key::ctrl('s'), now).unwrap();
        assert!(v.viewport.contains(line));
    }

    #[test]
    fn test_no_matches_message() {
        let mut v = viewer(24);
        let now = Instant::now();
        v.handle_key(Key::ctrl('f'), now).unwrap();
        type_str(&mut v, "xyz", now);
        assert!(v.highlighter.is_active());
        assert!(v.minibuffer_text().contains("[no matches]"));
        v.handle_key(Key::enter(), now).unwrap();
        assert_eq!(v.display.message(), Some("No matches"));
    }

    #[test]
    fn test_copy_quote_feedback() {
        let mut v = viewer(24);
        let now = Instant::now();
        v.handle_key(Key::char('c'), now).unwrap();
        assert_eq!(
            v.clipboard.latest(),
            Some("يوم لا ينفع مال ولا بنون إلا من أتى الله بقلب سليم")
        );
        assert_eq!(v.display.message(), Some(COPIED_MESSAGE));

        // Feedback survives the next key but not its timeout
        v.handle_key(Key::char('j'), now).unwrap();
        assert_eq!(v.display.message(), Some(COPIED_MESSAGE));
        v.tick(now + v.config.copy_feedback());
        assert_eq!(v.display.message(), None);
    }

    #[test]
    fn test_copy_failure_shows_no_feedback() {
        let mut v = viewer(24);
        v.clipboard = Clipboard::with_sink(8, Box::new(FailingSink));
        v.handle_key(Key::char('c'), Instant::now()).unwrap();
        assert_eq!(v.display.message(), Some("Copy failed"));
        assert_eq!(v.clipboard.latest(), None);
    }

    #[test]
    fn test_active_section_and_scroll_top() {
        let mut v = viewer(6);
        let now = Instant::now();
        assert_eq!(v.active_section(), Some(0));
        assert!(v.mode_line().contains("مقدمة"));

        v.handle_key(Key::char(']'), now).unwrap();
        assert_eq!(v.active_section(), Some(1));
        assert_eq!(v.viewport.top(), v.layout.section_starts[1]);

        v.handle_key(Key::char('t'), now).unwrap();
        assert_eq!(v.viewport.top(), 0);
        assert!(!v.mode_line().contains('↑'));
    }

    #[test]
    fn test_unbound_key() {
        let mut v = viewer(24);
        v.handle_key(Key::char('z'), Instant::now()).unwrap();
        assert_eq!(v.display.message(), Some("Key not bound"));
    }

    #[test]
    fn test_resize_rewraps() {
        let mut v = viewer(24);
        let wide = v.layout.len();
        v.resize(20, 24);
        assert!(v.layout.len() > wide);
        assert_eq!(v.layout.width, 20);
    }
}
