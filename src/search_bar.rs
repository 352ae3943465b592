//! Search input surface
//!
//! A single-line input shown in the minibuffer. Every edit that changes the
//! value is a value-change event for the highlighter; the [`Debouncer`]
//! optionally coalesces bursts of edits into one.

use std::time::{Duration, Instant};

/// Placeholder shown while the input is empty
pub const PLACEHOLDER: &str = "ابحث في الدرس...";

/// The search input
#[derive(Debug, Clone, Default)]
pub struct SearchBar {
    /// Whether the bar is shown
    visible: bool,
    /// Whether keystrokes go to the bar
    focused: bool,
    /// Current value
    input: String,
}

impl SearchBar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show the bar and focus it
    pub fn show(&mut self) {
        self.visible = true;
        self.focused = true;
    }

    /// Hide the bar; the value is left for the caller to reset
    pub fn hide(&mut self) {
        self.visible = false;
        self.focused = false;
    }

    /// Keep the bar shown but send keys back to the page
    pub fn blur(&mut self) {
        self.focused = false;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_focused(&self) -> bool {
        self.visible && self.focused
    }

    pub fn value(&self) -> &str {
        &self.input
    }

    /// Append a character. Returns true (the value always changes).
    pub fn insert(&mut self, ch: char) -> bool {
        self.input.push(ch);
        true
    }

    /// Delete the last character. Returns whether the value changed.
    pub fn delete_backward(&mut self) -> bool {
        self.input.pop().is_some()
    }

    /// Delete the last word and any whitespace after it
    pub fn delete_word(&mut self) -> bool {
        if self.input.is_empty() {
            return false;
        }
        let trimmed = self.input.trim_end_matches(char::is_whitespace);
        let cut = trimmed
            .char_indices()
            .rev()
            .find(|(_, ch)| ch.is_whitespace())
            .map(|(idx, ch)| idx + ch.len_utf8())
            .unwrap_or(0);
        self.input.truncate(cut);
        true
    }

    /// Empty the value. Returns whether it changed.
    pub fn clear_input(&mut self) -> bool {
        if self.input.is_empty() {
            return false;
        }
        self.input.clear();
        true
    }

    /// Text for the minibuffer
    pub fn prompt(&self) -> String {
        if self.input.is_empty() {
            format!("🔍 {}", PLACEHOLDER)
        } else {
            format!("🔍 {}", self.input)
        }
    }
}

/// Coalesces rapid value changes into one application after an idle gap
#[derive(Debug, Clone)]
pub struct Debouncer {
    /// Idle gap (None = apply every change immediately)
    delay: Option<Duration>,
    /// When the pending change becomes due
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(delay: Option<Duration>) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    /// Record a change. Returns true when it should be applied right away.
    pub fn changed(&mut self, now: Instant) -> bool {
        match self.delay {
            None => true,
            Some(delay) => {
                self.deadline = Some(now + delay);
                false
            }
        }
    }

    /// Whether a change is waiting
    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Time left until the pending change is due
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.deadline.map(|deadline| deadline.saturating_duration_since(now))
    }

    /// Take the pending change if it is due
    pub fn due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if deadline <= now => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    /// Take the pending change regardless of the deadline
    pub fn flush(&mut self) -> bool {
        self.deadline.take().is_some()
    }

    /// Drop the pending change
    pub fn cancel(&mut self) {
        self.deadline = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_show_focuses_and_hide_unfocuses() {
        let mut bar = SearchBar::new();
        assert!(!bar.is_visible());
        bar.show();
        assert!(bar.is_visible());
        assert!(bar.is_focused());
        bar.blur();
        assert!(bar.is_visible());
        assert!(!bar.is_focused());
        bar.show();
        bar.hide();
        assert!(!bar.is_visible());
        assert!(!bar.is_focused());
    }

    #[test]
    fn test_edits_report_changes() {
        let mut bar = SearchBar::new();
        assert!(!bar.delete_backward());
        assert!(bar.insert('ق'));
        assert!(bar.insert('ل'));
        assert_eq!(bar.value(), "قل");
        assert!(bar.delete_backward());
        assert_eq!(bar.value(), "ق");
        assert!(bar.clear_input());
        assert!(!bar.clear_input());
    }

    #[test]
    fn test_delete_word() {
        let mut bar = SearchBar::new();
        for ch in "sound heart  ".chars() {
            bar.insert(ch);
        }
        assert!(bar.delete_word());
        assert_eq!(bar.value(), "sound ");
        assert!(bar.delete_word());
        assert_eq!(bar.value(), "");
        assert!(!bar.delete_word());
    }

    #[test]
    fn test_prompt_placeholder() {
        let mut bar = SearchBar::new();
        assert_eq!(bar.prompt(), format!("🔍 {}", PLACEHOLDER));
        bar.insert('x');
        assert_eq!(bar.prompt(), "🔍 x");
    }

    #[test]
    fn test_debouncer_disabled_applies_immediately() {
        let mut debouncer = Debouncer::new(None);
        assert!(debouncer.changed(Instant::now()));
        assert!(!debouncer.is_pending());
    }

    #[test]
    fn test_debouncer_coalesces() {
        let start = Instant::now();
        let delay = Duration::from_millis(100);
        let mut debouncer = Debouncer::new(Some(delay));

        assert!(!debouncer.changed(start));
        assert!(!debouncer.changed(start + Duration::from_millis(50)));
        assert!(!debouncer.due(start + Duration::from_millis(120)));
        assert_eq!(
            debouncer.remaining(start + Duration::from_millis(120)),
            Some(Duration::from_millis(30))
        );
        assert!(debouncer.due(start + Duration::from_millis(150)));
        assert!(!debouncer.is_pending());
        assert!(!debouncer.due(start + Duration::from_millis(500)));
    }

    #[test]
    fn test_debouncer_flush_and_cancel() {
        let now = Instant::now();
        let mut debouncer = Debouncer::new(Some(Duration::from_secs(1)));
        debouncer.changed(now);
        assert!(debouncer.flush());
        assert!(!debouncer.flush());

        debouncer.changed(now);
        debouncer.cancel();
        assert!(!debouncer.is_pending());
        assert_eq!(debouncer.remaining(now), None);
    }
}
