//! Section tracking
//!
//! The active section follows the scroll position: it is the last section
//! whose first line has been reached by the top of the view, allowing a few
//! rows of slack so a heading just under the top already counts.

use crate::config::Config;

/// Follows the scroll position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Navigator {
    /// Rows below the top that still count as reached
    offset: usize,
    /// Scroll distance after which the back-to-top marker shows
    scroll_top_threshold: usize,
}

impl Navigator {
    pub fn new(offset: usize, scroll_top_threshold: usize) -> Self {
        Self {
            offset,
            scroll_top_threshold,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.nav_offset, config.scroll_top_threshold)
    }

    /// Index of the active section for a view whose first line is `top`
    ///
    /// `section_starts` must be ascending. Returns None only when there are
    /// no sections.
    pub fn active_section(&self, section_starts: &[usize], top: usize) -> Option<usize> {
        if section_starts.is_empty() {
            return None;
        }
        let probe = top.saturating_add(self.offset);
        Some(
            section_starts
                .iter()
                .rposition(|&start| start <= probe)
                .unwrap_or(0),
        )
    }

    /// Whether the back-to-top marker should show
    pub fn show_scroll_top(&self, top: usize) -> bool {
        top > self.scroll_top_threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_active_section_follows_scroll() {
        let nav = Navigator::new(1, 10);
        let starts = [0, 8, 20];

        assert_eq!(nav.active_section(&starts, 0), Some(0));
        assert_eq!(nav.active_section(&starts, 6), Some(0));
        assert_eq!(nav.active_section(&starts, 7), Some(1));
        assert_eq!(nav.active_section(&starts, 19), Some(2));
        assert_eq!(nav.active_section(&starts, 500), Some(2));
    }

    #[test]
    fn test_active_section_before_first_start() {
        let nav = Navigator::new(0, 10);
        assert_eq!(nav.active_section(&[3, 9], 0), Some(0));
        assert_eq!(nav.active_section(&[], 0), None);
    }

    #[test]
    fn test_scroll_top_threshold() {
        let nav = Navigator::from_config(&Config::default());
        assert!(!nav.show_scroll_top(0));
        assert!(!nav.show_scroll_top(10));
        assert!(nav.show_scroll_top(11));
    }
}
