//! Viewport - the visible window onto the laid out lesson

/// A scrollable view of `height` lines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    /// First visible line
    top: usize,
    /// Number of text rows
    height: usize,
}

impl Viewport {
    pub fn new(height: usize) -> Self {
        Self {
            top: 0,
            height: height.max(1),
        }
    }

    /// Get the top visible line
    pub fn top(&self) -> usize {
        self.top
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Change the number of rows, keeping the top line
    pub fn set_height(&mut self, height: usize, total: usize) {
        self.height = height.max(1);
        self.clamp(total);
    }

    /// Largest useful top line for a document of `total` lines
    fn max_top(&self, total: usize) -> usize {
        total.saturating_sub(self.height)
    }

    fn clamp(&mut self, total: usize) {
        self.top = self.top.min(self.max_top(total));
    }

    /// Scroll by `delta` lines (negative scrolls up)
    pub fn scroll_by(&mut self, delta: isize, total: usize) {
        let top = if delta < 0 {
            self.top.saturating_sub(delta.unsigned_abs())
        } else {
            self.top.saturating_add(delta as usize)
        };
        self.top = top.min(self.max_top(total));
    }

    /// Scroll one page down, keeping two lines of context
    pub fn page_down(&mut self, total: usize) {
        let step = self.height.saturating_sub(2).max(1);
        self.scroll_by(step as isize, total);
    }

    /// Scroll one page up, keeping two lines of context
    pub fn page_up(&mut self, total: usize) {
        let step = self.height.saturating_sub(2).max(1);
        self.scroll_by(-(step as isize), total);
    }

    pub fn to_top(&mut self) {
        self.top = 0;
    }

    pub fn to_bottom(&mut self, total: usize) {
        self.top = self.max_top(total);
    }

    /// Put `line` at the top of the view, as far as the document allows
    pub fn scroll_to(&mut self, line: usize, total: usize) {
        self.top = line.min(self.max_top(total));
    }

    /// Whether `line` is on screen
    pub fn contains(&self, line: usize) -> bool {
        line >= self.top && line < self.top + self.height
    }

    /// Scroll the minimum needed for `line` to be visible
    pub fn ensure_visible(&mut self, line: usize, total: usize) {
        if line < self.top {
            self.top = line;
        } else if line >= self.top + self.height {
            self.top = (line + 1 - self.height).min(self.max_top(total));
        }
    }
}
