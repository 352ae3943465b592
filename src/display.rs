//! Display rendering

use std::time::{Duration, Instant};

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::error::Result;
use crate::layout::Layout;
use crate::style::Theme;
use crate::terminal::Terminal;
use crate::viewport::Viewport;

/// A minibuffer message, optionally expiring
#[derive(Debug, Clone)]
struct Message {
    text: String,
    expires: Option<Instant>,
}

/// What to draw besides the text body
pub struct Chrome<'a> {
    pub mode_line: &'a str,
    pub minibuffer: &'a str,
    /// Show the cursor at the end of the minibuffer text
    pub minibuffer_cursor: bool,
}

/// Display state
pub struct Display {
    /// Whether a full redraw is needed
    needs_redraw: bool,
    /// Message to show in minibuffer (bottom line)
    message: Option<Message>,
}

impl Display {
    pub fn new() -> Self {
        Self {
            needs_redraw: true,
            message: None,
        }
    }

    /// Mark that a full redraw is needed
    pub fn force_redraw(&mut self) {
        self.needs_redraw = true;
    }

    /// Set a message that stays until the next key
    pub fn set_message(&mut self, msg: impl Into<String>) {
        self.message = Some(Message {
            text: msg.into(),
            expires: None,
        });
    }

    /// Set a message that stays until `until`, regardless of keys
    pub fn set_timed_message(&mut self, msg: impl Into<String>, until: Instant) {
        self.message = Some(Message {
            text: msg.into(),
            expires: Some(until),
        });
    }

    /// Clear the message
    pub fn clear_message(&mut self) {
        self.message = None;
    }

    /// Clear the message unless it is timed
    pub fn clear_transient(&mut self) {
        if matches!(self.message, Some(Message { expires: None, .. })) {
            self.message = None;
        }
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_ref().map(|m| m.text.as_str())
    }

    /// Drop a timed message whose time is up
    pub fn expire(&mut self, now: Instant) {
        if let Some(Message {
            expires: Some(until),
            ..
        }) = self.message
        {
            if until <= now {
                self.message = None;
            }
        }
    }

    /// Time until the current timed message expires
    pub fn message_remaining(&self, now: Instant) -> Option<Duration> {
        self.message
            .as_ref()
            .and_then(|m| m.expires)
            .map(|until| until.saturating_duration_since(now))
    }

    /// Render the lesson body, mode line and minibuffer
    pub fn render(
        &mut self,
        terminal: &mut Terminal,
        layout: &Layout,
        viewport: &Viewport,
        theme: &Theme,
        chrome: &Chrome<'_>,
    ) -> Result<()> {
        let cols = terminal.cols() as usize;
        let rows = terminal.rows();

        terminal.set_cursor_visible(false)?;
        if self.needs_redraw {
            terminal.clear_screen()?;
        }

        for row in 0..viewport.height() {
            let screen_row = row as u16;
            if screen_row >= rows.saturating_sub(2) {
                break;
            }
            terminal.move_cursor(screen_row, 0)?;

            if let Some(line) = layout.line(viewport.top() + row) {
                let mut used = 0;
                for segment in &line.segments {
                    let remaining = cols.saturating_sub(used);
                    if remaining == 0 {
                        break;
                    }
                    let text = truncate_to_width(&segment.text, remaining);
                    used += text.width();
                    let style = theme.style(segment.role);
                    if style.is_default() {
                        terminal.write_str(&text)?;
                    } else {
                        terminal.apply_style(&style)?;
                        terminal.write_str(&text)?;
                        terminal.reset_attributes()?;
                    }
                }
            }

            terminal.clear_to_eol()?;
        }

        self.render_mode_line(terminal, rows.saturating_sub(2), cols, chrome.mode_line)?;
        self.render_minibuffer(terminal, rows.saturating_sub(1), cols, chrome.minibuffer)?;

        if chrome.minibuffer_cursor {
            let col = chrome.minibuffer.width().min(cols.saturating_sub(1)) as u16;
            terminal.move_cursor(rows.saturating_sub(1), col)?;
            terminal.set_cursor_visible(true)?;
        }

        terminal.flush()?;
        self.needs_redraw = false;
        Ok(())
    }

    /// Render the mode line in reverse video, padded to the full width
    fn render_mode_line(&self, terminal: &mut Terminal, row: u16, cols: usize, text: &str) -> Result<()> {
        terminal.move_cursor(row, 0)?;
        terminal.set_reverse(true)?;
        let truncated = truncate_to_width(text, cols);
        let pad = cols.saturating_sub(truncated.width());
        terminal.write_str(&truncated)?;
        terminal.write_str(&" ".repeat(pad))?;
        terminal.set_reverse(false)?;
        Ok(())
    }

    /// Render the minibuffer (message area)
    fn render_minibuffer(&self, terminal: &mut Terminal, row: u16, cols: usize, text: &str) -> Result<()> {
        terminal.move_cursor(row, 0)?;
        terminal.write_str(&truncate_to_width(text, cols))?;
        terminal.clear_to_eol()?;
        Ok(())
    }
}

impl Default for Display {
    fn default() -> Self {
        Self::new()
    }
}

/// Truncate a string to fit within a display width
pub fn truncate_to_width(s: &str, max_width: usize) -> String {
    let mut result = String::new();
    let mut width = 0;

    for ch in s.chars() {
        let ch_width = ch.width().unwrap_or(0);
        if width + ch_width > max_width {
            break;
        }
        result.push(ch);
        width += ch_width;
    }

    result
}
