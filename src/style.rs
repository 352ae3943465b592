//! Style types for text rendering
//!
//! Terminal-independent colors and attributes, and the theme that maps
//! layout roles onto them.

use crate::layout::Role;

/// Terminal colors (ANSI 16-color palette for compatibility)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Color {
    #[default]
    Default,
    Black,
    Yellow,
    BrightBlack,
    BrightYellow,
    BrightWhite,
}

/// Text style attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Style {
    pub fg: Color,
    pub bg: Color,
    pub bold: bool,
    pub italic: bool,
    pub dim: bool,
    pub reverse: bool,
}

impl Style {
    /// Create a style with just foreground color
    pub fn fg(color: Color) -> Self {
        Self {
            fg: color,
            ..Default::default()
        }
    }

    /// Builder: set background color
    pub fn with_bg(mut self, color: Color) -> Self {
        self.bg = color;
        self
    }

    pub fn with_bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn with_italic(mut self) -> Self {
        self.italic = true;
        self
    }

    pub fn with_dim(mut self) -> Self {
        self.dim = true;
        self
    }

    /// Check if this is the default (no styling)
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

/// Role to style mapping
#[derive(Debug, Clone)]
pub struct Theme {
    pub heading: Style,
    pub body: Style,
    pub quote: Style,
    pub source: Style,
    pub strong: Style,
    pub bullet: Style,
    /// Search matches: gold background, dark text
    pub mark: Style,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            heading: Style::fg(Color::Yellow).with_bold(),
            body: Style::default(),
            quote: Style::fg(Color::BrightWhite).with_italic(),
            source: Style::fg(Color::BrightBlack).with_dim(),
            strong: Style::default().with_bold(),
            bullet: Style::fg(Color::Yellow),
            mark: Style::fg(Color::Black).with_bg(Color::BrightYellow).with_bold(),
        }
    }
}

impl Theme {
    pub fn style(&self, role: Role) -> Style {
        match role {
            Role::Heading => self.heading,
            Role::Body => self.body,
            Role::Quote => self.quote,
            Role::Source => self.source,
            Role::Strong => self.strong,
            Role::Bullet => self.bullet,
            Role::Mark => self.mark,
        }
    }
}
