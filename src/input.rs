//! Input handling - key reading and translation

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// Key modifier flags
pub mod key_flags {
    pub const CONTROL: u32 = 0x1000_0000;
    pub const META: u32 = 0x2000_0000;
    pub const CTLX: u32 = 0x4000_0000;
    pub const SPEC: u32 = 0x8000_0000;
}

/// Codes for special (non-character) keys
pub mod special {
    pub const F1: u32 = 0x3b;
    pub const HOME: u32 = 0x47;
    pub const UP: u32 = 0x48;
    pub const PAGE_UP: u32 = 0x49;
    pub const LEFT: u32 = 0x4b;
    pub const RIGHT: u32 = 0x4d;
    pub const END: u32 = 0x4f;
    pub const DOWN: u32 = 0x50;
    pub const PAGE_DOWN: u32 = 0x51;
    pub const DELETE: u32 = 0x53;
}

/// Backspace (DEL)
pub const BACKSPACE: Key = Key(0x7f);

/// Represents a key input with modifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Key(pub u32);

impl Key {
    /// Create a key from a character
    pub fn char(ch: char) -> Self {
        Key(ch as u32)
    }

    /// Create a control key (C-x)
    pub fn ctrl(ch: char) -> Self {
        Key(key_flags::CONTROL | ch.to_ascii_lowercase() as u32)
    }

    /// Create a meta key (M-x)
    pub fn meta(ch: char) -> Self {
        Key(key_flags::META | ch as u32)
    }

    /// Create a C-x C-x key
    pub fn ctlx_ctrl(ch: char) -> Self {
        Key(key_flags::CTLX | key_flags::CONTROL | ch.to_ascii_lowercase() as u32)
    }

    /// Create a special key (function keys, arrows, ...)
    pub fn special(code: u32) -> Self {
        Key(key_flags::SPEC | code)
    }

    /// Escape
    pub fn escape() -> Self {
        Key::ctrl('[')
    }

    /// Enter
    pub fn enter() -> Self {
        Key::ctrl('m')
    }

    /// Get the raw key code
    pub fn code(&self) -> u32 {
        self.0
    }

    pub fn is_ctrl(&self) -> bool {
        self.0 & key_flags::CONTROL != 0
    }

    pub fn is_meta(&self) -> bool {
        self.0 & key_flags::META != 0
    }

    pub fn is_ctlx(&self) -> bool {
        self.0 & key_flags::CTLX != 0
    }

    pub fn is_special(&self) -> bool {
        self.0 & key_flags::SPEC != 0
    }

    /// Get the base character (without modifiers)
    pub fn base_char(&self) -> Option<char> {
        char::from_u32(self.0 & 0x00FF_FFFF)
    }

    /// Check if this is a printable character with no modifiers
    pub fn is_self_insert(&self) -> bool {
        if self.0 & 0xF000_0000 != 0 {
            return false;
        }
        match char::from_u32(self.0) {
            Some(ch) => ch >= ' ' && ch != '\x7f',
            None => false,
        }
    }

    /// Convert key to a human-readable string (e.g., "C-f", "M-<", "C-x C-c")
    pub fn display_name(&self) -> String {
        let mut result = String::new();

        if self.is_ctlx() {
            result.push_str("C-x ");
        }
        if self.is_meta() {
            result.push_str("M-");
        }
        if self.is_ctrl() {
            if *self == Key::escape() {
                return format!("{}Esc", result);
            }
            if *self == Key::enter() {
                return format!("{}RET", result);
            }
            result.push_str("C-");
        }

        if self.is_special() {
            let code = self.0 & 0xFF;
            let name = match code {
                special::HOME => "Home",
                special::UP => "Up",
                special::PAGE_UP => "PageUp",
                special::LEFT => "Left",
                special::RIGHT => "Right",
                special::END => "End",
                special::DOWN => "Down",
                special::PAGE_DOWN => "PageDown",
                special::DELETE => "Delete",
                n if (special::F1..=0x44).contains(&n) => {
                    return format!("{}F{}", result, n - 0x3a);
                }
                _ => return format!("{}special-0x{:02x}", result, code),
            };
            result.push_str(name);
            return result;
        }

        let base = self.0 & 0x00FF_FFFF;
        if base == 0x7f {
            result.push_str("Backspace");
        } else if base == 0x20 {
            result.push_str("SPC");
        } else if let Some(ch) = char::from_u32(base) {
            result.push(ch);
        } else {
            result.push_str(&format!("0x{:x}", base));
        }

        result
    }
}

/// Input state for handling the C-x prefix
#[derive(Debug, Default)]
pub struct InputState {
    /// Waiting for C-x continuation
    ctlx_pending: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if waiting for a continuation key
    pub fn is_pending(&self) -> bool {
        self.ctlx_pending
    }

    /// Translate a crossterm KeyEvent to our Key representation
    ///
    /// Returns None for release/repeat events and while a prefix is pending.
    pub fn translate_key(&mut self, event: KeyEvent) -> Option<Key> {
        let KeyEvent {
            code, modifiers, kind, ..
        } = event;

        // Windows reports release events too
        if kind != KeyEventKind::Press {
            return None;
        }

        if self.ctlx_pending {
            self.ctlx_pending = false;
            return translate_normal(code, modifiers).map(|k| Key(k.0 | key_flags::CTLX));
        }

        if code == KeyCode::Char('x') && modifiers.contains(KeyModifiers::CONTROL) {
            self.ctlx_pending = true;
            return None;
        }

        translate_normal(code, modifiers)
    }
}

fn translate_normal(code: KeyCode, modifiers: KeyModifiers) -> Option<Key> {
    let ctrl = modifiers.contains(KeyModifiers::CONTROL);
    let alt = modifiers.contains(KeyModifiers::ALT);

    match code {
        KeyCode::Char(ch) => {
            if ctrl && alt {
                Some(Key(key_flags::META | key_flags::CONTROL | ch.to_ascii_lowercase() as u32))
            } else if ctrl {
                Some(Key::ctrl(ch))
            } else if alt {
                Some(Key::meta(ch))
            } else {
                Some(Key::char(ch))
            }
        }
        KeyCode::Enter => Some(Key::enter()),
        KeyCode::Tab => Some(Key::ctrl('i')),
        KeyCode::Backspace => Some(BACKSPACE),
        KeyCode::Delete => Some(Key::special(special::DELETE)),
        KeyCode::Home => Some(Key::special(special::HOME)),
        KeyCode::End => Some(Key::special(special::END)),
        KeyCode::PageUp => Some(Key::special(special::PAGE_UP)),
        KeyCode::PageDown => Some(Key::special(special::PAGE_DOWN)),
        KeyCode::Up => Some(Key::special(special::UP)),
        KeyCode::Down => Some(Key::special(special::DOWN)),
        KeyCode::Left => Some(Key::special(special::LEFT)),
        KeyCode::Right => Some(Key::special(special::RIGHT)),
        KeyCode::F(n) => Some(Key::special(0x3a + n as u32)),
        KeyCode::Esc => Some(Key::escape()),
        _ => None,
    }
}
