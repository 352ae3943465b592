//! Configuration file support
//!
//! Loads settings from ~/.dars.conf (or %USERPROFILE%\.dars.conf on Windows),
//! or from the path given with `--config`.
//!
//! Format: simple key=value pairs, one per line
//! Lines starting with # are comments
//!
//! Example:
//! ```text
//! # dars configuration
//! min-query-chars = 3
//! search-debounce-ms = 150
//! scroll-top-threshold = 10
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::Result;
use crate::search::DEFAULT_MIN_QUERY_CHARS;

/// Configuration settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Queries shorter than this are not highlighted
    pub min_query_chars: usize,
    /// Idle gap before a typed query is applied (0 = apply every keystroke)
    pub search_debounce_ms: u64,
    /// Rows below the top of the view that still count as "reached" when
    /// deciding the active section
    pub nav_offset: usize,
    /// Scroll distance (rows) after which the back-to-top marker shows
    pub scroll_top_threshold: usize,
    /// How long the "copied" message stays up
    pub copy_feedback_ms: u64,
    /// Number of copied blocks remembered
    pub clipboard_size: usize,
    /// Wrap column (0 = terminal width)
    pub wrap_width: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            min_query_chars: DEFAULT_MIN_QUERY_CHARS,
            search_debounce_ms: 0,
            nav_offset: 1,
            scroll_top_threshold: 10,
            copy_feedback_ms: 2000,
            clipboard_size: 8,
            wrap_width: 0,
        }
    }
}

impl Config {
    /// Get the default config file path
    pub fn config_path() -> Option<PathBuf> {
        #[cfg(windows)]
        {
            std::env::var("USERPROFILE")
                .ok()
                .map(|home| PathBuf::from(home).join(".dars.conf"))
        }

        #[cfg(not(windows))]
        {
            std::env::var("HOME")
                .ok()
                .map(|home| PathBuf::from(home).join(".dars.conf"))
        }
    }

    /// Load configuration from the default location
    ///
    /// A missing or unreadable file yields the defaults.
    pub fn load() -> Self {
        let mut config = Config::default();

        if let Some(path) = Self::config_path() {
            if let Ok(contents) = fs::read_to_string(&path) {
                tracing::debug!(path = %path.display(), "reading config");
                let settings = Self::parse(&contents);
                config.apply(&settings);
            }
        }

        config
    }

    /// Load configuration from an explicit path
    ///
    /// Unlike [`Config::load`], a missing file is an error.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let mut config = Config::default();
        config.apply(&Self::parse(&contents));
        tracing::debug!(path = %path.display(), ?config, "config loaded");
        Ok(config)
    }

    /// Parse config file contents into key-value pairs
    fn parse(contents: &str) -> HashMap<String, String> {
        let mut settings = HashMap::new();

        for line in contents.lines() {
            let line = line.trim();

            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if let Some((key, value)) = line.split_once('=') {
                let key = key.trim().to_lowercase();
                let value = value.trim().to_string();
                settings.insert(key, value);
            } else {
                tracing::warn!(line, "ignoring malformed config line");
            }
        }

        settings
    }

    /// Apply settings from parsed config
    fn apply(&mut self, settings: &HashMap<String, String>) {
        if let Some(n) = parse_number::<usize>(settings, "min-query-chars") {
            self.min_query_chars = n.max(1);
        }

        if let Some(n) = parse_number::<u64>(settings, "search-debounce-ms") {
            self.search_debounce_ms = n.min(2000);
        }

        if let Some(n) = parse_number::<usize>(settings, "nav-offset") {
            self.nav_offset = n;
        }

        if let Some(n) = parse_number::<usize>(settings, "scroll-top-threshold") {
            self.scroll_top_threshold = n;
        }

        if let Some(n) = parse_number::<u64>(settings, "copy-feedback-ms") {
            self.copy_feedback_ms = n;
        }

        if let Some(n) = parse_number::<usize>(settings, "clipboard-size") {
            self.clipboard_size = n.clamp(1, 64);
        }

        if let Some(n) = parse_number::<usize>(settings, "wrap-width") {
            self.wrap_width = if n == 0 { 0 } else { n.clamp(20, 400) };
        }
    }

    /// Debounce interval, or None when every keystroke applies immediately
    pub fn debounce(&self) -> Option<Duration> {
        if self.search_debounce_ms == 0 {
            None
        } else {
            Some(Duration::from_millis(self.search_debounce_ms))
        }
    }

    pub fn copy_feedback(&self) -> Duration {
        Duration::from_millis(self.copy_feedback_ms)
    }
}

/// Parse a numeric setting, ignoring values that don't parse
fn parse_number<T: std::str::FromStr>(settings: &HashMap<String, String>, key: &str) -> Option<T> {
    let value = settings.get(key)?;
    match value.parse::<T>() {
        Ok(n) => Some(n),
        Err(_) => {
            tracing::warn!(key, value = value.as_str(), "ignoring invalid config value");
            None
        }
    }
}
