//! Terminal styling for the image dump.
//!
//! Three roles cover everything the dump highlights: section and entity
//! names are headings, code offsets that something jumps or dispatches to
//! are targets, and raw offsets or empty slots are muted.

use std::fmt;

/// Escape sequences per styling role. [`Colors::OFF`] makes every role a
/// no-op so callers never branch on whether color is enabled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Colors {
    pub heading: &'static str,
    pub target: &'static str,
    pub muted: &'static str,
    pub reset: &'static str,
}

impl Default for Colors {
    fn default() -> Self {
        Self::OFF
    }
}

impl Colors {
    /// Basic 16-color codes only.
    pub const ON: Self = Self {
        heading: "\x1b[34m",
        target: "\x1b[32m",
        muted: "\x1b[2m",
        reset: "\x1b[0m",
    };

    pub const OFF: Self = Self {
        heading: "",
        target: "",
        muted: "",
        reset: "",
    };

    pub fn new(enabled: bool) -> Self {
        if enabled { Self::ON } else { Self::OFF }
    }

    pub fn is_enabled(&self) -> bool {
        !self.reset.is_empty()
    }

    pub fn heading<T: fmt::Display>(&self, text: T) -> Painted<T> {
        self.paint(self.heading, text)
    }

    pub fn target<T: fmt::Display>(&self, text: T) -> Painted<T> {
        self.paint(self.target, text)
    }

    pub fn muted<T: fmt::Display>(&self, text: T) -> Painted<T> {
        self.paint(self.muted, text)
    }

    fn paint<T: fmt::Display>(&self, style: &'static str, text: T) -> Painted<T> {
        Painted {
            style,
            reset: self.reset,
            text,
        }
    }
}

/// A value wrapped in one styling role; formats as `style text reset`.
pub struct Painted<T> {
    style: &'static str,
    reset: &'static str,
    text: T,
}

impl<T: fmt::Display> fmt::Display for Painted<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.style, self.text, self.reset)
    }
}
