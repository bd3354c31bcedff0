//! Terminal colors for status lines.

use colored::Color;
use std::io::IsTerminal;

/// Role of a piece of text in a status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    /// The `==>` arrow of a plain status line.
    Label,
    /// The message itself.
    Highlight,
    /// Arrow and items of a progress line.
    Success,
    /// `Error:` / `Warning:` labels.
    Failure,
}

impl Tag {
    fn color(self) -> Color {
        match self {
            Tag::Label => Color::BrightBlue,
            Tag::Highlight => Color::BrightWhite,
            Tag::Success => Color::BrightGreen,
            Tag::Failure => Color::BrightRed,
        }
    }
}

/// Wraps text in the escape codes for a [`Tag`].
pub trait Colorizer {
    fn colorize(&self, tag: Tag, text: &str) -> String;
}

/// Leaves text untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainColorizer;

impl Colorizer for PlainColorizer {
    fn colorize(&self, _tag: Tag, text: &str) -> String {
        text.to_string()
    }
}

/// Bold ANSI colors, optionally switched off.
#[derive(Debug, Clone, Copy)]
pub struct AnsiColorizer {
    enabled: bool,
}

impl AnsiColorizer {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    /// Enabled when `stream` is a terminal and `NO_COLOR`/`CLICOLOR` allow it.
    pub fn auto(stream: &impl IsTerminal) -> Self {
        Self::new(stream.is_terminal() && colored::control::SHOULD_COLORIZE.should_colorize())
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

impl Colorizer for AnsiColorizer {
    fn colorize(&self, tag: Tag, text: &str) -> String {
        if !self.enabled {
            return text.to_string();
        }
        // Not rendered through `ColoredString`: its `Display` consults the
        // process-wide `SHOULD_COLORIZE`, which would override `enabled`.
        format!("\x1b[1;{}m{}\x1b[0m", tag.color().to_fg_str(), text)
    }
}
