//! Console formatting shared by the example programs.
//!
//! Colors are always emitted; there is no terminal or `NO_COLOR` detection.

use std::io::{self, Write};

/// Width of separator rules.
pub const RULE_WIDTH: usize = 50;

const RESET: &str = "\x1b[0m";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Red,
    Green,
    Yellow,
    Blue,
}

impl Color {
    /// ANSI SGR sequence selecting this foreground color.
    pub fn code(self) -> &'static str {
        match self {
            Color::Red => "\x1b[31m",
            Color::Green => "\x1b[32m",
            Color::Yellow => "\x1b[33m",
            Color::Blue => "\x1b[34m",
        }
    }
}

/// Wrap `message` in the color code and a trailing reset.
pub fn paint(color: Color, message: &str) -> String {
    format!("{}{}{}", color.code(), message, RESET)
}

/// Write one colored line.
pub fn log<W: Write + ?Sized>(out: &mut W, color: Color, message: &str) -> io::Result<()> {
    writeln!(out, "{}", paint(color, message))
}

/// A separator made of `RULE_WIDTH` copies of `ch`.
pub fn rule(ch: char) -> String {
    std::iter::repeat(ch).take(RULE_WIDTH).collect()
}
