//! Terminal output formatting for the CLI.
//!
//! Styled output with automatic TTY detection and respect for the
//! NO_COLOR environment variable.

use std::io::{self, IsTerminal};

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";

/// Console output handler with color support detection.
#[derive(Debug, Clone, Copy)]
pub struct Console {
    colors_enabled: bool,
}

impl Default for Console {
    fn default() -> Self {
        Self::new()
    }
}

impl Console {
    /// Colors are disabled when `NO_COLOR` is set or stdout is not a TTY.
    pub fn new() -> Self {
        Self {
            colors_enabled: std::env::var("NO_COLOR").is_err() && io::stdout().is_terminal(),
        }
    }

    fn paint(&self, code: &str, text: &str) -> String {
        if self.colors_enabled {
            format!("{code}{text}{RESET}")
        } else {
            text.to_string()
        }
    }

    /// Section heading.
    pub fn section(&self, text: &str) {
        println!("\n{}", self.paint(BOLD, text));
    }

    /// Progress step.
    pub fn step(&self, text: &str) {
        println!("{} {text}", self.paint(CYAN, "→"));
    }

    /// Neutral information.
    pub fn info(&self, text: &str) {
        println!("{} {text}", self.paint(DIM, "·"));
    }

    /// Successful completion.
    pub fn success(&self, text: &str) {
        println!("{} {text}", self.paint(GREEN, "✓"));
    }

    /// Non-fatal problem.
    pub fn warning(&self, text: &str) {
        println!("{} {text}", self.paint(YELLOW, "!"));
    }

    /// Failure.
    pub fn error(&self, text: &str) {
        eprintln!("{} {text}", self.paint(RED, "✗"));
    }

    /// Aligned label/value pair for record display.
    pub fn field(&self, label: &str, value: &str) {
        // Pad before painting so escape codes don't break alignment.
        println!("  {} {value}", self.paint(DIM, &format!("{label:<14}")));
    }
}
