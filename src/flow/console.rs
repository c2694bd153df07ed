// git-mux: Multi-Repository Branch Multiplexer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Result sink for multiplexed operations.
//!
//! Lines are plain text. Error lines carry an `error: ` prefix so they stay
//! distinguishable without color.

/// Destination for per-component headers and result lines.
pub trait Console {
    /// Start the section for one component.
    fn section(&mut self, component: &str);

    fn info(&mut self, message: &str);

    fn error(&mut self, message: &str);
}

#[must_use]
pub fn section_line(component: &str) -> String {
    format!("[{component}]")
}

#[must_use]
pub fn error_line(message: &str) -> String {
    format!("error: {message}")
}

/// Writes to stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdConsole;

impl Console for StdConsole {
    fn section(&mut self, component: &str) {
        println!("{}", section_line(component));
    }

    fn info(&mut self, message: &str) {
        println!("{message}");
    }

    fn error(&mut self, message: &str) {
        println!("{}", error_line(message));
    }
}

/// Collects lines in memory.
#[derive(Debug, Default, Clone)]
pub struct MemoryConsole {
    lines: Vec<String>,
}

impl MemoryConsole {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }
}

impl Console for MemoryConsole {
    fn section(&mut self, component: &str) {
        self.lines.push(section_line(component));
    }

    fn info(&mut self, message: &str) {
        self.lines.extend(message.lines().map(str::to_string));
    }

    fn error(&mut self, message: &str) {
        self.lines.push(error_line(message));
    }
}
