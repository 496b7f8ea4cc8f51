//! Leveled console logging to stderr.

use colored::Colorize;

/// Always shown, used for warnings and the failure report.
pub const LEVEL_ALWAYS: u8 = 0;
/// Shown with `-v`.
pub const LEVEL_INFO: u8 = 1;
/// Shown with `-vv`.
pub const LEVEL_TRACE: u8 = 2;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Logger {
    verbosity: u8,
}

impl Logger {
    #[must_use]
    pub const fn new(verbosity: u8) -> Self {
        Self { verbosity }
    }

    #[must_use]
    pub const fn verbosity(&self) -> u8 {
        self.verbosity
    }

    /// Check if messages of the given level are printed.
    #[must_use]
    pub const fn enabled(&self, level: u8) -> bool {
        level <= self.verbosity
    }

    pub fn log(&self, level: u8, message: &str) {
        if self.enabled(level) {
            eprintln!("{message}");
        }
    }

    pub fn error(&self, message: &str) {
        self.log(LEVEL_ALWAYS, &message.red().to_string());
    }

    pub fn warn(&self, message: &str) {
        self.log(LEVEL_ALWAYS, &message.yellow().to_string());
    }

    pub fn info(&self, message: &str) {
        self.log(LEVEL_INFO, message);
    }

    pub fn trace(&self, message: &str) {
        self.log(LEVEL_TRACE, message);
    }
}
