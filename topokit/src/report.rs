//! Progress reporting.
//!
//! Drivers describe what they do as one human-readable line per event. The
//! binary prints them; tests collect them.

use std::cell::RefCell;

/// Sink for driver progress lines.
pub trait Reporter {
    fn report(&self, line: &str);
}

/// Prints every line to stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutReporter;

impl Reporter for StdoutReporter {
    fn report(&self, line: &str) {
        println!("{line}");
    }
}

/// Keeps every line in memory.
#[derive(Debug, Default)]
pub struct MemoryReporter {
    lines: RefCell<Vec<String>>,
}

impl MemoryReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all lines so far.
    pub fn lines(&self) -> Vec<String> {
        self.lines.borrow().clone()
    }

    /// Number of lines containing `needle`.
    pub fn count(&self, needle: &str) -> usize {
        self.lines
            .borrow()
            .iter()
            .filter(|line| line.contains(needle))
            .count()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.count(needle) > 0
    }
}

impl Reporter for MemoryReporter {
    fn report(&self, line: &str) {
        self.lines.borrow_mut().push(line.to_string());
    }
}
