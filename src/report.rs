//! Progress and result reporting
//!
//! The workflow engine reports through an injected `Reporter` rather than
//! a process-wide logger, so tests can substitute a capturing sink and
//! assert on exactly what was emitted.

use std::io::Write;
use std::sync::Mutex;

use chrono::Utc;

// ascii color codes for console output
pub const LABEL_GREEN: &str = "\x1b[0;32m";
pub const LABEL_NO_COLOR: &str = "\x1b[0m";
pub const STARS: &str =
    "**********************************************************************";

/// Reporting capability injected into the workflow engine.
pub trait Reporter {
    /// Routine progress message
    fn info(&self, message: &str);

    /// Diagnostic message, usually suppressed
    fn debug(&self, message: &str);

    /// Problem that does not abort the run by itself
    fn warn(&self, message: &str);

    /// Attention block for run results (dashboard pointer on success)
    fn highlight(&self, lines: &[String]);
}

/// Console reporter for pipeline runs.
///
/// Lines follow the job runner's log convention:
/// `<timestamp> - scan-lane - <LEVEL> - <message>`.
pub struct ConsoleReporter {
    debug_enabled: bool,
}

impl ConsoleReporter {
    pub fn new(debug_enabled: bool) -> Self {
        Self { debug_enabled }
    }

    fn emit(&self, level: &str, message: &str) {
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        let _ = writeln!(
            out,
            "{} - scan-lane - {} - {}",
            Utc::now().format("%Y-%m-%d %H:%M:%S"),
            level,
            message
        );
    }
}

impl Reporter for ConsoleReporter {
    fn info(&self, message: &str) {
        self.emit("INFO", message);
    }

    fn debug(&self, message: &str) {
        if self.debug_enabled {
            self.emit("DEBUG", message);
        }
    }

    fn warn(&self, message: &str) {
        self.emit("WARNING", message);
    }

    fn highlight(&self, lines: &[String]) {
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        let _ = writeln!(out, "{}{}", LABEL_GREEN, STARS);
        for line in lines {
            let _ = writeln!(out, "{}", line);
        }
        let _ = writeln!(out, "{}{}{}", LABEL_GREEN, STARS, LABEL_NO_COLOR);
    }
}

/// A reporting event captured by `MemoryReporter`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportEvent {
    Info(String),
    Debug(String),
    Warn(String),
    Highlight(Vec<String>),
}

/// Capturing reporter for tests.
#[derive(Default)]
pub struct MemoryReporter {
    events: Mutex<Vec<ReportEvent>>,
}

impl MemoryReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything reported so far.
    pub fn events(&self) -> Vec<ReportEvent> {
        self.events.lock().expect("reporter lock poisoned").clone()
    }

    /// Info messages only, in emission order.
    pub fn info_messages(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                ReportEvent::Info(msg) => Some(msg),
                _ => None,
            })
            .collect()
    }

    /// Highlight blocks only, in emission order.
    pub fn highlights(&self) -> Vec<Vec<String>> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                ReportEvent::Highlight(lines) => Some(lines),
                _ => None,
            })
            .collect()
    }

    fn push(&self, event: ReportEvent) {
        self.events.lock().expect("reporter lock poisoned").push(event);
    }
}

impl Reporter for MemoryReporter {
    fn info(&self, message: &str) {
        self.push(ReportEvent::Info(message.to_string()));
    }

    fn debug(&self, message: &str) {
        self.push(ReportEvent::Debug(message.to_string()));
    }

    fn warn(&self, message: &str) {
        self.push(ReportEvent::Warn(message.to_string()));
    }

    fn highlight(&self, lines: &[String]) {
        self.push(ReportEvent::Highlight(lines.to_vec()));
    }
}
