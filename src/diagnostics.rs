//! Diagnostics sinks for ingestion and container runs.
//!
//! Library operations never log through process-wide state on their own.
//! Each run receives a [`DiagnosticsSink`]; the binary hands in a [`LogSink`]
//! that forwards to the `log` facade under a per-run target, tests hand in a
//! [`MemorySink`] and inspect what was reported.

use std::sync::Mutex;

use log::Level;

/// Receiver for progress and data-hygiene messages emitted by a single run.
pub trait DiagnosticsSink {
    /// Record a message at the given level.
    fn emit(&self, level: Level, message: &str);

    /// Record an informational message.
    fn info(&self, message: &str) {
        self.emit(Level::Info, message);
    }

    /// Record a debug message.
    fn debug(&self, message: &str) {
        self.emit(Level::Debug, message);
    }

    /// Record a warning.
    fn warn(&self, message: &str) {
        self.emit(Level::Warn, message);
    }
}

/// Sink forwarding to the `log` facade under a run-scoped target.
#[derive(Debug, Clone)]
pub struct LogSink {
    target: String,
}

impl LogSink {
    /// Create a sink whose records carry the target `stereo_exp::<run>`.
    pub fn new(run: &str) -> Self {
        Self {
            target: format!("stereo_exp::{run}"),
        }
    }

    /// The log target used for every record.
    pub fn target(&self) -> &str {
        &self.target
    }
}

impl DiagnosticsSink for LogSink {
    fn emit(&self, level: Level, message: &str) {
        log::log!(target: self.target.as_str(), level, "{}", message);
    }
}

/// Sink that keeps every message in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<(Level, String)>>,
}

impl MemorySink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the recorded messages in emission order.
    pub fn records(&self) -> Vec<(Level, String)> {
        match self.records.lock() {
            Ok(records) => records.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// True if any recorded message contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.records().iter().any(|(_, m)| m.contains(needle))
    }
}

impl DiagnosticsSink for MemorySink {
    fn emit(&self, level: Level, message: &str) {
        let mut records = match self.records.lock() {
            Ok(records) => records,
            Err(poisoned) => poisoned.into_inner(),
        };
        records.push((level, message.to_string()));
    }
}

/// Sink that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl DiagnosticsSink for NullSink {
    fn emit(&self, _level: Level, _message: &str) {}
}
