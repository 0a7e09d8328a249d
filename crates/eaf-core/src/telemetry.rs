//! Logging collaborator passed explicitly into engines and pipeline stages.
//!
//! Components never reach for a global logger; they receive a
//! [`SharedTelemetry`] at construction. The default implementation forwards
//! to `tracing`, and [`RecordingTelemetry`] keeps entries in memory so tests
//! can assert on what was reported.

use std::sync::{Arc, Mutex};

/// Severity of a telemetry entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Debug,
    Info,
    Warn,
    Error,
}

/// Sink for component log events.
pub trait Telemetry: Send + Sync {
    fn emit(&self, level: Level, component: &str, message: &str);

    fn debug(&self, component: &str, message: &str) {
        self.emit(Level::Debug, component, message);
    }

    fn info(&self, component: &str, message: &str) {
        self.emit(Level::Info, component, message);
    }

    fn warn(&self, component: &str, message: &str) {
        self.emit(Level::Warn, component, message);
    }

    fn error(&self, component: &str, message: &str) {
        self.emit(Level::Error, component, message);
    }
}

pub type SharedTelemetry = Arc<dyn Telemetry>;

/// Forwards every entry to the `tracing` subscriber.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingTelemetry;

impl TracingTelemetry {
    pub fn shared() -> SharedTelemetry {
        Arc::new(Self)
    }
}

impl Telemetry for TracingTelemetry {
    fn emit(&self, level: Level, component: &str, message: &str) {
        match level {
            Level::Debug => tracing::debug!(component, "{message}"),
            Level::Info => tracing::info!(component, "{message}"),
            Level::Warn => tracing::warn!(component, "{message}"),
            Level::Error => tracing::error!(component, "{message}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryEntry {
    pub level: Level,
    pub component: String,
    pub message: String,
}

/// In-memory sink.
#[derive(Debug, Default)]
pub struct RecordingTelemetry {
    entries: Mutex<Vec<TelemetryEntry>>,
}

impl RecordingTelemetry {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn entries(&self) -> Vec<TelemetryEntry> {
        match self.entries.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Entries at `level` or above.
    pub fn at_least(&self, level: Level) -> Vec<TelemetryEntry> {
        self.entries()
            .into_iter()
            .filter(|e| e.level >= level)
            .collect()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.entries().iter().any(|e| e.message.contains(needle))
    }
}

impl Telemetry for RecordingTelemetry {
    fn emit(&self, level: Level, component: &str, message: &str) {
        let entry = TelemetryEntry {
            level,
            component: component.to_string(),
            message: message.to_string(),
        };
        match self.entries.lock() {
            Ok(mut guard) => guard.push(entry),
            Err(poisoned) => poisoned.into_inner().push(entry),
        }
    }
}
