//! Observability for rwstore
//!
//! - Structured JSON logging
//! - Lifecycle events
//! - Operation counters
//! - Diagnostic sinks for per-operation progress
//!
//! Observability is read-only: nothing here influences admission.

mod events;
mod logger;
mod metrics;
mod sink;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use metrics::{MetricsRegistry, MetricsSnapshot};
pub use sink::{DiagnosticSink, LogSink, MemorySink, NullSink, OperationEvent, TextSink};

/// Log a lifecycle event
pub fn log_event(event: Event) {
    log_event_with_fields(event, &[]);
}

/// Log a lifecycle event with fields
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    let severity = if event.is_fatal() {
        Severity::Fatal
    } else {
        Severity::Info
    };
    Logger::log(severity, event.as_str(), fields);
}
