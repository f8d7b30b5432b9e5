//! Diagnostic sinks
//!
//! The executor reports every operation state transition to a sink. Sinks
//! are a side channel: nothing they do affects admission or results.

use std::io::{self, Write};
use std::sync::{Mutex, PoisonError};

use uuid::Uuid;

use crate::executor::OperationState;
use crate::gate::{AccessMode, Occupancy};

use super::logger::{Logger, Severity};

/// One state transition of one operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationEvent {
    /// Operation id
    pub op_id: Uuid,
    /// Read or write
    pub mode: AccessMode,
    /// Record name
    pub name: String,
    /// State entered
    pub state: OperationState,
    /// Occupancy when the state was entered
    pub occupancy: Occupancy,
    /// Record size for reads, payload length for writes
    pub bytes: usize,
}

/// Receiver of operation transitions
pub trait DiagnosticSink: Send + Sync {
    /// Record one transition
    fn record(&self, event: &OperationEvent);
}

/// Human-readable progress lines on stdout
#[derive(Debug, Default)]
pub struct TextSink;

impl TextSink {
    /// Create a stdout text sink
    pub fn new() -> Self {
        Self
    }

    pub(crate) fn format(event: &OperationEvent) -> Option<String> {
        let Occupancy { readers, writers, .. } = event.occupancy;
        match (&event.state, event.mode) {
            (OperationState::InCriticalSection, AccessMode::Read) => Some(format!(
                "Reading {} of {} bytes with {} readers and {} writers present",
                event.name, event.bytes, readers, writers
            )),
            (OperationState::InCriticalSection, AccessMode::Write) => Some(format!(
                "Writing to {} added {} bytes with {} readers and {} writers present",
                event.name, event.bytes, readers, writers
            )),
            (OperationState::Failed(code), _) if *code == "RWSTORE_NOT_FOUND" => {
                Some(format!("Record not found: {}", event.name))
            }
            (OperationState::Failed(code), mode) => {
                Some(format!("{} of {} failed: {}", mode, event.name, code))
            }
            _ => None,
        }
    }
}

impl DiagnosticSink for TextSink {
    fn record(&self, event: &OperationEvent) {
        if let Some(line) = Self::format(event) {
            let mut stdout = io::stdout().lock();
            let _ = writeln!(stdout, "{}", line);
            let _ = stdout.flush();
        }
    }
}

/// Structured JSON lines through `Logger`
#[derive(Debug, Default)]
pub struct LogSink;

impl LogSink {
    /// Create a JSON log sink
    pub fn new() -> Self {
        Self
    }
}

impl DiagnosticSink for LogSink {
    fn record(&self, event: &OperationEvent) {
        let severity = match event.state {
            OperationState::Completed => Severity::Info,
            OperationState::Failed(_) => Severity::Warn,
            _ => Severity::Trace,
        };
        let name = format!("{}_{}", event.mode, event.state.as_str());
        let op_id = event.op_id.to_string();
        let readers = event.occupancy.readers.to_string();
        let writers = event.occupancy.writers.to_string();
        let waiting = event.occupancy.writers_waiting.to_string();
        let bytes = event.bytes.to_string();

        let mut fields = vec![
            ("op_id", op_id.as_str()),
            ("name", event.name.as_str()),
            ("readers", readers.as_str()),
            ("writers", writers.as_str()),
            ("writers_waiting", waiting.as_str()),
            ("bytes", bytes.as_str()),
        ];
        if let OperationState::Failed(code) = event.state {
            fields.push(("code", code));
        }

        Logger::log(severity, &name, &fields);
    }
}

/// Captures events in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<OperationEvent>>,
}

impl MemorySink {
    /// Create an empty memory sink
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded events, oldest first
    pub fn events(&self) -> Vec<OperationEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// States entered by one operation, in order
    pub fn states_for(&self, op_id: Uuid) -> Vec<OperationState> {
        self.events()
            .into_iter()
            .filter(|e| e.op_id == op_id)
            .map(|e| e.state)
            .collect()
    }
}

impl DiagnosticSink for MemorySink {
    fn record(&self, event: &OperationEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event.clone());
    }
}

/// Discards all events
#[derive(Debug, Default)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn record(&self, _event: &OperationEvent) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(mode: AccessMode, state: OperationState) -> OperationEvent {
        OperationEvent {
            op_id: Uuid::nil(),
            mode,
            name: "f".to_string(),
            state,
            occupancy: Occupancy {
                readers: 2,
                writers: 0,
                writers_waiting: 1,
            },
            bytes: 4,
        }
    }

    #[test]
    fn test_text_read_line() {
        let line = TextSink::format(&event(AccessMode::Read, OperationState::InCriticalSection));
        assert_eq!(
            line.as_deref(),
            Some("Reading f of 4 bytes with 2 readers and 0 writers present")
        );
    }

    #[test]
    fn test_text_write_line() {
        let line = TextSink::format(&event(AccessMode::Write, OperationState::InCriticalSection));
        assert_eq!(
            line.as_deref(),
            Some("Writing to f added 4 bytes with 2 readers and 0 writers present")
        );
    }

    #[test]
    fn test_text_not_found_line() {
        let line = TextSink::format(&event(
            AccessMode::Read,
            OperationState::Failed("RWSTORE_NOT_FOUND"),
        ));
        assert_eq!(line.as_deref(), Some("Record not found: f"));
    }

    #[test]
    fn test_text_skips_other_states() {
        assert!(TextSink::format(&event(AccessMode::Read, OperationState::Admitted)).is_none());
        assert!(TextSink::format(&event(AccessMode::Write, OperationState::Completed)).is_none());
    }

    #[test]
    fn test_memory_sink_filters_by_operation() {
        let sink = MemorySink::new();
        sink.record(&event(AccessMode::Read, OperationState::Requested));
        let mut other = event(AccessMode::Read, OperationState::Requested);
        other.op_id = Uuid::new_v4();
        sink.record(&other);
        sink.record(&event(AccessMode::Read, OperationState::Completed));

        assert_eq!(sink.events().len(), 3);
        assert_eq!(
            sink.states_for(Uuid::nil()),
            vec![OperationState::Requested, OperationState::Completed]
        );
    }
}
