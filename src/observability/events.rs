//! Lifecycle events
//!
//! Events that occur outside individual operations: engine startup and
//! shutdown, configuration, shell sessions.

use std::fmt;

/// Observable lifecycle events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// Coordination state and store being constructed
    EngineStart,
    /// Engine ready to admit operations
    EngineReady,
    /// Configuration loaded
    ConfigLoaded,
    /// Configuration rejected (FATAL)
    ConfigInvalid,
    /// Command source began reading commands
    SessionStart,
    /// Command could not be parsed
    CommandRejected,
    /// Waiting for outstanding operations
    ShutdownStart,
    /// All operations joined
    ShutdownComplete,
}

impl Event {
    /// Returns the event name string
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::EngineStart => "ENGINE_START",
            Event::EngineReady => "ENGINE_READY",
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::ConfigInvalid => "CONFIG_INVALID",
            Event::SessionStart => "SESSION_START",
            Event::CommandRejected => "COMMAND_REJECTED",
            Event::ShutdownStart => "SHUTDOWN_START",
            Event::ShutdownComplete => "SHUTDOWN_COMPLETE",
        }
    }

    /// Whether this event terminates the process
    pub fn is_fatal(&self) -> bool {
        matches!(self, Event::ConfigInvalid)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
