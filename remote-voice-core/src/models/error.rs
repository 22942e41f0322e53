use thiserror::Error;

/// Errors surfaced by the capture core.
///
/// Out-of-session events (audio while idle, a key-up from a peripheral that
/// does not own the session, a duplicate key-down) are not errors and never
/// show up here.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VoiceError {
    /// Copying bytes into the consumer's sink failed. Buffer accounting was
    /// left untouched.
    #[error("transport fault: {0}")]
    Transport(String),

    #[error("failed to allocate {capacity}-byte audio buffer")]
    AllocationFailed { capacity: usize },

    #[error("configuration failed: {0}")]
    ConfigurationFailed(String),

    #[error("malformed report: {0}")]
    MalformedReport(String),
}

/// Failure reported by a [`SessionCommandSink`](crate::SessionCommandSink).
///
/// Logged by the session and never propagated to the key-event caller.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("peripheral {0} is not registered")]
    UnknownPeripheral(u64),

    #[error("output report failed: {0}")]
    Io(String),
}
