use crate::models::error::CommandError;
use crate::models::peripheral::{PeripheralId, SessionCommand};

/// Delivers start/stop commands to a peripheral.
///
/// Called without the session lock held. A failure is logged by the session
/// and treated as a degraded but ongoing session, never as an error for the
/// caller of the key event.
pub trait SessionCommandSink: Send + Sync {
    fn send(&self, command: SessionCommand, target: PeripheralId) -> Result<(), CommandError>;
}
