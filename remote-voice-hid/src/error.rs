use thiserror::Error;

use remote_voice_core::{PeripheralId, VoiceError};

/// Errors raised by the HID driver glue.
#[derive(Debug, Error)]
pub enum DriverError {
    #[error("device {vendor:#06x}:{product:#06x} is not supported")]
    UnsupportedDevice { vendor: u16, product: u16 },

    #[error("peripheral {0} was never probed")]
    UnknownPeripheral(PeripheralId),

    #[error(transparent)]
    Voice(#[from] VoiceError),
}
