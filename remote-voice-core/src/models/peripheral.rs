use std::fmt;

use serde::{Deserialize, Serialize};

use super::report::AUDIO_STATE_REPORT_ID;

/// Opaque identity of a connected peripheral.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PeripheralId(pub u64);

impl fmt::Display for PeripheralId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What sort of device a peripheral is.
///
/// Game controllers use the consumer-control report for an unrelated usage
/// (AC Home) and signal push-to-talk through a dedicated voice report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeripheralKind {
    Remote,
    GameController,
}

/// A connected peripheral as seen by the ingest path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Peripheral {
    pub id: PeripheralId,
    pub kind: PeripheralKind,
}

impl Peripheral {
    pub fn remote(id: u64) -> Self {
        Self {
            id: PeripheralId(id),
            kind: PeripheralKind::Remote,
        }
    }

    pub fn game_controller(id: u64) -> Self {
        Self {
            id: PeripheralId(id),
            kind: PeripheralKind::GameController,
        }
    }
}

/// Command telling a peripheral to start or stop streaming audio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionCommand {
    Start,
    Stop,
}

impl SessionCommand {
    /// On-wire output report: `[0xF2, 0x01]` to start, `[0xF2, 0x00]` to stop.
    pub fn output_report(self) -> [u8; 2] {
        match self {
            Self::Start => [AUDIO_STATE_REPORT_ID, 0x01],
            Self::Stop => [AUDIO_STATE_REPORT_ID, 0x00],
        }
    }
}

impl fmt::Display for SessionCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Start => f.write_str("start"),
            Self::Stop => f.write_str("stop"),
        }
    }
}
