//! Classification of raw HID input reports.
//!
//! The first byte of every report is its id. Only the ids that matter to the
//! voice path get their own variant; everything else is handed back to the
//! input-mapping layer untouched.

use super::error::VoiceError;
use super::peripheral::PeripheralKind;

pub const KEYBOARD_REPORT_ID: u8 = 0x01;
pub const CONSUMER_REPORT_ID: u8 = 0x02;
pub const VENDOR_KEY_REPORT_ID: u8 = 0xEF;
pub const OPUS_AUDIO_REPORT_ID: u8 = 0xF0;
pub const AUDIO_CONFIG_REPORT_ID: u8 = 0xF1;
pub const AUDIO_STATE_REPORT_ID: u8 = 0xF2;
pub const DIAG_REPORT_ID: u8 = 0xF3;
pub const ADPCM_AUDIO_REPORT_ID: u8 = 0xF4;
pub const GAME_CONTROLLER_VOICE_REPORT_ID: u8 = 0xF5;

/// What an input report means to the voice path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind<'a> {
    /// A consumer-control key change. `key_code` is the usage currently held,
    /// `0x0000` once every key is released.
    ControlKey { key_code: u16 },
    /// Opus-encoded audio with the report id already stripped.
    PrimaryAudio { payload: &'a [u8] },
    /// ADPCM audio. Accepted and discarded; the codec is not supported.
    SecondaryAudio { len: usize },
    /// Echo of the audio state output report.
    AudioState,
    /// Peripheral diagnostics.
    Diagnostic,
    /// Anything the voice path has no interest in.
    Other { report_id: u8 },
}

impl<'a> ReportKind<'a> {
    /// Classify a raw report received from a peripheral of the given kind.
    pub fn classify(kind: PeripheralKind, raw: &'a [u8]) -> Result<Self, VoiceError> {
        let (&report_id, body) = raw
            .split_first()
            .ok_or_else(|| VoiceError::MalformedReport("empty report".into()))?;

        let classified = match report_id {
            OPUS_AUDIO_REPORT_ID => Self::PrimaryAudio { payload: body },
            ADPCM_AUDIO_REPORT_ID => Self::SecondaryAudio { len: body.len() },
            AUDIO_STATE_REPORT_ID => Self::AudioState,
            DIAG_REPORT_ID => Self::Diagnostic,
            // Game controllers put AC Home on the consumer report.
            CONSUMER_REPORT_ID if kind == PeripheralKind::GameController => {
                Self::Other { report_id }
            }
            CONSUMER_REPORT_ID | GAME_CONTROLLER_VOICE_REPORT_ID => Self::ControlKey {
                key_code: key_code(report_id, body)?,
            },
            _ => Self::Other { report_id },
        };
        Ok(classified)
    }
}

fn key_code(report_id: u8, body: &[u8]) -> Result<u16, VoiceError> {
    match body {
        [lo, hi, ..] => Ok(u16::from_le_bytes([*lo, *hi])),
        _ => Err(VoiceError::MalformedReport(format!(
            "report {:#04x} carries {} byte(s), key code needs 2",
            report_id,
            body.len()
        ))),
    }
}
