use log::debug;

use crate::models::error::VoiceError;
use crate::models::peripheral::{Peripheral, PeripheralId};
use crate::models::report::ReportKind;
use crate::session::voice_capture::VoiceCapture;

/// What the caller should do with a report after the voice path saw it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
    /// Fully handled here.
    Consumed,
    /// Also deliver it to the regular input-mapping layer.
    PassThrough,
}

impl IngestOutcome {
    pub fn is_consumed(self) -> bool {
        matches!(self, Self::Consumed)
    }
}

/// Producer-side entry point, called once per input report.
#[derive(Clone)]
pub struct IngestPath {
    capture: VoiceCapture,
}

impl IngestPath {
    pub fn new(capture: VoiceCapture) -> Self {
        Self { capture }
    }

    /// Classify a raw report (first byte is the report id) and act on it.
    pub fn handle_report(
        &self,
        peripheral: Peripheral,
        raw: &[u8],
    ) -> Result<IngestOutcome, VoiceError> {
        let kind = ReportKind::classify(peripheral.kind, raw)?;
        Ok(self.dispatch(peripheral.id, kind))
    }

    /// Act on an already classified report.
    ///
    /// The first voice key press and the release are passed through as well,
    /// so the input layer still sees the key; a repeated press while a
    /// session runs is swallowed.
    pub fn dispatch(&self, peripheral: PeripheralId, kind: ReportKind<'_>) -> IngestOutcome {
        let config = self.capture.config();
        match kind {
            ReportKind::ControlKey { key_code } if key_code == config.voice_key_code => {
                if self.capture.key_down(peripheral) {
                    IngestOutcome::PassThrough
                } else {
                    IngestOutcome::Consumed
                }
            }
            ReportKind::ControlKey { key_code } if key_code == config.release_key_code => {
                self.capture.key_up(peripheral);
                IngestOutcome::PassThrough
            }
            ReportKind::ControlKey { .. } => IngestOutcome::PassThrough,
            ReportKind::PrimaryAudio { payload } => {
                self.capture.write_audio(peripheral, payload);
                IngestOutcome::Consumed
            }
            ReportKind::SecondaryAudio { len } => {
                debug!("secondary codec packet of {} bytes discarded", len);
                self.capture.note_secondary_codec();
                IngestOutcome::Consumed
            }
            ReportKind::AudioState | ReportKind::Diagnostic => IngestOutcome::Consumed,
            ReportKind::Other { .. } => IngestOutcome::PassThrough,
        }
    }
}
