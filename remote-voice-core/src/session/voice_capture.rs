use std::sync::Arc;

use log::{debug, info, warn};
use parking_lot::Mutex;

use crate::models::config::VoiceCaptureConfig;
use crate::models::diagnostics::CaptureDiagnostics;
use crate::models::error::VoiceError;
use crate::models::peripheral::{PeripheralId, SessionCommand};
use crate::models::state::SessionState;
use crate::session::capture::{CaptureSession, SessionReport};
use crate::session::drain::DrainPath;
use crate::session::ingest::IngestPath;
use crate::session::stream::AudioStream;
use crate::traits::clock::{Clock, SystemClock};
use crate::traits::command_sink::SessionCommandSink;
use crate::traits::telemetry::{self, TelemetrySink};

struct Shared {
    session: Mutex<CaptureSession>,
    config: VoiceCaptureConfig,
    commands: Arc<dyn SessionCommandSink>,
    telemetry: Arc<dyn TelemetrySink>,
    clock: Arc<dyn Clock>,
}

/// Handle to the one capture session of a driver instance.
///
/// Cheap to clone. The producer side ([`IngestPath`]) and the consumer side
/// ([`DrainPath`], [`AudioStream`]) each hold a clone; everything they touch
/// sits behind a single lock:
///
/// ```text
/// report ─► IngestPath ─┐                      ┌─► SessionCommandSink
///                       ├─► Mutex<CaptureSession>
/// read() ─► DrainPath ──┘     (state + RingBuffer)└─► TelemetrySink
/// ```
///
/// The lock is never held while calling the command or telemetry sinks.
#[derive(Clone)]
pub struct VoiceCapture {
    shared: Arc<Shared>,
}

impl VoiceCapture {
    /// Validate `config`, allocate the ring buffer and start Idle.
    pub fn new(
        config: VoiceCaptureConfig,
        commands: Arc<dyn SessionCommandSink>,
        telemetry: Arc<dyn TelemetrySink>,
    ) -> Result<Self, VoiceError> {
        Self::with_clock(config, commands, telemetry, Arc::new(SystemClock))
    }

    pub fn with_clock(
        config: VoiceCaptureConfig,
        commands: Arc<dyn SessionCommandSink>,
        telemetry: Arc<dyn TelemetrySink>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, VoiceError> {
        config.validate()?;
        let session = CaptureSession::new(config.buffer_capacity)?;
        info!(
            "voice capture ready: {} byte buffer, voice key {:#06x}",
            config.buffer_capacity, config.voice_key_code
        );
        Ok(Self {
            shared: Arc::new(Shared {
                session: Mutex::new(session),
                config,
                commands,
                telemetry,
                clock,
            }),
        })
    }

    pub fn config(&self) -> &VoiceCaptureConfig {
        &self.shared.config
    }

    pub fn state(&self) -> SessionState {
        self.shared.session.lock().state()
    }

    pub fn diagnostics(&self) -> CaptureDiagnostics {
        self.shared.session.lock().diagnostics()
    }

    /// Bytes waiting to be drained.
    pub fn buffered_len(&self) -> usize {
        self.shared.session.lock().buffer().len()
    }

    pub fn ingest_path(&self) -> IngestPath {
        IngestPath::new(self.clone())
    }

    pub fn drain_path(&self) -> DrainPath {
        DrainPath::new(self.clone())
    }

    /// Open a consumer stream. See [`AudioStream`].
    pub fn open_stream(&self) -> AudioStream {
        AudioStream::open(self.clone())
    }

    /// Push-to-talk pressed on `peripheral`. Returns whether a new session
    /// started; a press during a running session is ignored.
    pub fn key_down(&self, peripheral: PeripheralId) -> bool {
        let now = self.shared.clock.now();
        let Some(mut start) = self.shared.session.lock().key_down(peripheral, now) else {
            return false;
        };
        if let Some(previous) = start.previous.take() {
            self.emit(previous);
        }
        info!(
            "voice session {} started by peripheral {}",
            start.generation, peripheral
        );

        // Sent unlocked. Reports of one peripheral are delivered in order, so
        // the owner's key-up cannot overtake this start; an acknowledgement
        // for a session that already ended is dropped by generation.
        let sent = match self.shared.commands.send(SessionCommand::Start, peripheral) {
            Ok(()) => true,
            Err(e) => {
                warn!("audio start command to {} failed: {}", peripheral, e);
                false
            }
        };
        self.shared.session.lock().start_acknowledged(&start, sent);
        true
    }

    /// Push-to-talk released on `peripheral`. Returns whether this ended the
    /// session; releases from any other peripheral are ignored.
    pub fn key_up(&self, peripheral: PeripheralId) -> bool {
        let now = self.shared.clock.now();
        let (end, underruns) = {
            let mut session = self.shared.session.lock();
            let end = session.key_up(peripheral, now);
            (end, session.buffer().underrun_count())
        };
        let Some(end) = end else {
            return false;
        };

        if let Err(e) = self.shared.commands.send(SessionCommand::Stop, peripheral) {
            warn!("audio stop command to {} failed: {}", peripheral, e);
            self.shared.session.lock().note_stop_failure();
        }
        info!("voice session ended by peripheral {}", end.peripheral);
        warn!("buffer underrun count {}", underruns);

        if let Some(report) = end.report {
            self.emit(report);
        }
        true
    }

    /// Buffer an audio payload from `peripheral`. Returns whether it was
    /// kept.
    pub fn write_audio(&self, peripheral: PeripheralId, payload: &[u8]) -> bool {
        let gate = self.shared.config.gate_idle_audio;
        let kept = self
            .shared
            .session
            .lock()
            .write_audio(peripheral, payload, gate);
        if !kept {
            debug!(
                "dropped {} audio bytes from {} outside its session",
                payload.len(),
                peripheral
            );
        }
        kept
    }

    /// The peripheral disconnected. An active session it owned ends without
    /// a stop command or telemetry.
    pub fn peripheral_removed(&self, peripheral: PeripheralId) -> bool {
        let ended = self.shared.session.lock().peripheral_removed(peripheral);
        if ended {
            info!("voice session dropped, peripheral {} removed", peripheral);
        }
        ended
    }

    pub(crate) fn note_secondary_codec(&self) {
        self.shared.session.lock().note_secondary_codec();
    }

    pub(crate) fn with_session<R>(&self, f: impl FnOnce(&mut CaptureSession) -> R) -> R {
        f(&mut self.shared.session.lock())
    }

    pub(crate) fn stream_opened(&self) {
        let now = self.shared.clock.now();
        self.shared.session.lock().stream_opened(now);
        debug!("audio stream opened");
    }

    pub(crate) fn stream_closed(&self) {
        let now = self.shared.clock.now();
        let report = self.shared.session.lock().stream_closed(now);
        debug!("audio stream closed");
        if let Some(report) = report {
            self.emit(report);
        }
    }

    fn emit(&self, report: SessionReport) {
        telemetry::emit(&*self.shared.telemetry, &report.samples, report.outcome);
    }
}
