//! Fakes for the collaborator traits, shared by the unit tests.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::models::error::{CommandError, VoiceError};
use crate::models::latency::SessionOutcome;
use crate::models::peripheral::{PeripheralId, SessionCommand};
use crate::traits::byte_sink::ByteSink;
use crate::traits::clock::Clock;
use crate::traits::command_sink::SessionCommandSink;
use crate::traits::telemetry::TelemetrySink;

#[derive(Default)]
pub struct RecordingCommands {
    pub sent: Mutex<Vec<(SessionCommand, PeripheralId)>>,
    pub fail_start: AtomicBool,
    pub fail_stop: AtomicBool,
}

impl RecordingCommands {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn sent(&self) -> Vec<(SessionCommand, PeripheralId)> {
        self.sent.lock().clone()
    }
}

impl SessionCommandSink for RecordingCommands {
    fn send(&self, command: SessionCommand, target: PeripheralId) -> Result<(), CommandError> {
        self.sent.lock().push((command, target));
        let fail = match command {
            SessionCommand::Start => self.fail_start.load(Ordering::SeqCst),
            SessionCommand::Stop => self.fail_stop.load(Ordering::SeqCst),
        };
        if fail {
            return Err(CommandError::Io("radio link down".into()));
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingTelemetry {
    pub samples: Mutex<Vec<(String, String)>>,
    pub outcomes: Mutex<Vec<SessionOutcome>>,
}

impl RecordingTelemetry {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn samples(&self) -> Vec<(String, String)> {
        self.samples.lock().clone()
    }

    pub fn outcomes(&self) -> Vec<SessionOutcome> {
        self.outcomes.lock().clone()
    }
}

impl TelemetrySink for RecordingTelemetry {
    fn record_latency_sample(&self, metric_name: &str, bucket_label: &str) {
        self.samples
            .lock()
            .push((metric_name.to_string(), bucket_label.to_string()));
    }

    fn record_session_outcome(&self, outcome: SessionOutcome) {
        self.outcomes.lock().push(outcome);
    }
}

/// Clock that only moves when told to.
pub struct ManualClock {
    now: Mutex<Instant>,
}

impl ManualClock {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            now: Mutex::new(Instant::now()),
        })
    }

    pub fn advance_ms(&self, ms: u64) {
        *self.now.lock() += Duration::from_millis(ms);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.now.lock()
    }
}

/// Sink whose every copy fails, like a bad user-space pointer.
pub struct FaultySink;

impl ByteSink for FaultySink {
    fn copy_out(&mut self, _head: &[u8], _tail: &[u8]) -> Result<(), VoiceError> {
        Err(VoiceError::Transport("bad address".into()))
    }
}
