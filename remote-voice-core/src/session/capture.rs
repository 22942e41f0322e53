use std::time::Instant;

use log::debug;

use crate::models::diagnostics::CaptureDiagnostics;
use crate::models::error::VoiceError;
use crate::models::latency::{LatencyMetric, LatencySample, SessionOutcome};
use crate::models::peripheral::PeripheralId;
use crate::models::state::SessionState;
use crate::processing::ring_buffer::RingBuffer;
use crate::traits::byte_sink::ByteSink;

/// Timing checkpoints of the current (or last) session.
///
/// Only ever read to derive telemetry, never for control decisions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionTiming {
    pub key_down_at: Option<Instant>,
    pub key_up_at: Option<Instant>,
    pub capture_start_at: Option<Instant>,
    pub capture_stop_at: Option<Instant>,
}

impl SessionTiming {
    /// Every sample whose two checkpoints have been stamped.
    pub fn latency_samples(&self) -> Vec<LatencySample> {
        LatencyMetric::ALL
            .into_iter()
            .filter_map(|metric| self.sample(metric))
            .collect()
    }

    fn sample(&self, metric: LatencyMetric) -> Option<LatencySample> {
        let (from, to) = match metric {
            LatencyMetric::KeyPressed => (self.key_down_at, self.key_up_at),
            LatencyMetric::DataRecord => (self.capture_start_at, self.capture_stop_at),
            LatencyMetric::RecordStartDelay => (self.key_down_at, self.capture_start_at),
            LatencyMetric::RecordStopDelay => (self.key_up_at, self.capture_stop_at),
        };
        Some(LatencySample::new(metric, from?, to?))
    }
}

/// A session that was just opened; the start command still has to be sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionStart {
    pub peripheral: PeripheralId,
    pub generation: u64,
    /// Telemetry of the previous session that was still waiting for its
    /// stream to close.
    pub previous: Option<SessionReport>,
}

/// Telemetry for one finished session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionReport {
    pub samples: Vec<LatencySample>,
    pub outcome: SessionOutcome,
}

/// A session that was just closed; the stop command still has to be sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionEnd {
    pub peripheral: PeripheralId,
    /// Ready-to-emit telemetry, or `None` when it waits for an open
    /// consumer stream to close.
    pub report: Option<SessionReport>,
}

/// The voice session state machine and the ring buffer it owns.
///
/// Pure bookkeeping: timestamps come in as arguments and collaborator calls
/// go out as return values, so the caller can drop its lock before talking
/// to the peripheral or the telemetry backend.
#[derive(Debug)]
pub struct CaptureSession {
    state: SessionState,
    command_sent: bool,
    timing: SessionTiming,
    generation: u64,
    telemetry_pending: bool,
    open_streams: usize,
    buffer: RingBuffer,
    diagnostics: CaptureDiagnostics,
}

impl CaptureSession {
    pub fn new(buffer_capacity: usize) -> Result<Self, VoiceError> {
        Ok(Self {
            state: SessionState::Idle,
            command_sent: false,
            timing: SessionTiming::default(),
            generation: 0,
            telemetry_pending: false,
            open_streams: 0,
            buffer: RingBuffer::new(buffer_capacity)?,
            diagnostics: CaptureDiagnostics::default(),
        })
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn active_peripheral(&self) -> Option<PeripheralId> {
        self.state.peripheral()
    }

    /// Whether the peripheral acknowledged the start command.
    pub fn command_sent(&self) -> bool {
        self.command_sent
    }

    pub fn timing(&self) -> SessionTiming {
        self.timing
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn buffer(&self) -> &RingBuffer {
        &self.buffer
    }

    pub fn open_streams(&self) -> usize {
        self.open_streams
    }

    pub fn diagnostics(&self) -> CaptureDiagnostics {
        CaptureDiagnostics {
            underrun_count: self.buffer.underrun_count(),
            overwritten_bytes: self.buffer.overwritten_bytes(),
            open_streams: self.open_streams,
            ..self.diagnostics.clone()
        }
    }

    /// Idle → Active. Ignored (returns `None`) while a session is running,
    /// whichever peripheral pressed the key.
    pub fn key_down(&mut self, peripheral: PeripheralId, now: Instant) -> Option<SessionStart> {
        if let SessionState::Active { peripheral: owner } = self.state {
            debug!("key down from {} ignored, session owned by {}", peripheral, owner);
            self.diagnostics.duplicate_key_downs += 1;
            return None;
        }

        let previous = self.take_pending_report();
        self.buffer.reset();
        self.generation += 1;
        self.command_sent = false;
        // A stream that is already open keeps its open stamp.
        let capture_start_at = if self.open_streams > 0 {
            self.timing.capture_start_at
        } else {
            None
        };
        self.timing = SessionTiming {
            key_down_at: Some(now),
            capture_start_at,
            ..SessionTiming::default()
        };
        self.state = SessionState::Active { peripheral };
        self.diagnostics.sessions_started += 1;

        Some(SessionStart {
            peripheral,
            generation: self.generation,
            previous,
        })
    }

    /// Record whether the start command for `start` went through. Ignored if
    /// that session has already ended.
    pub fn start_acknowledged(&mut self, start: &SessionStart, sent: bool) {
        if !sent {
            self.diagnostics.start_command_failures += 1;
        }
        if self.generation == start.generation && self.state.is_owned_by(start.peripheral) {
            self.command_sent = sent;
        }
    }

    /// Active → Idle, only for the owning peripheral.
    pub fn key_up(&mut self, peripheral: PeripheralId, now: Instant) -> Option<SessionEnd> {
        match self.state {
            SessionState::Active { peripheral: owner } if owner == peripheral => {}
            SessionState::Active { peripheral: owner } => {
                debug!("key up from {} ignored, session owned by {}", peripheral, owner);
                self.diagnostics.foreign_key_ups += 1;
                return None;
            }
            SessionState::Idle => return None,
        }

        self.state = SessionState::Idle;
        self.timing.key_up_at = Some(now);
        let armed = std::mem::take(&mut self.command_sent);

        let report = if !armed {
            self.diagnostics.sessions_not_armed += 1;
            Some(SessionReport {
                samples: self.timing.sample(LatencyMetric::KeyPressed).into_iter().collect(),
                outcome: SessionOutcome::VoiceNotStarted,
            })
        } else if self.open_streams == 0 {
            Some(self.started_report())
        } else {
            self.telemetry_pending = true;
            None
        };

        Some(SessionEnd { peripheral, report })
    }

    /// Drop the session without a stop command because its peripheral went
    /// away. Returns whether the peripheral owned the session.
    pub fn peripheral_removed(&mut self, peripheral: PeripheralId) -> bool {
        if !self.state.is_owned_by(peripheral) {
            return false;
        }
        self.state = SessionState::Idle;
        self.command_sent = false;
        true
    }

    /// Buffer an audio payload. With `gate` set, payloads are only accepted
    /// from the peripheral that owns an active session.
    pub fn write_audio(&mut self, peripheral: PeripheralId, payload: &[u8], gate: bool) -> bool {
        if gate && !self.state.is_owned_by(peripheral) {
            self.diagnostics.dropped_packets += 1;
            return false;
        }
        self.buffer.write(payload);
        self.diagnostics.audio_packets += 1;
        self.diagnostics.audio_bytes += payload.len() as u64;
        true
    }

    pub fn note_secondary_codec(&mut self) {
        self.diagnostics.secondary_codec_packets += 1;
    }

    pub fn note_stop_failure(&mut self) {
        self.diagnostics.stop_command_failures += 1;
    }

    /// Move up to `max_len` bytes into `sink`. Nothing is consumed if the
    /// sink fails.
    pub fn drain<S: ByteSink + ?Sized>(
        &mut self,
        max_len: usize,
        sink: &mut S,
    ) -> Result<usize, VoiceError> {
        let copied = self
            .buffer
            .read_with(max_len, |head, tail| sink.copy_out(head, tail))?;
        self.diagnostics.bytes_drained += copied as u64;
        Ok(copied)
    }

    /// A consumer stream was opened. Only the first concurrent open stamps
    /// the capture start.
    pub fn stream_opened(&mut self, now: Instant) {
        if self.open_streams == 0 {
            self.timing.capture_start_at = Some(now);
        }
        self.open_streams += 1;
    }

    /// A consumer stream was closed. The last close stamps the capture stop
    /// and releases telemetry held back at key-up.
    pub fn stream_closed(&mut self, now: Instant) -> Option<SessionReport> {
        if self.open_streams == 0 {
            return None;
        }
        self.open_streams -= 1;
        if self.open_streams > 0 {
            return None;
        }

        self.timing.capture_stop_at = Some(now);
        self.take_pending_report()
    }

    fn take_pending_report(&mut self) -> Option<SessionReport> {
        if std::mem::take(&mut self.telemetry_pending) {
            Some(self.started_report())
        } else {
            None
        }
    }

    fn started_report(&self) -> SessionReport {
        SessionReport {
            samples: self.timing.latency_samples(),
            outcome: SessionOutcome::VoiceStarted,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    const P1: PeripheralId = PeripheralId(1);
    const P2: PeripheralId = PeripheralId(2);

    fn at(base: Instant, ms: u64) -> Instant {
        base + Duration::from_millis(ms)
    }

    fn labels(report: &SessionReport) -> Vec<(&'static str, &'static str)> {
        report
            .samples
            .iter()
            .map(|s| (s.metric.metric_name(), s.bucket.label()))
            .collect()
    }

    #[test]
    fn key_down_activates_and_clears_buffer() {
        let t0 = Instant::now();
        let mut session = CaptureSession::new(8).unwrap();
        session.write_audio(P1, b"stale", false);
        assert_eq!(session.buffer().len(), 5);

        let start = session.key_down(P1, t0).unwrap();

        assert_eq!(
            start,
            SessionStart {
                peripheral: P1,
                generation: 1,
                previous: None,
            }
        );
        assert_eq!(session.state(), SessionState::Active { peripheral: P1 });
        assert!(session.buffer().is_empty());
        assert_eq!(session.timing().key_down_at, Some(t0));
        assert!(!session.command_sent());
    }

    #[test]
    fn duplicate_key_down_changes_nothing() {
        let t0 = Instant::now();
        let mut session = CaptureSession::new(8).unwrap();
        let start = session.key_down(P1, t0).unwrap();
        session.start_acknowledged(&start, true);
        session.write_audio(P1, b"abc", true);

        assert!(session.key_down(P1, at(t0, 50)).is_none());
        assert!(session.key_down(P2, at(t0, 60)).is_none());

        assert_eq!(session.active_peripheral(), Some(P1));
        assert_eq!(session.timing().key_down_at, Some(t0));
        assert_eq!(session.generation(), 1);
        assert_eq!(session.buffer().len(), 3);
        assert!(session.command_sent());
        assert_eq!(session.diagnostics().duplicate_key_downs, 2);
    }

    #[test]
    fn foreign_key_up_is_ignored() {
        let t0 = Instant::now();
        let mut session = CaptureSession::new(8).unwrap();
        session.key_down(P1, t0);

        assert!(session.key_up(P2, at(t0, 10)).is_none());
        assert_eq!(session.state(), SessionState::Active { peripheral: P1 });
        assert_eq!(session.timing().key_up_at, None);
        assert_eq!(session.diagnostics().foreign_key_ups, 1);

        assert!(session.key_up(P1, at(t0, 20)).is_some());
        assert!(session.state().is_idle());
    }

    #[test]
    fn key_up_while_idle_is_ignored() {
        let mut session = CaptureSession::new(8).unwrap();
        assert!(session.key_up(P1, Instant::now()).is_none());
        assert_eq!(session.diagnostics().foreign_key_ups, 0);
    }

    #[test]
    fn failed_start_keeps_session_open() {
        let t0 = Instant::now();
        let mut session = CaptureSession::new(8).unwrap();
        let start = session.key_down(P1, t0).unwrap();
        session.start_acknowledged(&start, false);

        assert!(session.state().is_active());
        assert!(session.write_audio(P1, b"xy", true));
        assert_eq!(session.diagnostics().start_command_failures, 1);
    }

    #[test]
    fn unarmed_session_reports_pressed_time_only() {
        let t0 = Instant::now();
        let mut session = CaptureSession::new(8).unwrap();
        let start = session.key_down(P1, t0).unwrap();
        session.start_acknowledged(&start, false);
        session.stream_opened(at(t0, 100));
        session.stream_closed(at(t0, 900));

        let end = session.key_up(P1, at(t0, 730)).unwrap();
        let report = end.report.unwrap();

        assert_eq!(report.outcome, SessionOutcome::VoiceNotStarted);
        assert_eq!(labels(&report), vec![("voice_key_pressed_time", "700-800ms")]);
        assert_eq!(session.diagnostics().sessions_not_armed, 1);
    }

    #[test]
    fn armed_session_reports_at_stream_close() {
        let t0 = Instant::now();
        let mut session = CaptureSession::new(8).unwrap();
        let start = session.key_down(P1, t0).unwrap();
        session.start_acknowledged(&start, true);
        session.stream_opened(at(t0, 120));

        let end = session.key_up(P1, at(t0, 1_000)).unwrap();
        assert!(end.report.is_none());
        assert!(!session.command_sent());

        let report = session.stream_closed(at(t0, 1_250)).unwrap();
        assert_eq!(report.outcome, SessionOutcome::VoiceStarted);
        assert_eq!(
            labels(&report),
            vec![
                ("voice_key_pressed_time", "1000-1100ms"),
                ("voice_data_record_time", "1100-1200ms"),
                ("voice_record_start_delay", "100-200ms"),
                ("voice_record_stop_delay", "200-300ms"),
            ]
        );

        // Already emitted.
        session.stream_opened(at(t0, 2_000));
        assert!(session.stream_closed(at(t0, 2_100)).is_none());
    }

    #[test]
    fn armed_session_with_stream_closed_reports_at_key_up() {
        let t0 = Instant::now();
        let mut session = CaptureSession::new(8).unwrap();
        let start = session.key_down(P1, t0).unwrap();
        session.start_acknowledged(&start, true);
        session.stream_opened(at(t0, 50));
        assert!(session.stream_closed(at(t0, 400)).is_none());

        let report = session.key_up(P1, at(t0, 2_000)).unwrap().report.unwrap();
        assert_eq!(report.outcome, SessionOutcome::VoiceStarted);
        // Stop before key up: negative delay clamps to the first bucket.
        assert!(labels(&report).contains(&("voice_record_stop_delay", "0-100ms")));
        assert!(labels(&report).contains(&("voice_key_pressed_time", ">1500ms")));
    }

    #[test]
    fn only_last_of_concurrent_streams_stamps() {
        let t0 = Instant::now();
        let mut session = CaptureSession::new(8).unwrap();
        session.stream_opened(at(t0, 10));
        session.stream_opened(at(t0, 20));
        assert_eq!(session.timing().capture_start_at, Some(at(t0, 10)));

        session.stream_closed(at(t0, 30));
        assert_eq!(session.timing().capture_stop_at, None);
        session.stream_closed(at(t0, 40));
        assert_eq!(session.timing().capture_stop_at, Some(at(t0, 40)));

        // Unbalanced close is harmless.
        assert!(session.stream_closed(at(t0, 50)).is_none());
        assert_eq!(session.open_streams(), 0);
    }

    #[test]
    fn open_stream_survives_new_session() {
        let t0 = Instant::now();
        let mut session = CaptureSession::new(8).unwrap();
        session.stream_opened(t0);
        session.key_down(P1, at(t0, 10));
        assert_eq!(session.timing().capture_start_at, Some(t0));
    }

    #[test]
    fn new_session_hands_back_pending_report() {
        let t0 = Instant::now();
        let mut session = CaptureSession::new(8).unwrap();
        let start = session.key_down(P1, t0).unwrap();
        session.start_acknowledged(&start, true);
        session.stream_opened(at(t0, 10));
        assert!(session.key_up(P1, at(t0, 20)).unwrap().report.is_none());

        let start = session.key_down(P2, at(t0, 30)).unwrap();
        assert_eq!(start.generation, 2);
        let previous = start.previous.unwrap();
        assert_eq!(previous.outcome, SessionOutcome::VoiceStarted);
        assert_eq!(
            labels(&previous),
            vec![
                ("voice_key_pressed_time", "0-100ms"),
                ("voice_record_start_delay", "0-100ms"),
            ]
        );

        // Emitted once only.
        assert!(session.stream_closed(at(t0, 40)).is_none());
    }

    #[test]
    fn armed_session_without_stream_reports_at_key_up() {
        let t0 = Instant::now();
        let mut session = CaptureSession::new(8).unwrap();
        let start = session.key_down(P1, t0).unwrap();
        session.start_acknowledged(&start, true);

        let report = session.key_up(P1, at(t0, 700)).unwrap().report.unwrap();
        assert_eq!(report.outcome, SessionOutcome::VoiceStarted);
        assert_eq!(labels(&report), vec![("voice_key_pressed_time", "700-800ms")]);

        let start = session.key_down(P1, at(t0, 800)).unwrap();
        assert!(start.previous.is_none());
    }

    #[test]
    fn stale_acknowledgement_is_ignored() {
        let t0 = Instant::now();
        let mut session = CaptureSession::new(8).unwrap();
        let first = session.key_down(P1, t0).unwrap();
        session.key_up(P1, at(t0, 10));
        session.key_down(P1, at(t0, 20));

        session.start_acknowledged(&first, true);
        assert!(!session.command_sent());
    }

    #[test]
    fn audio_gated_to_owner() {
        let mut session = CaptureSession::new(8).unwrap();
        assert!(!session.write_audio(P1, b"idle", true));

        session.key_down(P1, Instant::now());
        assert!(!session.write_audio(P2, b"other", true));
        assert!(session.write_audio(P1, b"mine", true));

        let diag = session.diagnostics();
        assert_eq!(diag.dropped_packets, 2);
        assert_eq!(diag.audio_packets, 1);
        assert_eq!(diag.audio_bytes, 4);
        assert_eq!(session.buffer().len(), 4);
    }

    #[test]
    fn ungated_audio_is_buffered_while_idle() {
        let mut session = CaptureSession::new(8).unwrap();
        assert!(session.write_audio(P1, b"idle", false));
        assert_eq!(session.buffer().len(), 4);
    }

    #[test]
    fn removing_owner_ends_session() {
        let mut session = CaptureSession::new(8).unwrap();
        let start = session.key_down(P1, Instant::now()).unwrap();
        session.start_acknowledged(&start, true);

        assert!(!session.peripheral_removed(P2));
        assert!(session.state().is_active());
        assert!(session.peripheral_removed(P1));
        assert!(session.state().is_idle());
        assert!(!session.command_sent());
    }

    #[test]
    fn drain_counts_bytes() {
        let mut session = CaptureSession::new(8).unwrap();
        session.key_down(P1, Instant::now());
        session.write_audio(P1, b"hello", true);

        let mut out = Vec::new();
        assert_eq!(session.drain(3, &mut out).unwrap(), 3);
        assert_eq!(out, b"hel");
        assert_eq!(session.drain(8, &mut out).unwrap(), 2);
        assert_eq!(session.drain(8, &mut out).unwrap(), 0);

        let diag = session.diagnostics();
        assert_eq!(diag.bytes_drained, 5);
        assert_eq!(diag.underrun_count, 1);
    }
}
