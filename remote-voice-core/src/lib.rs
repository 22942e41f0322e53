//! # remote-voice-core
//!
//! Push-to-talk audio capture core for a wireless remote.
//!
//! Audio reports from the remote are buffered in a fixed-size, drop-oldest
//! ring buffer and drained by a polling consumer. A voice session state
//! machine arms and disarms capture on the push-to-talk key, tells the
//! peripheral to start and stop streaming, and reports bucketed session
//! timings. The HID transport, the metrics backend and the device node are
//! collaborators behind traits; see `remote-voice-hid` for the backend.
//!
//! ## Architecture
//!
//! ```text
//! remote-voice-core (this crate)
//! ├── traits/       ← SessionCommandSink, TelemetrySink, ByteSink, Clock
//! ├── models/       ← VoiceError, SessionState, VoiceCaptureConfig, ReportKind, latency buckets
//! ├── processing/   ← RingBuffer
//! └── session/      ← CaptureSession, VoiceCapture, IngestPath, DrainPath, AudioStream
//! ```
//!
//! ## Usage
//! ```
//! use std::sync::Arc;
//!
//! use remote_voice_core::{
//!     CommandError, NoopTelemetry, Peripheral, PeripheralId, SessionCommand,
//!     SessionCommandSink, VoiceCapture, VoiceCaptureConfig,
//! };
//!
//! struct Radio;
//!
//! impl SessionCommandSink for Radio {
//!     fn send(&self, _command: SessionCommand, _target: PeripheralId) -> Result<(), CommandError> {
//!         Ok(())
//!     }
//! }
//!
//! let capture = VoiceCapture::new(
//!     VoiceCaptureConfig::default(),
//!     Arc::new(Radio),
//!     Arc::new(NoopTelemetry),
//! )
//! .unwrap();
//! let ingest = capture.ingest_path();
//! let remote = Peripheral::remote(1);
//!
//! ingest.handle_report(remote, &[0x02, 0x21, 0x02]).unwrap(); // voice key down
//! ingest.handle_report(remote, &[0xF0, 0x11, 0x22]).unwrap(); // audio
//!
//! let mut stream = capture.open_stream();
//! let mut buf = [0u8; 64];
//! assert_eq!(stream.read_bytes(&mut buf).unwrap(), 2);
//! ```

pub mod models;
pub mod processing;
pub mod session;
pub mod traits;

#[cfg(test)]
mod testing;

// Re-export key types at crate root for convenience.
pub use models::config::VoiceCaptureConfig;
pub use models::diagnostics::CaptureDiagnostics;
pub use models::error::{CommandError, VoiceError};
pub use models::latency::{LatencyBucket, LatencyMetric, LatencySample, SessionOutcome};
pub use models::peripheral::{Peripheral, PeripheralId, PeripheralKind, SessionCommand};
pub use models::report::ReportKind;
pub use models::state::SessionState;
pub use processing::ring_buffer::RingBuffer;
pub use session::capture::{CaptureSession, SessionTiming};
pub use session::drain::DrainPath;
pub use session::ingest::{IngestOutcome, IngestPath};
pub use session::stream::AudioStream;
pub use session::voice_capture::VoiceCapture;
pub use traits::byte_sink::{ByteSink, SliceSink};
pub use traits::clock::{Clock, SystemClock};
pub use traits::command_sink::SessionCommandSink;
pub use traits::telemetry::{NoopTelemetry, TelemetrySink};
