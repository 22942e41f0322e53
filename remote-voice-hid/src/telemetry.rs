//! Telemetry sinks for the voice session timings.

use std::sync::atomic::{AtomicU64, Ordering};

use crossbeam_channel::{Receiver, Sender, TrySendError};
use log::{info, trace};

use remote_voice_core::{SessionOutcome, TelemetrySink};

/// Writes every sample and outcome to the log at `info` level.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogTelemetry;

impl TelemetrySink for LogTelemetry {
    fn record_latency_sample(&self, metric_name: &str, bucket_label: &str) {
        info!("{}={}", metric_name, bucket_label);
    }

    fn record_session_outcome(&self, outcome: SessionOutcome) {
        info!("{} count=1", outcome.counter_name());
    }
}

/// One item handed from the session to the metrics uploader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TelemetryEvent {
    Latency {
        metric_name: String,
        bucket_label: String,
    },
    Outcome(SessionOutcome),
}

/// Non-blocking sink backed by a bounded channel.
///
/// The session thread never waits on the uploader: when the queue is full
/// (or the receiver is gone) the event is dropped and counted.
pub struct QueuedTelemetry {
    tx: Sender<TelemetryEvent>,
    dropped: AtomicU64,
}

impl QueuedTelemetry {
    /// Create the sink and the receiving end the uploader drains.
    pub fn bounded(capacity: usize) -> (Self, Receiver<TelemetryEvent>) {
        let (tx, rx) = crossbeam_channel::bounded(capacity);
        let sink = Self {
            tx,
            dropped: AtomicU64::new(0),
        };
        (sink, rx)
    }

    /// Events discarded because the queue was full or disconnected.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    fn push(&self, event: TelemetryEvent) {
        match self.tx.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(event)) | Err(TrySendError::Disconnected(event)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                trace!("telemetry event dropped: {:?}", event);
            }
        }
    }
}

impl TelemetrySink for QueuedTelemetry {
    fn record_latency_sample(&self, metric_name: &str, bucket_label: &str) {
        self.push(TelemetryEvent::Latency {
            metric_name: metric_name.to_string(),
            bucket_label: bucket_label.to_string(),
        });
    }

    fn record_session_outcome(&self, outcome: SessionOutcome) {
        self.push(TelemetryEvent::Outcome(outcome));
    }
}
