use crate::models::latency::{LatencySample, SessionOutcome};

/// Receives bucketed session timings. Fire-and-forget.
///
/// Called without the session lock held, from whichever context ended the
/// session (the producer on key-up, the consumer on stream close).
/// Implementations must not block; see `QueuedTelemetry` in the HID backend
/// for a bounded, non-blocking variant.
pub trait TelemetrySink: Send + Sync {
    fn record_latency_sample(&self, metric_name: &str, bucket_label: &str);

    /// Counts a finished session. Ignored by default.
    fn record_session_outcome(&self, _outcome: SessionOutcome) {}
}

/// Forward a batch of samples followed by the session outcome.
pub(crate) fn emit(sink: &dyn TelemetrySink, samples: &[LatencySample], outcome: SessionOutcome) {
    for sample in samples {
        sink.record_latency_sample(sample.metric.metric_name(), sample.bucket.label());
    }
    sink.record_session_outcome(outcome);
}

/// Telemetry sink that drops everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTelemetry;

impl TelemetrySink for NoopTelemetry {
    fn record_latency_sample(&self, _metric_name: &str, _bucket_label: &str) {}
}
