//! Bucketed session-timing samples.
//!
//! Deltas are reduced to one of sixteen 100 ms wide buckets so the telemetry
//! backend sees a small, fixed label set.

use std::fmt;
use std::time::Instant;

const BUCKET_WIDTH_MS: i64 = 100;

const BUCKET_LABELS: [&str; 16] = [
    "0-100ms",
    "100-200ms",
    "200-300ms",
    "300-400ms",
    "400-500ms",
    "500-600ms",
    "600-700ms",
    "700-800ms",
    "800-900ms",
    "900-1000ms",
    "1000-1100ms",
    "1100-1200ms",
    "1200-1300ms",
    "1300-1400ms",
    "1400-1500ms",
    ">1500ms",
];

/// One of the sixteen latency buckets. The last one is open-ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LatencyBucket(u8);

impl LatencyBucket {
    pub const COUNT: usize = BUCKET_LABELS.len();

    /// Negative deltas land in the first bucket, anything from 1500 ms up in
    /// the last.
    pub fn from_millis(delta_ms: i64) -> Self {
        let index = (delta_ms / BUCKET_WIDTH_MS).clamp(0, Self::COUNT as i64 - 1);
        Self(index as u8)
    }

    /// Bucket for `later - earlier`, signed.
    pub fn between(earlier: Instant, later: Instant) -> Self {
        Self::from_millis(signed_millis(earlier, later))
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn label(self) -> &'static str {
        BUCKET_LABELS[self.index()]
    }
}

impl fmt::Display for LatencyBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

fn signed_millis(earlier: Instant, later: Instant) -> i64 {
    match later.checked_duration_since(earlier) {
        Some(elapsed) => i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX),
        None => -i64::try_from(earlier.duration_since(later).as_millis()).unwrap_or(i64::MAX),
    }
}

/// The four timings derived from a voice session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LatencyMetric {
    /// Key up minus key down.
    KeyPressed,
    /// Stream close minus stream open.
    DataRecord,
    /// Stream open minus key down.
    RecordStartDelay,
    /// Stream close minus key up.
    RecordStopDelay,
}

impl LatencyMetric {
    pub const ALL: [LatencyMetric; 4] = [
        Self::KeyPressed,
        Self::DataRecord,
        Self::RecordStartDelay,
        Self::RecordStopDelay,
    ];

    /// Name reported to the telemetry backend.
    pub fn metric_name(self) -> &'static str {
        match self {
            Self::KeyPressed => "voice_key_pressed_time",
            Self::DataRecord => "voice_data_record_time",
            Self::RecordStartDelay => "voice_record_start_delay",
            Self::RecordStopDelay => "voice_record_stop_delay",
        }
    }
}

/// A metric paired with the bucket its delta fell into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LatencySample {
    pub metric: LatencyMetric,
    pub bucket: LatencyBucket,
}

impl LatencySample {
    pub fn new(metric: LatencyMetric, earlier: Instant, later: Instant) -> Self {
        Self {
            metric,
            bucket: LatencyBucket::between(earlier, later),
        }
    }
}

/// How a finished session is counted by the telemetry backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionOutcome {
    /// The peripheral acknowledged the start command.
    VoiceStarted,
    /// The start command never went through.
    VoiceNotStarted,
}

impl SessionOutcome {
    pub fn counter_name(self) -> &'static str {
        match self {
            Self::VoiceStarted => "voice-started",
            Self::VoiceNotStarted => "voice-not-started",
        }
    }
}
