use serde::Serialize;

/// Counters for debugging the capture path.
///
/// A snapshot is taken under the session lock, so the fields are consistent
/// with each other.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CaptureDiagnostics {
    pub sessions_started: u64,
    pub sessions_not_armed: u64,
    pub duplicate_key_downs: u64,
    pub foreign_key_ups: u64,
    pub start_command_failures: u64,
    pub stop_command_failures: u64,
    pub audio_packets: u64,
    pub audio_bytes: u64,
    pub dropped_packets: u64,
    pub secondary_codec_packets: u64,
    pub bytes_drained: u64,
    pub underrun_count: u64,
    pub overwritten_bytes: u64,
    pub open_streams: usize,
}
