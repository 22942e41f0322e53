use log::error;

use crate::models::error::VoiceError;
use crate::session::voice_capture::VoiceCapture;
use crate::traits::byte_sink::{ByteSink, SliceSink};

/// Consumer-side entry point, called once per read request.
///
/// Never waits for data: an empty buffer returns `Ok(0)` at once and counts
/// an underrun, leaving it to the caller to poll again.
#[derive(Clone)]
pub struct DrainPath {
    capture: VoiceCapture,
}

impl DrainPath {
    pub fn new(capture: VoiceCapture) -> Self {
        Self { capture }
    }

    /// Copy up to `max_len` buffered bytes into `sink` and return how many
    /// were copied. If the sink fails the bytes stay buffered.
    pub fn drain<S: ByteSink + ?Sized>(
        &self,
        max_len: usize,
        sink: &mut S,
    ) -> Result<usize, VoiceError> {
        let result = self
            .capture
            .with_session(|session| session.drain(max_len, sink));
        if let Err(ref e) = result {
            error!("audio drain of up to {} bytes failed: {}", max_len, e);
        }
        result
    }

    /// Fill as much of `out` as the buffer allows.
    pub fn read_into(&self, out: &mut [u8]) -> Result<usize, VoiceError> {
        let max_len = out.len();
        self.drain(max_len, &mut SliceSink::new(out))
    }

    pub(crate) fn capture(&self) -> &VoiceCapture {
        &self.capture
    }
}
