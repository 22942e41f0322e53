use std::io;

use crate::models::error::VoiceError;
use crate::session::drain::DrainPath;
use crate::session::voice_capture::VoiceCapture;
use crate::traits::byte_sink::ByteSink;

/// An open consumer handle on the capture buffer, the user-space side of
/// the audio device node.
///
/// Opening stamps the capture start and closing (explicitly or on drop)
/// stamps the capture stop, which may release the telemetry of a session
/// that already ended. Several handles may be open at once; only the first
/// open and the last close are stamped.
///
/// Reads never block. Through [`io::Read`] an empty buffer reads as `Ok(0)`,
/// which here means "nothing yet", not end of stream.
pub struct AudioStream {
    drain: DrainPath,
    closed: bool,
}

impl AudioStream {
    pub(crate) fn open(capture: VoiceCapture) -> Self {
        capture.stream_opened();
        Self {
            drain: DrainPath::new(capture),
            closed: false,
        }
    }

    /// Copy buffered audio into `buf`; see [`DrainPath::read_into`].
    pub fn read_bytes(&mut self, buf: &mut [u8]) -> Result<usize, VoiceError> {
        self.drain.read_into(buf)
    }

    /// See [`DrainPath::drain`].
    pub fn drain_into<S: ByteSink + ?Sized>(
        &mut self,
        max_len: usize,
        sink: &mut S,
    ) -> Result<usize, VoiceError> {
        self.drain.drain(max_len, sink)
    }

    pub fn close(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if !self.closed {
            self.closed = true;
            self.drain.capture().stream_closed();
        }
    }
}

impl io::Read for AudioStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.read_bytes(buf).map_err(io::Error::other)
    }
}

impl Drop for AudioStream {
    fn drop(&mut self) {
        self.release();
    }
}
