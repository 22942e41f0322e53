use crate::models::error::VoiceError;

/// Destination of drained audio bytes on the consumer side.
///
/// The readable span of the ring buffer is handed over as two slices; the
/// second is empty unless the span wraps around the end of storage.
/// `copy_out` runs under the session lock, so it must be a bounded memory
/// copy. On error the sink's contents are unspecified and the ring buffer
/// is not advanced.
pub trait ByteSink {
    fn copy_out(&mut self, head: &[u8], tail: &[u8]) -> Result<(), VoiceError>;
}

impl ByteSink for Vec<u8> {
    fn copy_out(&mut self, head: &[u8], tail: &[u8]) -> Result<(), VoiceError> {
        self.reserve(head.len() + tail.len());
        self.extend_from_slice(head);
        self.extend_from_slice(tail);
        Ok(())
    }
}

/// Sink writing into a caller-supplied slice, as a `read(2)` handler would.
#[derive(Debug)]
pub struct SliceSink<'a> {
    out: &'a mut [u8],
    written: usize,
}

impl<'a> SliceSink<'a> {
    pub fn new(out: &'a mut [u8]) -> Self {
        Self { out, written: 0 }
    }

    /// Bytes copied so far.
    pub fn written(&self) -> usize {
        self.written
    }

    pub fn remaining(&self) -> usize {
        self.out.len() - self.written
    }
}

impl ByteSink for SliceSink<'_> {
    fn copy_out(&mut self, head: &[u8], tail: &[u8]) -> Result<(), VoiceError> {
        let total = head.len() + tail.len();
        if total > self.remaining() {
            return Err(VoiceError::Transport(format!(
                "{} bytes do not fit in {} remaining",
                total,
                self.remaining()
            )));
        }
        let start = self.written;
        self.out[start..start + head.len()].copy_from_slice(head);
        self.out[start + head.len()..start + total].copy_from_slice(tail);
        self.written += total;
        Ok(())
    }
}
