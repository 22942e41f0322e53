use std::convert::Infallible;

use crate::models::error::VoiceError;

/// Fixed-capacity circular byte buffer for encoded voice audio.
///
/// Not synchronised on its own; the capture session keeps it behind the
/// session lock together with the state machine.
///
/// Overflow behavior: drops the oldest unread bytes, so a buffer that keeps
/// overflowing always holds the most recent `capacity` bytes in write order.
/// The producer never waits.
#[derive(Debug)]
pub struct RingBuffer {
    buffer: Box<[u8]>,
    write_index: usize,
    read_index: usize,
    available: usize,
    wrapped: bool,
    underrun_count: u64,
    overwritten_bytes: u64,
}

impl RingBuffer {
    /// Allocate a zeroed buffer of `capacity` bytes.
    pub fn new(capacity: usize) -> Result<Self, VoiceError> {
        if capacity == 0 {
            return Err(VoiceError::ConfigurationFailed(
                "ring buffer capacity must be positive".into(),
            ));
        }

        let mut storage = Vec::new();
        storage
            .try_reserve_exact(capacity)
            .map_err(|_| VoiceError::AllocationFailed { capacity })?;
        storage.resize(capacity, 0);

        Ok(Self {
            buffer: storage.into_boxed_slice(),
            write_index: 0,
            read_index: 0,
            available: 0,
            wrapped: false,
            underrun_count: 0,
            overwritten_bytes: 0,
        })
    }

    /// Append `data`, overwriting the oldest unread bytes if it does not fit.
    ///
    /// If `data` is larger than the capacity only its last `capacity` bytes
    /// are kept.
    pub fn write(&mut self, data: &[u8]) {
        if data.is_empty() {
            return;
        }

        let capacity = self.capacity();
        let data = if data.len() > capacity {
            self.overwritten_bytes += (data.len() - capacity) as u64;
            &data[data.len() - capacity..]
        } else {
            data
        };
        let len = data.len();

        // Reaching the end exactly also wraps, keeping the cursor in range.
        let tail_room = capacity - self.write_index;
        if len >= tail_room {
            let (to_end, from_start) = data.split_at(tail_room);
            self.buffer[self.write_index..].copy_from_slice(to_end);
            self.buffer[..from_start.len()].copy_from_slice(from_start);
            self.write_index = from_start.len();
            self.wrapped = true;
        } else {
            self.buffer[self.write_index..self.write_index + len].copy_from_slice(data);
            self.write_index += len;
        }

        let overflow = (self.available + len).saturating_sub(capacity);
        if overflow > 0 {
            // Full: the oldest surviving byte sits right after the newest one.
            self.overwritten_bytes += overflow as u64;
            self.read_index = self.write_index;
            self.available = capacity;
        } else {
            self.available += len;
        }

        log::trace!(
            "ring write {} bytes: available={} write={} read={} overflow={}",
            len,
            self.available,
            self.write_index,
            self.read_index,
            overflow
        );
    }

    /// Two-phase read of up to `max_len` bytes.
    ///
    /// `copy` receives the readable span as two slices (the second is empty
    /// unless the span crosses the end of storage). The read cursor and the
    /// unread count move only if `copy` succeeds; on error the buffer is left
    /// exactly as it was.
    ///
    /// An empty buffer counts an underrun and returns `Ok(0)` without calling
    /// `copy`.
    pub fn read_with<E>(
        &mut self,
        max_len: usize,
        copy: impl FnOnce(&[u8], &[u8]) -> Result<(), E>,
    ) -> Result<usize, E> {
        if self.available == 0 {
            self.underrun_count += 1;
            return Ok(0);
        }

        let to_read = max_len.min(self.available);
        if to_read == 0 {
            return Ok(0);
        }

        let capacity = self.capacity();
        let first = to_read.min(capacity - self.read_index);
        copy(
            &self.buffer[self.read_index..self.read_index + first],
            &self.buffer[..to_read - first],
        )?;

        self.read_index = (self.read_index + to_read) % capacity;
        self.available -= to_read;
        if self.available == 0 {
            self.wrapped = false;
        }
        Ok(to_read)
    }

    /// Read and remove up to `max_len` bytes.
    ///
    /// Returns fewer bytes if fewer are available, and an empty vector (plus
    /// an underrun) if none are.
    pub fn read(&mut self, max_len: usize) -> Vec<u8> {
        let mut out = Vec::new();
        let result = self.read_with(max_len, |head, tail| {
            out.reserve_exact(head.len() + tail.len());
            out.extend_from_slice(head);
            out.extend_from_slice(tail);
            Ok::<(), Infallible>(())
        });
        match result {
            Ok(_) => out,
            Err(never) => match never {},
        }
    }

    /// Empty the buffer without reallocating.
    ///
    /// The underrun and overwrite counters are cumulative and survive.
    pub fn reset(&mut self) {
        self.write_index = 0;
        self.read_index = 0;
        self.available = 0;
        self.wrapped = false;
    }

    /// Number of unread bytes.
    pub fn len(&self) -> usize {
        self.available
    }

    pub fn is_empty(&self) -> bool {
        self.available == 0
    }

    /// Whether the write cursor has crossed the end of storage since the
    /// buffer was last empty.
    pub fn is_wrapped(&self) -> bool {
        self.wrapped
    }

    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Reads that found the buffer empty.
    pub fn underrun_count(&self) -> u64 {
        self.underrun_count
    }

    /// Unread bytes discarded by overflow.
    pub fn overwritten_bytes(&self) -> u64 {
        self.overwritten_bytes
    }
}
