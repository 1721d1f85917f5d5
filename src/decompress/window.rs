use super::Sink;
use crate::common::DEFLATE64_WINDOW_SIZE;
use crate::error::Error;

/// The 64 KiB sliding history. Decoded bytes accumulate here and are
/// flushed to the sink only when the window fills (and once more at end of
/// stream), so match copies always resolve against live window contents.
pub struct Window<'w> {
    buf: &'w mut [u8; DEFLATE64_WINDOW_SIZE],
    /// Bytes written since the last flush; also the next write position.
    put: usize,
    /// Whether the window has ever filled. Until then, back-references may
    /// only reach `put` bytes back.
    wrapped: bool,
    total_out: u64,
}

impl<'w> Window<'w> {
    pub fn new(buf: &'w mut [u8; DEFLATE64_WINDOW_SIZE]) -> Self {
        Window {
            buf,
            put: 0,
            wrapped: false,
            total_out: 0,
        }
    }

    pub fn reset(&mut self) {
        self.put = 0;
        self.wrapped = false;
        self.total_out = 0;
    }

    pub fn free(&self) -> usize {
        DEFLATE64_WINDOW_SIZE - self.put
    }

    /// Furthest back-reference currently valid.
    pub fn max_offset(&self) -> usize {
        if self.wrapped {
            DEFLATE64_WINDOW_SIZE
        } else {
            self.put
        }
    }

    pub fn total_out(&self) -> u64 {
        self.total_out
    }

    /// Flushes the window to the sink if it is full. After a flush the
    /// buffer contents stay in place; only the write position rewinds, so
    /// the entire window remains referenceable.
    pub fn make_room<K: Sink>(&mut self, sink: &mut K) -> Result<(), Error> {
        if self.put == DEFLATE64_WINDOW_SIZE {
            if !sink.push(&self.buf[..]) {
                return Err(Error::OutputRefused);
            }
            self.total_out += DEFLATE64_WINDOW_SIZE as u64;
            self.put = 0;
            self.wrapped = true;
        }
        Ok(())
    }

    pub fn push_literal<K: Sink>(&mut self, sink: &mut K, byte: u8) -> Result<(), Error> {
        self.make_room(sink)?;
        self.buf[self.put] = byte;
        self.put += 1;
        Ok(())
    }

    /// Appends raw bytes; the caller has already bounded `data` by
    /// [`free`](Self::free) after making room.
    pub fn extend(&mut self, data: &[u8]) {
        debug_assert!(data.len() <= self.free());
        self.buf[self.put..self.put + data.len()].copy_from_slice(data);
        self.put += data.len();
    }

    /// Copies a match of `length` bytes from `offset` back. The source may
    /// overlap the destination (offset < length replicates), and both the
    /// read and write positions may wrap through the window, so this runs
    /// in segments of byte copies.
    pub fn copy_match<K: Sink>(
        &mut self,
        sink: &mut K,
        offset: usize,
        mut length: usize,
    ) -> Result<(), Error> {
        debug_assert!(offset >= 1 && offset <= self.max_offset());
        while length > 0 {
            self.make_room(sink)?;
            let (from, avail) = if offset > self.put {
                // Reach back past the rewind point into the tail kept from
                // before the last flush.
                (
                    self.put + (DEFLATE64_WINDOW_SIZE - offset),
                    offset - self.put,
                )
            } else {
                (self.put - offset, DEFLATE64_WINDOW_SIZE - self.put)
            };
            let copy = avail.min(length);
            let mut i = 0;
            while i < copy {
                self.buf[self.put + i] = self.buf[from + i];
                i += 1;
            }
            self.put += copy;
            length -= copy;
        }
        Ok(())
    }

    /// Delivers whatever the window still holds past the last flush point.
    /// Called once when the final block ends.
    pub fn flush_remaining<K: Sink>(&mut self, sink: &mut K) -> Result<(), Error> {
        if self.put > 0 {
            if !sink.push(&self.buf[..self.put]) {
                return Err(Error::OutputRefused);
            }
            self.total_out += self.put as u64;
        }
        Ok(())
    }
}
