use crate::common::DEFLATE64_WINDOW_SIZE;
use crate::decompress::{Decompressor as InternalDecompressor, Sink};
use crate::error::Error;

/// Slice-backed sink for the `_into` path; refuses pushes that would
/// overflow the caller's buffer.
struct SliceSink<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl Sink for SliceSink<'_> {
    fn push(&mut self, data: &[u8]) -> bool {
        if data.len() > self.buf.len() - self.pos {
            return false;
        }
        self.buf[self.pos..self.pos + data.len()].copy_from_slice(data);
        self.pos += data.len();
        true
    }
}

/// One-call decompression of in-memory Deflate64 streams. Owns the 64 KiB
/// window so repeated calls reuse the same allocation.
pub struct Decompressor {
    window: Box<[u8; DEFLATE64_WINDOW_SIZE]>,
}

impl Decompressor {
    pub fn new() -> Self {
        Self {
            window: Box::new([0; DEFLATE64_WINDOW_SIZE]),
        }
    }

    /// Decompresses a whole stream into a fresh `Vec`. Trailing bytes past
    /// the final block are ignored.
    pub fn decompress(&mut self, data: &[u8]) -> Result<Vec<u8>, Error> {
        let mut output = Vec::new();
        self.decompress_with(data, &mut output)?;
        Ok(output)
    }

    /// Decompresses into a caller-provided buffer, returning the decoded
    /// size. Fails with [`Error::OutputRefused`] if the buffer is too
    /// small.
    pub fn decompress_into(&mut self, data: &[u8], output: &mut [u8]) -> Result<usize, Error> {
        let mut sink = SliceSink {
            buf: output,
            pos: 0,
        };
        self.decompress_with(data, &mut sink)?;
        Ok(sink.pos)
    }

    /// Decompresses into any [`Sink`], returning the number of bytes
    /// pushed.
    pub fn decompress_with<K: Sink>(&mut self, data: &[u8], sink: &mut K) -> Result<u64, Error> {
        let mut source = data;
        InternalDecompressor::new(&mut self.window).decode(&mut source, sink)
    }
}

impl Default for Decompressor {
    fn default() -> Self {
        Self::new()
    }
}
