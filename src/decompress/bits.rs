use super::Source;
use crate::error::Error;

/// Bit accumulator over a [`Source`], least-significant bit first. All
/// compressed input flows through here one byte at a time; callers peek up
/// to 25 bits (a 9-bit root codeword plus a 15-bit sub-table index, or a
/// 16-bit extra field) before dropping.
///
/// Invariant: bits of `hold` at positions `>= count` are zero, so peeking
/// past the available count yields zero-padded values.
pub struct BitReader {
    hold: u64,
    count: u32,
}

impl BitReader {
    pub fn new() -> Self {
        BitReader { hold: 0, count: 0 }
    }

    pub fn available(&self) -> u32 {
        self.count
    }

    /// Loads one more byte from the source into the accumulator.
    pub fn pull_byte<S: Source>(&mut self, source: &mut S) -> Result<(), Error> {
        let chunk = source.fill();
        if chunk.is_empty() {
            return Err(Error::InputExhausted);
        }
        self.hold |= (chunk[0] as u64) << self.count;
        source.consume(1);
        self.count += 8;
        Ok(())
    }

    /// Ensures at least `n` bits are available, pulling input as needed.
    pub fn need_bits<S: Source>(&mut self, source: &mut S, n: u32) -> Result<(), Error> {
        debug_assert!(n <= 32);
        while self.count < n {
            self.pull_byte(source)?;
        }
        Ok(())
    }

    pub fn peek_bits(&self, n: u32) -> u32 {
        debug_assert!(n < 32);
        (self.hold as u32) & ((1u32 << n) - 1)
    }

    /// Low 32 bits of the accumulator; callers must have 32 bits available.
    pub fn peek_u32(&self) -> u32 {
        debug_assert!(self.count >= 32);
        self.hold as u32
    }

    pub fn drop_bits(&mut self, n: u32) {
        debug_assert!(n <= self.count);
        self.hold >>= n;
        self.count -= n;
    }

    /// Discards bits up to the next byte boundary.
    pub fn align_to_byte(&mut self) {
        let n = self.count & 7;
        self.hold >>= n;
        self.count -= n;
    }

    /// Empties the accumulator entirely.
    pub fn clear(&mut self) {
        self.hold = 0;
        self.count = 0;
    }
}
