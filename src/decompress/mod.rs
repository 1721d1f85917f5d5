mod bits;
mod tables;
mod window;

use crate::common::*;
use crate::error::{DataError, Error};
use bits::BitReader;
use tables::{
    build_decode_table, static_tables, Code, CodeKind, END_OF_BLOCK_FLAG, FIXED_LITLEN_SIZE,
    FIXED_OFFSET_SIZE, FIXED_OFFSET_TABLEBITS, INVALID_FLAG, LENGTH_EXTRA_MASK, LITLEN_ENOUGH,
    LITLEN_TABLEBITS, OFFSET_ENOUGH, OFFSET_EXTRA_MASK, OFFSET_TABLEBITS, PRECODE_TABLEBITS,
};
use window::Window;

/// Supplier of compressed input. `fill` exposes the current unread chunk,
/// refilling from the underlying reader only when empty; an empty slice
/// means the input is exhausted. `consume` marks the first `n` bytes of
/// that chunk as read.
///
/// After [`Decompressor::decode`] returns, any bytes never consumed are
/// trailing data that did not belong to the compressed stream.
pub trait Source {
    fn fill(&mut self) -> &[u8];
    fn consume(&mut self, n: usize);
}

impl Source for &[u8] {
    fn fill(&mut self) -> &[u8] {
        self
    }

    fn consume(&mut self, n: usize) {
        *self = &self[n..];
    }
}

/// Receiver of decompressed output, fed whole window flushes plus one
/// final partial flush. Returning `false` abandons decoding with
/// [`Error::OutputRefused`].
pub trait Sink {
    fn push(&mut self, data: &[u8]) -> bool;
}

impl Sink for Vec<u8> {
    fn push(&mut self, data: &[u8]) -> bool {
        self.extend_from_slice(data);
        true
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Mode {
    BlockHeader,
    UncompressedHeader,
    UncompressedBody { remaining: usize },
    DynamicHeader,
    BlockBody,
    Done,
}

/// Deflate64 decoder over a caller-provided 64 KiB window. The window
/// backs the history for match copies; decoded data reaches the sink a
/// window at a time.
pub struct Decompressor<'w> {
    /// Litlen and offset decode tables, packed back to back.
    codes: [Code; LITLEN_ENOUGH + OFFSET_ENOUGH],
    /// Code lengths read from a dynamic block header: litlen then offset.
    lens: [u16; DEFLATE64_NUM_LITLEN_SYMS + DEFLATE64_NUM_OFFSET_SYMS],
    work: [u16; DEFLATE64_NUM_LITLEN_SYMS],
    bits: BitReader,
    window: Window<'w>,
    litlen_off: usize,
    litlen_bits: usize,
    offset_off: usize,
    offset_bits: usize,
    static_codes_loaded: bool,
    is_final_block: bool,
    mode: Mode,
}

impl<'w> Decompressor<'w> {
    pub fn new(window: &'w mut [u8; DEFLATE64_WINDOW_SIZE]) -> Self {
        Decompressor {
            codes: [Code::default(); LITLEN_ENOUGH + OFFSET_ENOUGH],
            lens: [0; DEFLATE64_NUM_LITLEN_SYMS + DEFLATE64_NUM_OFFSET_SYMS],
            work: [0; DEFLATE64_NUM_LITLEN_SYMS],
            bits: BitReader::new(),
            window: Window::new(window),
            litlen_off: 0,
            litlen_bits: 0,
            offset_off: 0,
            offset_bits: 0,
            static_codes_loaded: false,
            is_final_block: false,
            mode: Mode::BlockHeader,
        }
    }

    fn reset(&mut self) {
        self.bits.clear();
        self.window.reset();
        self.is_final_block = false;
        self.mode = Mode::BlockHeader;
        // A dynamic header that fails partway through has already built its
        // precode table over the cached static entries, so the cache cannot
        // be trusted across calls.
        self.static_codes_loaded = false;
    }

    /// Decodes one complete Deflate64 stream from `source` into `sink`,
    /// returning the number of bytes produced. State is reset on entry, so
    /// a decompressor (and its window) can be reused across streams,
    /// including after an error.
    pub fn decode<S: Source, K: Sink>(
        &mut self,
        source: &mut S,
        sink: &mut K,
    ) -> Result<u64, Error> {
        self.reset();
        loop {
            match self.mode {
                Mode::BlockHeader => {
                    if self.is_final_block {
                        self.mode = Mode::Done;
                        continue;
                    }
                    self.bits.need_bits(source, 3)?;
                    self.is_final_block = self.bits.peek_bits(1) == 1;
                    self.bits.drop_bits(1);
                    let block_type = self.bits.peek_bits(2) as u8;
                    self.bits.drop_bits(2);
                    match block_type {
                        DEFLATE64_BLOCKTYPE_UNCOMPRESSED => {
                            self.mode = Mode::UncompressedHeader;
                        }
                        DEFLATE64_BLOCKTYPE_STATIC_HUFFMAN => {
                            self.load_static_codes();
                            self.mode = Mode::BlockBody;
                        }
                        DEFLATE64_BLOCKTYPE_DYNAMIC_HUFFMAN => {
                            self.mode = Mode::DynamicHeader;
                        }
                        _ => return Err(DataError::InvalidBlockType.into()),
                    }
                }
                Mode::UncompressedHeader => {
                    // The stored length and its complement sit on a byte
                    // boundary after the three header bits.
                    self.bits.align_to_byte();
                    self.bits.need_bits(source, 32)?;
                    let check = self.bits.peek_u32();
                    if check & 0xFFFF != (check >> 16) ^ 0xFFFF {
                        return Err(DataError::InvalidStoredLength.into());
                    }
                    self.bits.clear();
                    self.mode = Mode::UncompressedBody {
                        remaining: (check & 0xFFFF) as usize,
                    };
                }
                Mode::UncompressedBody { remaining } => {
                    if remaining == 0 {
                        self.mode = Mode::BlockHeader;
                        continue;
                    }
                    let chunk = source.fill();
                    if chunk.is_empty() {
                        return Err(Error::InputExhausted);
                    }
                    self.window.make_room(sink)?;
                    let copy = remaining.min(chunk.len()).min(self.window.free());
                    self.window.extend(&chunk[..copy]);
                    source.consume(copy);
                    self.mode = Mode::UncompressedBody {
                        remaining: remaining - copy,
                    };
                }
                Mode::DynamicHeader => {
                    self.read_dynamic_header(source)?;
                    self.mode = Mode::BlockBody;
                }
                Mode::BlockBody => {
                    let entry = self.decode_litlen(source)?;
                    if entry.op == 0 {
                        self.window.push_literal(sink, entry.val as u8)?;
                        continue;
                    }
                    if entry.op & END_OF_BLOCK_FLAG != 0 {
                        self.mode = Mode::BlockHeader;
                        continue;
                    }
                    if entry.op & INVALID_FLAG != 0 {
                        return Err(DataError::InvalidLiteralCode.into());
                    }

                    let mut length = entry.val as usize;
                    let extra = (entry.op & LENGTH_EXTRA_MASK) as u32;
                    if extra != 0 {
                        self.bits.need_bits(source, extra)?;
                        length += self.bits.peek_bits(extra) as usize;
                        self.bits.drop_bits(extra);
                    }

                    let entry = self.decode_offset(source)?;
                    if entry.op & INVALID_FLAG != 0 {
                        return Err(DataError::InvalidDistanceCode.into());
                    }
                    let mut offset = entry.val as usize;
                    let extra = (entry.op & OFFSET_EXTRA_MASK) as u32;
                    if extra != 0 {
                        self.bits.need_bits(source, extra)?;
                        offset += self.bits.peek_bits(extra) as usize;
                        self.bits.drop_bits(extra);
                    }
                    if offset > self.window.max_offset() {
                        return Err(DataError::DistanceTooFarBack.into());
                    }

                    self.window.copy_match(sink, offset, length)?;
                }
                Mode::Done => {
                    self.bits.align_to_byte();
                    self.window.flush_remaining(sink)?;
                    return Ok(self.window.total_out());
                }
            }
        }
    }

    fn load_static_codes(&mut self) {
        if self.static_codes_loaded {
            return;
        }
        let fixed = static_tables();
        self.codes[..FIXED_LITLEN_SIZE].copy_from_slice(&fixed.litlen);
        self.codes[FIXED_LITLEN_SIZE..FIXED_LITLEN_SIZE + FIXED_OFFSET_SIZE]
            .copy_from_slice(&fixed.offset);
        self.litlen_off = 0;
        self.litlen_bits = LITLEN_TABLEBITS;
        self.offset_off = FIXED_LITLEN_SIZE;
        self.offset_bits = FIXED_OFFSET_TABLEBITS;
        self.static_codes_loaded = true;
    }

    fn read_dynamic_header<S: Source>(&mut self, source: &mut S) -> Result<(), Error> {
        // Precode lengths arrive permuted so the rarely-used symbols land
        // at the end and can be omitted from the header.
        const PERMUTATION: [usize; DEFLATE64_NUM_PRECODE_SYMS] = [
            16, 17, 18, 0, 8, 7, 9, 6, 10, 5, 11, 4, 12, 3, 13, 2, 14, 1, 15,
        ];

        self.bits.need_bits(source, 14)?;
        let num_litlen = DEFLATE64_FIRST_LEN_SYM + self.bits.peek_bits(5) as usize;
        self.bits.drop_bits(5);
        let num_offset = 1 + self.bits.peek_bits(5) as usize;
        self.bits.drop_bits(5);
        let num_explicit = 4 + self.bits.peek_bits(4) as usize;
        self.bits.drop_bits(4);
        if num_litlen > DEFLATE64_MAX_LITLEN_SYMS {
            return Err(DataError::TooManyLengthSymbols.into());
        }

        let mut i = 0;
        while i < num_explicit {
            self.bits.need_bits(source, 3)?;
            self.lens[PERMUTATION[i]] = self.bits.peek_bits(3) as u16;
            self.bits.drop_bits(3);
            i += 1;
        }
        while i < DEFLATE64_NUM_PRECODE_SYMS {
            self.lens[PERMUTATION[i]] = 0;
            i += 1;
        }
        let precode = build_decode_table(
            CodeKind::Precode,
            &self.lens[..DEFLATE64_NUM_PRECODE_SYMS],
            &mut self.codes,
            PRECODE_TABLEBITS,
            &mut self.work,
        )
        .ok_or(DataError::InvalidCodeLengths)?;

        // Expand the run-length coded litlen and offset lengths. Precode
        // codewords never exceed 7 bits, so a single-level lookup decodes
        // them.
        let mut have = 0;
        while have < num_litlen + num_offset {
            let here = self.decode_precode(source, precode.root)?;
            if here.val < 16 {
                self.bits.drop_bits(here.bits as u32);
                self.lens[have] = here.val;
                have += 1;
                continue;
            }
            let (len, copy) = match here.val {
                16 => {
                    self.bits.need_bits(source, here.bits as u32 + 2)?;
                    self.bits.drop_bits(here.bits as u32);
                    if have == 0 {
                        return Err(DataError::InvalidBitLengthRepeat.into());
                    }
                    let len = self.lens[have - 1];
                    let copy = 3 + self.bits.peek_bits(2) as usize;
                    self.bits.drop_bits(2);
                    (len, copy)
                }
                17 => {
                    self.bits.need_bits(source, here.bits as u32 + 3)?;
                    self.bits.drop_bits(here.bits as u32);
                    let copy = 3 + self.bits.peek_bits(3) as usize;
                    self.bits.drop_bits(3);
                    (0, copy)
                }
                _ => {
                    self.bits.need_bits(source, here.bits as u32 + 7)?;
                    self.bits.drop_bits(here.bits as u32);
                    let copy = 11 + self.bits.peek_bits(7) as usize;
                    self.bits.drop_bits(7);
                    (0, copy)
                }
            };
            if have + copy > num_litlen + num_offset {
                return Err(DataError::InvalidBitLengthRepeat.into());
            }
            let mut n = copy;
            while n > 0 {
                self.lens[have] = len;
                have += 1;
                n -= 1;
            }
        }

        // A block whose litlen code cannot express end-of-block could
        // never terminate.
        if self.lens[DEFLATE64_END_OF_BLOCK] == 0 {
            return Err(DataError::MissingEndOfBlock.into());
        }

        let litlen = build_decode_table(
            CodeKind::Litlen,
            &self.lens[..num_litlen],
            &mut self.codes,
            LITLEN_TABLEBITS,
            &mut self.work,
        )
        .ok_or(DataError::InvalidLiteralSet)?;
        let offset = build_decode_table(
            CodeKind::Offset,
            &self.lens[num_litlen..num_litlen + num_offset],
            &mut self.codes[litlen.used..],
            OFFSET_TABLEBITS,
            &mut self.work,
        )
        .ok_or(DataError::InvalidDistanceSet)?;

        self.litlen_off = 0;
        self.litlen_bits = litlen.root;
        self.offset_off = litlen.used;
        self.offset_bits = offset.root;
        self.static_codes_loaded = false;
        Ok(())
    }

    fn decode_precode<S: Source>(&mut self, source: &mut S, root: usize) -> Result<Code, Error> {
        loop {
            let here = self.codes[self.bits.peek_bits(root as u32) as usize];
            if (here.bits as u32) <= self.bits.available() {
                return Ok(here);
            }
            self.bits.pull_byte(source)?;
        }
    }

    fn decode_litlen<S: Source>(&mut self, source: &mut S) -> Result<Code, Error> {
        self.decode_from(source, self.litlen_off, self.litlen_bits)
    }

    fn decode_offset<S: Source>(&mut self, source: &mut S) -> Result<Code, Error> {
        self.decode_from(source, self.offset_off, self.offset_bits)
    }

    /// Two-level table walk: peek the root bits, then follow a sub-table
    /// pointer if the codeword is longer. Peeks overshoot the available
    /// count (zero-padded), so input is only pulled when the entry hit
    /// genuinely needs more bits.
    fn decode_from<S: Source>(
        &mut self,
        source: &mut S,
        off: usize,
        root: usize,
    ) -> Result<Code, Error> {
        let mut here;
        loop {
            here = self.codes[off + self.bits.peek_bits(root as u32) as usize];
            if (here.bits as u32) <= self.bits.available() {
                break;
            }
            self.bits.pull_byte(source)?;
        }
        if here.op != 0 && here.op & 0xF0 == 0 {
            let last = here;
            loop {
                let peek = self.bits.peek_bits(last.bits as u32 + last.op as u32);
                here = self.codes[off + last.val as usize + ((peek as usize) >> last.bits)];
                if (last.bits as u32 + here.bits as u32) <= self.bits.available() {
                    break;
                }
                self.bits.pull_byte(source)?;
            }
            self.bits.drop_bits(last.bits as u32);
        }
        self.bits.drop_bits(here.bits as u32);
        Ok(here)
    }
}
