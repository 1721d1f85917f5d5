// Shared helpers for building Deflate64 streams in tests: a bit-level
// writer plus stored, static and dynamic block encoders. Dynamic headers
// use a fixed complete code-length code (symbols 0..12 at 4 bits, 13..18
// at 5) with every length spelled out literally, so no header run-length
// tricks are involved in generated streams.
#![allow(dead_code)]

use inflate64::Source;

pub struct BitWriter {
    bytes: Vec<u8>,
    bitbuf: u32,
    nbits: u32,
}

impl BitWriter {
    pub fn new() -> Self {
        BitWriter {
            bytes: Vec::new(),
            bitbuf: 0,
            nbits: 0,
        }
    }

    pub fn bits(&mut self, v: u32, n: u32) {
        self.bitbuf |= (v & ((1 << n) - 1)) << self.nbits;
        self.nbits += n;
        while self.nbits >= 8 {
            self.bytes.push((self.bitbuf & 0xFF) as u8);
            self.bitbuf >>= 8;
            self.nbits -= 8;
        }
    }

    // Huffman codewords go out most-significant bit first.
    pub fn huff(&mut self, code: u32, n: u32) {
        let mut rev = 0;
        for i in 0..n {
            rev = (rev << 1) | ((code >> i) & 1);
        }
        self.bits(rev, n);
    }

    pub fn align(&mut self) {
        if self.nbits > 0 {
            self.bytes.push((self.bitbuf & 0xFF) as u8);
            self.bitbuf = 0;
            self.nbits = 0;
        }
    }

    pub fn raw_bytes(&mut self, data: &[u8]) {
        assert_eq!(self.nbits, 0);
        self.bytes.extend_from_slice(data);
    }

    pub fn finish(mut self) -> Vec<u8> {
        self.align();
        self.bytes
    }
}

#[derive(Clone, Copy)]
pub enum Token {
    Lit(u8),
    Match { len: usize, dist: usize },
}

pub fn expand_tokens(tokens: &[Token]) -> Vec<u8> {
    let mut out = Vec::new();
    for t in tokens {
        match *t {
            Token::Lit(b) => out.push(b),
            Token::Match { len, dist } => {
                for _ in 0..len {
                    let b = out[out.len() - dist];
                    out.push(b);
                }
            }
        }
    }
    out
}

/// Litlen symbol, extra bit count and extra value for a match length.
/// Lengths above 258 use symbol 285 with its 16-bit extra field; length
/// 258 itself is coded as 284 + 31.
pub fn length_symbol(length: usize) -> (u16, u32, u32) {
    assert!((3..=65538).contains(&length));
    if length > 258 {
        return (285, 16, (length - 3) as u32);
    }
    const BASE: [usize; 28] = [
        3, 4, 5, 6, 7, 8, 9, 10, 11, 13, 15, 17, 19, 23, 27, 31, 35, 43, 51, 59, 67, 83, 99, 115,
        131, 163, 195, 227,
    ];
    const EXTRA: [u32; 28] = [
        0, 0, 0, 0, 0, 0, 0, 0, 1, 1, 1, 1, 2, 2, 2, 2, 3, 3, 3, 3, 4, 4, 4, 4, 5, 5, 5, 5,
    ];
    let mut sym = 27;
    loop {
        if BASE[sym] <= length && length <= BASE[sym] + (1 << EXTRA[sym]) - 1 {
            return ((257 + sym) as u16, EXTRA[sym], (length - BASE[sym]) as u32);
        }
        sym -= 1;
    }
}

pub fn offset_symbol(dist: usize) -> (u16, u32, u32) {
    assert!((1..=65536).contains(&dist));
    const BASE: [usize; 32] = [
        1, 2, 3, 4, 5, 7, 9, 13, 17, 25, 33, 49, 65, 97, 129, 193, 257, 385, 513, 769, 1025, 1537,
        2049, 3073, 4097, 6145, 8193, 12289, 16385, 24577, 32769, 49153,
    ];
    const EXTRA: [u32; 32] = [
        0, 0, 0, 0, 1, 1, 2, 2, 3, 3, 4, 4, 5, 5, 6, 6, 7, 7, 8, 8, 9, 9, 10, 10, 11, 11, 12, 12,
        13, 13, 14, 14,
    ];
    let mut sym = 31;
    loop {
        if BASE[sym] <= dist && dist <= BASE[sym] + (1 << EXTRA[sym]) - 1 {
            return (sym as u16, EXTRA[sym], (dist - BASE[sym]) as u32);
        }
        sym -= 1;
    }
}

fn fixed_litlen_code(sym: u16) -> (u32, u32) {
    let sym = sym as u32;
    if sym < 144 {
        (0x30 + sym, 8)
    } else if sym < 256 {
        (0x190 + sym - 144, 9)
    } else if sym < 280 {
        (sym - 256, 7)
    } else {
        (0xC0 + sym - 280, 8)
    }
}

/// Canonical codewords for the given per-symbol lengths; `(code, nbits)`
/// per symbol, `(0, 0)` for unused symbols.
pub fn canonical_codes(lens: &[u8]) -> Vec<(u32, u32)> {
    let max_len = lens.iter().copied().max().unwrap_or(0) as usize;
    let mut bl_count = vec![0u32; max_len + 1];
    for &l in lens {
        if l != 0 {
            bl_count[l as usize] += 1;
        }
    }
    let mut next_code = vec![0u32; max_len + 1];
    let mut code = 0;
    for b in 1..=max_len {
        code = (code + bl_count[b - 1]) << 1;
        next_code[b] = code;
    }
    lens.iter()
        .map(|&l| {
            if l == 0 {
                (0, 0)
            } else {
                let c = next_code[l as usize];
                next_code[l as usize] += 1;
                (c, l as u32)
            }
        })
        .collect()
}

pub fn write_fixed_block(w: &mut BitWriter, tokens: &[Token], last: bool) {
    w.bits(last as u32, 1);
    w.bits(1, 2);
    for t in tokens {
        match *t {
            Token::Lit(b) => {
                let (c, n) = fixed_litlen_code(b as u16);
                w.huff(c, n);
            }
            Token::Match { len, dist } => {
                let (sym, nex, ev) = length_symbol(len);
                let (c, n) = fixed_litlen_code(sym);
                w.huff(c, n);
                if nex > 0 {
                    w.bits(ev, nex);
                }
                let (dsym, dnex, dev) = offset_symbol(dist);
                w.huff(dsym as u32, 5);
                if dnex > 0 {
                    w.bits(dev, dnex);
                }
            }
        }
    }
    let (c, n) = fixed_litlen_code(256);
    w.huff(c, n);
}

pub fn write_stored_block(w: &mut BitWriter, payload: &[u8], last: bool) {
    assert!(payload.len() <= 0xFFFF);
    w.bits(last as u32, 1);
    w.bits(0, 2);
    w.align();
    let len = payload.len() as u16;
    w.raw_bytes(&len.to_le_bytes());
    w.raw_bytes(&(len ^ 0xFFFF).to_le_bytes());
    w.raw_bytes(payload);
}

const CLEN_LENS: [u8; 19] = [4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 5, 5, 5, 5, 5, 5];
const PERMUTATION: [usize; 19] = [16, 17, 18, 0, 8, 7, 9, 6, 10, 5, 11, 4, 12, 3, 13, 2, 14, 1, 15];

/// Writes a dynamic block. `litlens` must cover 257..=286 symbols and
/// `distlens` 1..=32; both codes must be complete (or the single-codeword
/// degenerate form for distances).
pub fn write_dynamic_block(
    w: &mut BitWriter,
    litlens: &[u8],
    distlens: &[u8],
    tokens: &[Token],
    last: bool,
) {
    assert!((257..=286).contains(&litlens.len()));
    assert!((1..=32).contains(&distlens.len()));
    let clen_map = canonical_codes(&CLEN_LENS);
    let litmap = canonical_codes(litlens);
    let distmap = canonical_codes(distlens);

    w.bits(last as u32, 1);
    w.bits(2, 2);
    w.bits((litlens.len() - 257) as u32, 5);
    w.bits((distlens.len() - 1) as u32, 5);
    w.bits(19 - 4, 4);
    for i in 0..19 {
        w.bits(CLEN_LENS[PERMUTATION[i]] as u32, 3);
    }
    for &l in litlens.iter().chain(distlens.iter()) {
        let (c, n) = clen_map[l as usize];
        w.huff(c, n);
    }

    for t in tokens {
        match *t {
            Token::Lit(b) => {
                let (c, n) = litmap[b as usize];
                assert!(n > 0, "literal {b} has no codeword");
                w.huff(c, n);
            }
            Token::Match { len, dist } => {
                let (sym, nex, ev) = length_symbol(len);
                let (c, n) = litmap[sym as usize];
                assert!(n > 0, "length symbol {sym} has no codeword");
                w.huff(c, n);
                if nex > 0 {
                    w.bits(ev, nex);
                }
                let (dsym, dnex, dev) = offset_symbol(dist);
                let (dc, dn) = distmap[dsym as usize];
                assert!(dn > 0, "offset symbol {dsym} has no codeword");
                w.huff(dc, dn);
                if dnex > 0 {
                    w.bits(dev, dnex);
                }
            }
        }
    }
    let (c, n) = litmap[256];
    w.huff(c, n);
}

/// A source that hands out input in fixed-size chunks, for exercising the
/// refill path at every possible boundary.
pub struct ChunkedSource<'a> {
    data: &'a [u8],
    pos: usize,
    chunk: usize,
}

impl<'a> ChunkedSource<'a> {
    pub fn new(data: &'a [u8], chunk: usize) -> Self {
        assert!(chunk > 0);
        ChunkedSource { data, pos: 0, chunk }
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }
}

impl Source for ChunkedSource<'_> {
    fn fill(&mut self) -> &[u8] {
        let end = (self.pos + self.chunk).min(self.data.len());
        &self.data[self.pos..end]
    }

    fn consume(&mut self, n: usize) {
        self.pos += n;
    }
}
