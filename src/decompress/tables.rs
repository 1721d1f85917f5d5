use crate::common::{
    DEFLATE64_FIRST_LEN_SYM, DEFLATE64_MAX_CODEWORD_LEN, DEFLATE64_NUM_LITLEN_SYMS,
    DEFLATE64_NUM_OFFSET_SYMS,
};

pub const PRECODE_TABLEBITS: usize = 7;
pub const LITLEN_TABLEBITS: usize = 9;
pub const OFFSET_TABLEBITS: usize = 6;

// Worst-case decode table sizes for a root of 9 (litlen) and 6 (offset),
// over all valid code length assignments for 286 and 32 symbols.
pub const LITLEN_ENOUGH: usize = 852;
pub const OFFSET_ENOUGH: usize = 594;

// The static tables are fully flat: every fixed litlen codeword fits in 9
// bits and every fixed offset codeword is exactly 5 bits.
pub const FIXED_LITLEN_SIZE: usize = 1 << LITLEN_TABLEBITS;
pub const FIXED_OFFSET_TABLEBITS: usize = 5;
pub const FIXED_OFFSET_SIZE: usize = 1 << FIXED_OFFSET_TABLEBITS;

// Code.op flag bits. A zero op is a literal, 0x80 plus an extra-bit count
// is a length or offset base. Low nonzero bits without a flag mark a
// sub-table pointer whose op is the number of index bits.
pub const END_OF_BLOCK_FLAG: u8 = 0x20;
pub const INVALID_FLAG: u8 = 0x40;

pub const LENGTH_EXTRA_MASK: u8 = 0x1F;
pub const OFFSET_EXTRA_MASK: u8 = 0x0F;

/// One decode table entry. `bits` is the codeword length consumed by this
/// entry (or the root length for a sub-table pointer), `val` the literal
/// value, base length/offset, or sub-table offset depending on `op`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Code {
    pub op: u8,
    pub bits: u8,
    pub val: u16,
}

/// Which alphabet a decode table is being built for. The precode never
/// tolerates an incomplete code; litlen and offset codes may be incomplete
/// only in the degenerate one-symbol case.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CodeKind {
    Precode,
    Litlen,
    Offset,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BuiltTable {
    /// Index bits actually used by the root table (may be less than
    /// requested when the longest codeword is shorter).
    pub root: usize,
    /// Total entries written, root table plus sub-tables.
    pub used: usize,
}

// Base match lengths for litlen symbols 257..285 and their extra bit
// counts. Symbol 285 takes 16 extra bits on a base of 3, covering lengths
// 3..=65538, so symbol 284 keeps its full 5-extra-bit range (length 258 is
// coded as 284 + 31). Symbols 286 and 287 decode as invalid.
const LENGTH_BASE: [u16; 31] = [
    3, 4, 5, 6, 7, 8, 9, 10, 11, 13, 15, 17, 19, 23, 27, 31, 35, 43, 51, 59, 67, 83, 99, 115, 131,
    163, 195, 227, 3, 0, 0,
];
const LENGTH_EXTRA: [u8; 31] = [
    128, 128, 128, 128, 128, 128, 128, 128, 129, 129, 129, 129, 130, 130, 130, 130, 131, 131, 131,
    131, 132, 132, 132, 132, 133, 133, 133, 133, 144, 72, 78,
];

// Base offsets for symbols 0..31. Symbols 30 and 31 extend the format to
// a 64 KiB window with 14 extra bits each.
const OFFSET_BASE: [u16; 32] = [
    1, 2, 3, 4, 5, 7, 9, 13, 17, 25, 33, 49, 65, 97, 129, 193, 257, 385, 513, 769, 1025, 1537,
    2049, 3073, 4097, 6145, 8193, 12289, 16385, 24577, 32769, 49153,
];
const OFFSET_EXTRA: [u8; 32] = [
    128, 128, 128, 128, 129, 129, 130, 130, 131, 131, 132, 132, 133, 133, 134, 134, 135, 135, 136,
    136, 137, 137, 138, 138, 139, 139, 140, 140, 141, 141, 142, 142,
];

fn make_entry(kind: CodeKind, sym: usize, nbits: u8) -> Code {
    match kind {
        CodeKind::Precode => Code {
            op: 0,
            bits: nbits,
            val: sym as u16,
        },
        CodeKind::Litlen => {
            if sym < 256 {
                Code {
                    op: 0,
                    bits: nbits,
                    val: sym as u16,
                }
            } else if sym == 256 {
                Code {
                    op: END_OF_BLOCK_FLAG | INVALID_FLAG,
                    bits: nbits,
                    val: 0,
                }
            } else {
                let idx = sym - DEFLATE64_FIRST_LEN_SYM;
                Code {
                    op: LENGTH_EXTRA[idx],
                    bits: nbits,
                    val: LENGTH_BASE[idx],
                }
            }
        }
        CodeKind::Offset => Code {
            op: OFFSET_EXTRA[sym],
            bits: nbits,
            val: OFFSET_BASE[sym],
        },
    }
}

fn table_overflow(kind: CodeKind, used: usize) -> bool {
    // The ENOUGH bounds are attained by valid codes, so a table that lands
    // exactly on the bound still fits.
    (kind == CodeKind::Litlen && used > LITLEN_ENOUGH)
        || (kind == CodeKind::Offset && used > OFFSET_ENOUGH)
}

/// Builds a two-level decode table for a canonical Huffman code given the
/// per-symbol codeword lengths. Entries land in `table` starting at index
/// zero; sub-table pointers store offsets relative to the same base, so a
/// caller packing several tables into one buffer passes a sub-slice.
///
/// Returns `None` for an over-subscribed or unusable length set: the caller
/// decides which corruption that means for its alphabet.
pub fn build_decode_table(
    kind: CodeKind,
    lens: &[u16],
    table: &mut [Code],
    root: usize,
    work: &mut [u16; DEFLATE64_NUM_LITLEN_SYMS],
) -> Option<BuiltTable> {
    let mut count = [0u16; DEFLATE64_MAX_CODEWORD_LEN + 1];
    for &len in lens {
        count[len as usize] += 1;
    }

    let mut max_len = DEFLATE64_MAX_CODEWORD_LEN;
    while max_len >= 1 && count[max_len] == 0 {
        max_len -= 1;
    }
    if max_len == 0 {
        // No codewords at all. An empty code is never usable here: even an
        // all-literal block must carry a real offset code.
        return None;
    }
    let mut min_len = 1;
    while count[min_len] == 0 {
        min_len += 1;
    }
    let root = root.clamp(min_len, max_len);

    // Kraft check: reject over-subscribed sets outright, and incomplete
    // sets except the single-codeword degenerate form.
    let mut left: i32 = 1;
    for len in 1..=DEFLATE64_MAX_CODEWORD_LEN {
        left <<= 1;
        left -= count[len] as i32;
        if left < 0 {
            return None;
        }
    }
    if left > 0 && (kind == CodeKind::Precode || max_len != 1) {
        return None;
    }

    // Sort symbols by codeword length, then by symbol index within a length.
    let mut offs = [0u16; DEFLATE64_MAX_CODEWORD_LEN + 1];
    for len in 1..DEFLATE64_MAX_CODEWORD_LEN {
        offs[len + 1] = offs[len] + count[len];
    }
    for (sym, &len) in lens.iter().enumerate() {
        if len != 0 {
            work[offs[len as usize] as usize] = sym as u16;
            offs[len as usize] += 1;
        }
    }

    let mut huff = 0usize; // codeword, bit-reversed
    let mut sym = 0usize; // index into work[]
    let mut len = min_len; // current codeword length
    let mut next = 0usize; // start of current sub-table
    let mut curr = root; // index bits of current (sub-)table
    let mut drop = 0usize; // root bits dropped when indexing a sub-table
    let mut low = usize::MAX; // low root bits of the current sub-table
    let mut used = 1usize << root;
    let mask = used - 1;

    if table_overflow(kind, used) {
        return None;
    }

    loop {
        let here = make_entry(kind, work[sym] as usize, (len - drop) as u8);

        // Replicate the entry into every table slot whose low bits match
        // this codeword.
        let incr = 1usize << (len - drop);
        let mut fill = 1usize << curr;
        loop {
            fill -= incr;
            table[next + (huff >> drop) + fill] = here;
            if fill == 0 {
                break;
            }
        }

        // Advance to the next codeword of this length; the increment runs
        // backwards because codewords index the table bit-reversed.
        let mut bit = 1usize << (len - 1);
        while huff & bit != 0 {
            bit >>= 1;
        }
        huff = if bit != 0 { (huff & (bit - 1)) + bit } else { 0 };

        sym += 1;
        count[len] -= 1;
        if count[len] == 0 {
            if len == max_len {
                break;
            }
            len = lens[work[sym] as usize] as usize;
        }

        // Codeword no longer fits the current table: open a sub-table sized
        // for the remaining lengths sharing these root bits.
        if len > root && (huff & mask) != low {
            if drop == 0 {
                drop = root;
            }
            next += 1usize << curr;
            curr = len - drop;
            let mut left = 1i32 << curr;
            while curr + drop < max_len {
                left -= count[curr + drop] as i32;
                if left <= 0 {
                    break;
                }
                curr += 1;
                left <<= 1;
            }
            used += 1usize << curr;
            if table_overflow(kind, used) {
                return None;
            }
            low = huff & mask;
            table[low] = Code {
                op: curr as u8,
                bits: root as u8,
                val: next as u16,
            };
        }
    }

    // An accepted incomplete code leaves unreachable slots; mark them
    // invalid so a stray codeword decodes to an error instead of garbage.
    let mut here = Code {
        op: INVALID_FLAG,
        bits: (len - drop) as u8,
        val: 0,
    };
    while huff != 0 {
        if drop != 0 && (huff & mask) != low {
            drop = 0;
            len = root;
            next = 0;
            here.bits = len as u8;
        }
        table[next + (huff >> drop)] = here;
        let mut bit = 1usize << (len - 1);
        while huff & bit != 0 {
            bit >>= 1;
        }
        huff = if bit != 0 { (huff & (bit - 1)) + bit } else { 0 };
    }

    Some(BuiltTable { root, used })
}

pub struct StaticTables {
    pub litlen: [Code; FIXED_LITLEN_SIZE],
    pub offset: [Code; FIXED_OFFSET_SIZE],
}

static STATIC_TABLES: std::sync::OnceLock<StaticTables> = std::sync::OnceLock::new();

/// Decode tables for static Huffman blocks, built once on first use.
pub fn static_tables() -> &'static StaticTables {
    STATIC_TABLES.get_or_init(|| {
        let mut work = [0u16; DEFLATE64_NUM_LITLEN_SYMS];
        let mut tables = StaticTables {
            litlen: [Code::default(); FIXED_LITLEN_SIZE],
            offset: [Code::default(); FIXED_OFFSET_SIZE],
        };

        let mut lens = [0u16; DEFLATE64_NUM_LITLEN_SYMS];
        let mut i = 0;
        while i < 144 {
            lens[i] = 8;
            i += 1;
        }
        while i < 256 {
            lens[i] = 9;
            i += 1;
        }
        while i < 280 {
            lens[i] = 7;
            i += 1;
        }
        while i < DEFLATE64_NUM_LITLEN_SYMS {
            lens[i] = 8;
            i += 1;
        }
        let mut scratch = [Code::default(); LITLEN_ENOUGH];
        let built = build_decode_table(
            CodeKind::Litlen,
            &lens,
            &mut scratch,
            LITLEN_TABLEBITS,
            &mut work,
        );
        debug_assert!(matches!(
            built,
            Some(BuiltTable {
                root: LITLEN_TABLEBITS,
                used: FIXED_LITLEN_SIZE
            })
        ));
        tables.litlen.copy_from_slice(&scratch[..FIXED_LITLEN_SIZE]);

        let lens = [5u16; DEFLATE64_NUM_OFFSET_SYMS];
        let mut scratch = [Code::default(); FIXED_OFFSET_SIZE];
        let built = build_decode_table(
            CodeKind::Offset,
            &lens,
            &mut scratch,
            FIXED_OFFSET_TABLEBITS,
            &mut work,
        );
        debug_assert!(matches!(
            built,
            Some(BuiltTable {
                root: FIXED_OFFSET_TABLEBITS,
                used: FIXED_OFFSET_SIZE
            })
        ));
        tables.offset.copy_from_slice(&scratch);

        tables
    })
}
