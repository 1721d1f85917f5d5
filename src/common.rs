pub const DEFLATE64_BLOCKTYPE_UNCOMPRESSED: u8 = 0;
pub const DEFLATE64_BLOCKTYPE_STATIC_HUFFMAN: u8 = 1;
pub const DEFLATE64_BLOCKTYPE_DYNAMIC_HUFFMAN: u8 = 2;

pub const DEFLATE64_WINDOW_SIZE: usize = 65536;

pub const DEFLATE64_MIN_MATCH_LEN: usize = 3;
pub const DEFLATE64_MAX_MATCH_LEN: usize = 65538;
pub const DEFLATE64_MAX_MATCH_OFFSET: usize = 65536;

pub const DEFLATE64_NUM_PRECODE_SYMS: usize = 19;
pub const DEFLATE64_NUM_LITLEN_SYMS: usize = 288;
pub const DEFLATE64_NUM_OFFSET_SYMS: usize = 32;

// A dynamic block header may declare at most 286 litlen code lengths even
// though the fixed code defines 288; symbols 286 and 287 never appear in a
// valid stream.
pub const DEFLATE64_MAX_LITLEN_SYMS: usize = 286;

pub const DEFLATE64_END_OF_BLOCK: usize = 256;
pub const DEFLATE64_FIRST_LEN_SYM: usize = 257;

pub const DEFLATE64_MAX_CODEWORD_LEN: usize = 15;
