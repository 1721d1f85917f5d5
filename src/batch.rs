use crate::api::Decompressor;
use crate::error::Error;
use rayon::prelude::*;

/// Decompresses many independent Deflate64 streams across the rayon pool.
/// Each worker keeps one window allocation alive for its whole share of
/// the batch.
pub struct BatchDecompressor;

impl BatchDecompressor {
    pub fn new() -> Self {
        Self
    }

    pub fn decompress_batch(&self, inputs: &[&[u8]]) -> Vec<Result<Vec<u8>, Error>> {
        inputs
            .par_iter()
            .map_init(Decompressor::new, |decompressor, &input| {
                decompressor.decompress(input)
            })
            .collect()
    }
}

impl Default for BatchDecompressor {
    fn default() -> Self {
        Self::new()
    }
}
