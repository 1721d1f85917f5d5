use thiserror::Error;

/// Reasons a Deflate64 stream can be rejected as corrupt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DataError {
    #[error("invalid block type")]
    InvalidBlockType,
    #[error("invalid stored block lengths")]
    InvalidStoredLength,
    #[error("too many length symbols")]
    TooManyLengthSymbols,
    #[error("invalid code lengths set")]
    InvalidCodeLengths,
    #[error("invalid bit length repeat")]
    InvalidBitLengthRepeat,
    #[error("invalid code -- missing end-of-block")]
    MissingEndOfBlock,
    #[error("invalid literal/lengths set")]
    InvalidLiteralSet,
    #[error("invalid distances set")]
    InvalidDistanceSet,
    #[error("invalid literal/length code")]
    InvalidLiteralCode,
    #[error("invalid distance code")]
    InvalidDistanceCode,
    #[error("invalid distance too far back")]
    DistanceTooFarBack,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Error {
    /// The stream is malformed and decoding cannot continue.
    #[error("corrupt deflate64 stream: {0}")]
    Data(#[from] DataError),
    /// The input source ran dry before the final block was complete.
    #[error("input exhausted before end of stream")]
    InputExhausted,
    /// The output sink declined to accept decoded data.
    #[error("output sink refused decoded data")]
    OutputRefused,
}
