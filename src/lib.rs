pub mod api;
pub mod batch;
pub mod common;
pub mod decompress;
pub mod error;
pub mod stream;

pub use api::Decompressor;
pub use batch::BatchDecompressor;
pub use decompress::{Sink, Source};
pub use error::{DataError, Error};
pub use stream::decode_stream;
