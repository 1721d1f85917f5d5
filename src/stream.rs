use crate::common::DEFLATE64_WINDOW_SIZE;
use crate::decompress::{Decompressor, Sink, Source};
use crate::error::Error;
use std::io::{self, Read, Write};

const INPUT_BUFFER_SIZE: usize = 32 * 1024;

/// Feeds a reader into the decoder a buffer at a time. A read error is
/// stashed and presented to the decoder as input exhaustion; the caller
/// recovers the real cause from `error` afterwards.
struct ReadSource<R: Read> {
    inner: R,
    buffer: Vec<u8>,
    pos: usize,
    cap: usize,
    error: Option<io::Error>,
}

impl<R: Read> ReadSource<R> {
    fn new(inner: R) -> Self {
        Self {
            inner,
            buffer: vec![0; INPUT_BUFFER_SIZE],
            pos: 0,
            cap: 0,
            error: None,
        }
    }
}

impl<R: Read> Source for ReadSource<R> {
    fn fill(&mut self) -> &[u8] {
        if self.pos == self.cap && self.error.is_none() {
            loop {
                match self.inner.read(&mut self.buffer) {
                    Ok(n) => {
                        self.pos = 0;
                        self.cap = n;
                        break;
                    }
                    Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                    Err(e) => {
                        self.error = Some(e);
                        self.pos = 0;
                        self.cap = 0;
                        break;
                    }
                }
            }
        }
        &self.buffer[self.pos..self.cap]
    }

    fn consume(&mut self, n: usize) {
        self.pos += n;
    }
}

struct WriteSink<W: Write> {
    inner: W,
    error: Option<io::Error>,
}

impl<W: Write> Sink for WriteSink<W> {
    fn push(&mut self, data: &[u8]) -> bool {
        match self.inner.write_all(data) {
            Ok(()) => true,
            Err(e) => {
                self.error = Some(e);
                false
            }
        }
    }
}

/// Decodes one Deflate64 stream from `reader`, writing the output to
/// `writer`, and returns the decompressed size. A truncated stream maps to
/// [`io::ErrorKind::UnexpectedEof`] and corruption to
/// [`io::ErrorKind::InvalidData`]; errors from the underlying reader and
/// writer are passed through as-is.
pub fn decode_stream<R: Read, W: Write>(reader: R, writer: W) -> io::Result<u64> {
    let mut window = Box::new([0u8; DEFLATE64_WINDOW_SIZE]);
    let mut source = ReadSource::new(reader);
    let mut sink = WriteSink {
        inner: writer,
        error: None,
    };
    let result = Decompressor::new(&mut window).decode(&mut source, &mut sink);
    match result {
        Ok(total) => {
            sink.inner.flush()?;
            Ok(total)
        }
        Err(Error::InputExhausted) => Err(source
            .error
            .take()
            .unwrap_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, Error::InputExhausted))),
        Err(Error::OutputRefused) => Err(sink
            .error
            .take()
            .unwrap_or_else(|| io::Error::new(io::ErrorKind::WriteZero, Error::OutputRefused))),
        Err(e) => Err(io::Error::new(io::ErrorKind::InvalidData, e)),
    }
}
