use inflate64::decode_stream;
use std::fs::File;
use std::io::{self, BufWriter};

fn main() -> io::Result<()> {
    let mut args = std::env::args().skip(1);
    let input = match args.next() {
        Some(path) => path,
        None => {
            eprintln!("usage: decode_file <deflate64-stream> [output]");
            std::process::exit(2);
        }
    };

    let reader = File::open(&input)?;
    let total = match args.next() {
        Some(path) => decode_stream(reader, BufWriter::new(File::create(path)?))?,
        None => decode_stream(reader, BufWriter::new(io::stdout().lock()))?,
    };

    eprintln!("Decoded {} bytes from {}", total, input);
    Ok(())
}
